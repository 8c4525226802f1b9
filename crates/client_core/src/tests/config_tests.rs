use super::*;

use std::collections::HashMap;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| vars.get(key).cloned()
}

#[test]
fn missing_endpoint_is_a_startup_fault() {
    let err = resolve_settings(None, env_from(&[]), None).expect_err("must fail");
    assert!(matches!(err, ConfigError::MissingEndpoint));

    let err = resolve_settings(None, env_from(&[("CLASSIFIER_API_URL", "  ")]), None)
        .expect_err("blank must fail");
    assert!(matches!(err, ConfigError::MissingEndpoint));
}

#[test]
fn reads_endpoint_from_environment_with_default_timeout() {
    let settings = resolve_settings(
        None,
        env_from(&[("CLASSIFIER_API_URL", "http://classifier.local:8000")]),
        None,
    )
    .expect("settings");
    assert_eq!(settings.endpoint.as_str(), "http://classifier.local:8000/");
    assert_eq!(settings.request_timeout, DEFAULT_REQUEST_TIMEOUT);
    assert_eq!(settings.predict_url(), "http://classifier.local:8000/predict");
}

#[test]
fn prefixed_env_and_override_take_precedence() {
    let env = env_from(&[
        ("CLASSIFIER_API_URL", "http://plain.local"),
        ("APP__CLASSIFIER_API_URL", "http://prefixed.local"),
    ]);
    let settings = resolve_settings(None, &env, None).expect("settings");
    assert_eq!(settings.endpoint.host_str(), Some("prefixed.local"));

    let settings =
        resolve_settings(None, &env, Some("https://override.local/api/")).expect("settings");
    assert_eq!(settings.predict_url(), "https://override.local/api/predict");
}

#[test]
fn file_settings_supply_endpoint_and_timeout() {
    let file = r#"
endpoint = "http://from-file.local:9000"
request_timeout_secs = 15
"#;
    let settings = resolve_settings(Some(file), env_from(&[]), None).expect("settings");
    assert_eq!(settings.endpoint.host_str(), Some("from-file.local"));
    assert_eq!(settings.request_timeout, Duration::from_secs(15));

    let settings = resolve_settings(
        Some(file),
        env_from(&[("APP__REQUEST_TIMEOUT_SECS", "5")]),
        None,
    )
    .expect("settings");
    assert_eq!(settings.request_timeout, Duration::from_secs(5));
}

#[test]
fn unreadable_file_and_bad_timeout_fall_back_to_defaults() {
    let settings = resolve_settings(
        Some("endpoint = [not toml"),
        env_from(&[
            ("CLASSIFIER_API_URL", "http://classifier.local"),
            ("APP__REQUEST_TIMEOUT_SECS", "soon"),
        ]),
        None,
    )
    .expect("settings");
    assert_eq!(settings.request_timeout, DEFAULT_REQUEST_TIMEOUT);
}

#[test]
fn rejects_unparsable_or_non_http_endpoints() {
    for raw in ["not a url", "ftp://classifier.local"] {
        let err = resolve_settings(None, env_from(&[("CLASSIFIER_API_URL", raw)]), None)
            .expect_err("must fail");
        assert!(
            matches!(err, ConfigError::InvalidEndpoint { ref value, .. } if value == raw),
            "unexpected error: {err}"
        );
    }
}
