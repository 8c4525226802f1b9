use serde::{Deserialize, Serialize};

use crate::domain::{DiagnosisCode, UrgencyTier};

pub const PREDICT_PATH: &str = "predict";

pub mod form_fields {
    pub const FIRST_NAME: &str = "firstName";
    pub const LAST_NAME: &str = "lastName";
    pub const AGE: &str = "age";
    pub const GENDER: &str = "gender";
    pub const LESION_AREA: &str = "lesionArea";
    pub const FILE: &str = "file";
}

/// Success body of `POST /predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub diagnosis: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawClassification {
    pub diagnosis: String,
    pub confidence: f64,
}

impl TryFrom<PredictionResponse> for RawClassification {
    type Error = String;

    fn try_from(value: PredictionResponse) -> Result<Self, Self::Error> {
        if !(0.0..=1.0).contains(&value.confidence) {
            return Err(format!("confidence {} is outside [0, 1]", value.confidence));
        }
        Ok(Self {
            diagnosis: value.diagnosis,
            confidence: value.confidence,
        })
    }
}

/// Raw classification joined with its enrichment bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub diagnosis: DiagnosisCode,
    pub confidence: f64,
    pub diagnosis_name: String,
    pub description: String,
    pub urgency: UrgencyTier,
    pub findings: String,
    pub recommendations: Vec<String>,
    pub next_steps: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prediction_response_parses_service_body() {
        let body: PredictionResponse =
            serde_json::from_str(r#"{"diagnosis":"bcc","confidence":0.64}"#).expect("parse");
        let raw = RawClassification::try_from(body).expect("in range");
        assert_eq!(raw.diagnosis, "bcc");
        assert_eq!(raw.confidence, 0.64);
    }

    #[test]
    fn rejects_confidence_outside_unit_interval() {
        for confidence in [-0.1, 1.5, f64::NAN] {
            let err = RawClassification::try_from(PredictionResponse {
                diagnosis: "nv".to_string(),
                confidence,
            })
            .expect_err("out of range");
            assert!(err.contains("outside [0, 1]"), "unexpected error: {err}");
        }
    }
}
