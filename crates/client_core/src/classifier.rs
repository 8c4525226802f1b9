//! Remote classifier client: one multipart `POST /predict` per call, no retries.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use shared::{
    domain::PatientRecord,
    error::{ErrorKind, ErrorNotice},
    protocol::{form_fields, PredictionResponse, RawClassification},
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ClassifierSettings;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifierError {
    #[error("classifier unreachable: {0}")]
    Transport(String),
    #[error("classification failed with status {status}: {detail}")]
    ClassificationFailed { status: u16, detail: String },
    #[error("malformed classifier response: {0}")]
    MalformedResponse(String),
    #[error("could not build classification request: {0}")]
    InvalidRequest(String),
}

impl ClassifierError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClassifierError::Transport(_) => ErrorKind::Transport,
            ClassifierError::ClassificationFailed { .. } => ErrorKind::ClassificationFailed,
            ClassifierError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            ClassifierError::InvalidRequest(_) => ErrorKind::InvalidRequest,
        }
    }

    pub fn notice(&self) -> ErrorNotice {
        let message = match self {
            ClassifierError::Transport(detail) => format!(
                "Classifier unreachable; check the network connection and try again ({detail})"
            ),
            ClassifierError::ClassificationFailed { detail, .. } => {
                format!("Server error: {detail}")
            }
            ClassifierError::MalformedResponse(detail) => {
                format!("The classifier returned an unexpected response ({detail})")
            }
            ClassifierError::InvalidRequest(detail) => {
                format!("The submission could not be prepared ({detail})")
            }
        };
        ErrorNotice::new(self.kind(), message)
    }
}

#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, record: &PatientRecord) -> Result<RawClassification, ClassifierError>;
}

pub struct HttpClassifier {
    http: Client,
    predict_url: String,
}

impl HttpClassifier {
    pub fn new(settings: &ClassifierSettings) -> Result<Self> {
        let http = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .context("failed to build classifier http client")?;
        Ok(Self {
            http,
            predict_url: settings.predict_url(),
        })
    }
}

fn build_form(record: &PatientRecord) -> Result<Form, ClassifierError> {
    let file = Part::bytes(record.image.bytes.clone())
        .file_name(record.image.file_name.clone())
        .mime_str(&record.image.mime_type)
        .map_err(|err| {
            ClassifierError::InvalidRequest(format!(
                "invalid image type '{}': {err}",
                record.image.mime_type
            ))
        })?;

    Ok(Form::new()
        .text(form_fields::FIRST_NAME, record.first_name.clone())
        .text(form_fields::LAST_NAME, record.last_name.clone())
        .text(form_fields::AGE, record.age.to_string())
        .text(form_fields::GENDER, record.gender.as_str())
        .text(form_fields::LESION_AREA, record.lesion_site.as_str())
        .part(form_fields::FILE, file))
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, record: &PatientRecord) -> Result<RawClassification, ClassifierError> {
        let form = build_form(record)?;
        debug!(
            url = %self.predict_url,
            image_bytes = record.image.bytes.len(),
            "posting classification request"
        );

        let response = self
            .http
            .post(&self.predict_url)
            .multipart(form)
            .send()
            .await
            .map_err(|err| ClassifierError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .map_err(|err| ClassifierError::Transport(err.to_string()))?;
            warn!(status = status.as_u16(), %detail, "classifier rejected request");
            return Err(ClassifierError::ClassificationFailed {
                status: status.as_u16(),
                detail,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| ClassifierError::Transport(err.to_string()))?;
        let prediction: PredictionResponse = serde_json::from_slice(&body)
            .map_err(|err| ClassifierError::MalformedResponse(err.to_string()))?;
        RawClassification::try_from(prediction).map_err(ClassifierError::MalformedResponse)
    }
}

#[cfg(test)]
#[path = "tests/classifier_tests.rs"]
mod tests;
