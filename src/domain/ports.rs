use crate::domain::model::{Notification, PredictionReply, PredictionRequest};
use crate::utils::error::{HealixError, Result};
use async_trait::async_trait;
use std::str::FromStr;

/// Transport to the prediction service.
///
/// Any HTTP status is an `Ok` reply; only transport failures are errors.
#[async_trait]
pub trait PredictionClient: Send + Sync {
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionReply>;
}

/// Receives the user-visible toast for each settled submission.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// How submission input is checked before it leaves the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Forward every value as entered, coerced the way a browser's
    /// `Number`/`Date` would, and read a 200 without a prediction as no data.
    #[default]
    Lenient,
    /// Reject malformed enrollment or dates before any request is sent, and
    /// treat a 200 without a usable prediction as an error.
    Strict,
}

/// What a non-200 reply does to the previously settled result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoftFailurePolicy {
    #[default]
    Keep,
    Clear,
    Error,
}

impl FromStr for ValidationMode {
    type Err = HealixError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(ValidationMode::Strict),
            "lenient" => Ok(ValidationMode::Lenient),
            other => Err(HealixError::InvalidConfigValueError {
                field: "submission.validation".to_string(),
                value: other.to_string(),
                reason: "expected 'strict' or 'lenient'".to_string(),
            }),
        }
    }
}

impl FromStr for SoftFailurePolicy {
    type Err = HealixError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keep" => Ok(SoftFailurePolicy::Keep),
            "clear" => Ok(SoftFailurePolicy::Clear),
            "error" => Ok(SoftFailurePolicy::Error),
            other => Err(HealixError::InvalidConfigValueError {
                field: "submission.soft_failure".to_string(),
                value: other.to_string(),
                reason: "expected 'keep', 'clear' or 'error'".to_string(),
            }),
        }
    }
}

pub trait ConfigProvider: Send + Sync {
    fn endpoint(&self) -> &str;
    fn validation_mode(&self) -> ValidationMode;
    fn soft_failure_policy(&self) -> SoftFailurePolicy;
}
