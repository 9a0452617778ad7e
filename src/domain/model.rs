use serde::{Deserialize, Serialize};

/// Payload sent to the prediction endpoint.
///
/// Key names and order are fixed by the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub nct_id: String,
    #[serde(rename = "Study_Title")]
    pub study_title: String,
    #[serde(rename = "Conditions")]
    pub conditions: String,
    #[serde(rename = "Interventions")]
    pub interventions: String,
    #[serde(rename = "Phases")]
    pub phases: String,
    /// `None` serializes as `null`, the JSON rendering of a non-finite number.
    #[serde(rename = "Enrollment")]
    pub enrollment: Option<serde_json::Number>,
    #[serde(rename = "Study_Type")]
    pub study_type: String,
    #[serde(rename = "Study_Design")]
    pub study_design: String,
    #[serde(rename = "Start_Date")]
    pub start_date: String,
    #[serde(rename = "Primary_Completion_Date")]
    pub primary_completion_date: String,
    #[serde(rename = "Locations")]
    pub locations: String,
}

/// Raw outcome of a prediction call, before status interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionReply {
    pub status: u16,
    pub body: String,
}

/// State of the result slot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum SubmissionResult {
    #[default]
    Idle,
    Loading,
    Success(String),
    Error(String),
}

impl SubmissionResult {
    pub fn is_loading(&self) -> bool {
        matches!(self, SubmissionResult::Loading)
    }

    pub fn predicted_date(&self) -> Option<&str> {
        match self {
            SubmissionResult::Success(date) => Some(date),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Failure,
    Error,
}

/// A transient user-facing message, one per settled submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn success() -> Self {
        Self {
            kind: NotificationKind::Success,
            title: "Result".to_string(),
            description: "Prediction Successful".to_string(),
        }
    }

    pub fn failure() -> Self {
        Self {
            kind: NotificationKind::Failure,
            title: "Result".to_string(),
            description: "Prediction Failed".to_string(),
        }
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            title: "Error".to_string(),
            description: description.into(),
        }
    }
}
