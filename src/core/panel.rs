use crate::domain::model::SubmissionResult;
use std::fmt;

/// What the prediction panel shows. Exactly one variant at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredictionPanel {
    Loading,
    Prediction(String),
    Error,
    NoData,
}

impl PredictionPanel {
    pub const HEADING: &'static str = "Predicted Completion Date";

    pub fn from_result(result: &SubmissionResult) -> Self {
        match result {
            SubmissionResult::Loading => PredictionPanel::Loading,
            SubmissionResult::Success(date) if !date.is_empty() => {
                PredictionPanel::Prediction(date.clone())
            }
            SubmissionResult::Success(_) | SubmissionResult::Idle => PredictionPanel::NoData,
            SubmissionResult::Error(_) => PredictionPanel::Error,
        }
    }
}

impl From<&SubmissionResult> for PredictionPanel {
    fn from(result: &SubmissionResult) -> Self {
        Self::from_result(result)
    }
}

impl fmt::Display for PredictionPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictionPanel::Loading => f.write_str("Predicting..."),
            PredictionPanel::Prediction(date) => f.write_str(date),
            PredictionPanel::Error => f.write_str("Error"),
            PredictionPanel::NoData => f.write_str("No Data Available"),
        }
    }
}

/// The submit button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerControl {
    pub enabled: bool,
    pub label: &'static str,
}

impl TriggerControl {
    pub fn for_result(result: &SubmissionResult) -> Self {
        if result.is_loading() {
            Self {
                enabled: false,
                label: "Predicting...",
            }
        } else {
            Self {
                enabled: true,
                label: "Predict",
            }
        }
    }
}
