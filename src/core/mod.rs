pub mod form;
pub mod form_store;
pub mod panel;
pub mod submission;
pub mod transform;

pub use crate::domain::model::{Notification, PredictionRequest, SubmissionResult};
pub use crate::domain::ports::{
    ConfigProvider, NotificationSink, PredictionClient, SoftFailurePolicy, ValidationMode,
};
pub use crate::utils::error::Result;
