use crate::core::form_store::{FieldId, FormState};
use crate::core::panel::{PredictionPanel, TriggerControl};
use crate::core::submission::{Settlement, SubmissionPipeline};
use crate::domain::model::SubmissionResult;
use crate::domain::ports::{NotificationSink, PredictionClient};
use crate::utils::error::Result;

/// One trial form: its field values plus the pipeline that submits them.
pub struct HealixForm<C: PredictionClient, N: NotificationSink> {
    state: FormState,
    pipeline: SubmissionPipeline<C, N>,
}

impl<C: PredictionClient, N: NotificationSink> HealixForm<C, N> {
    pub fn new(pipeline: SubmissionPipeline<C, N>) -> Self {
        Self::with_state(pipeline, FormState::default())
    }

    pub fn with_state(pipeline: SubmissionPipeline<C, N>, state: FormState) -> Self {
        Self { state, pipeline }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn pipeline(&self) -> &SubmissionPipeline<C, N> {
        &self.pipeline
    }

    pub fn update_field(&mut self, field: FieldId, value: impl Into<String>) {
        self.state.update_field(field, value);
    }

    pub fn update_named(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        self.state.update_named(name, value)
    }

    /// Submits a snapshot of the current values.
    pub async fn submit(&self) -> Settlement {
        let snapshot = self.state.clone();
        self.pipeline.submit(&snapshot).await
    }

    pub fn result(&self) -> SubmissionResult {
        self.pipeline.result()
    }

    pub fn panel(&self) -> PredictionPanel {
        PredictionPanel::from_result(&self.result())
    }

    pub fn trigger(&self) -> TriggerControl {
        TriggerControl::for_result(&self.result())
    }
}
