use crate::core::form_store::FormState;
use crate::core::transform::build_request;
use crate::domain::model::{Notification, PredictionReply, SubmissionResult};
use crate::domain::ports::{
    ConfigProvider, NotificationSink, PredictionClient, SoftFailurePolicy, ValidationMode,
};
use crate::utils::error::{HealixError, Result};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// How a single submission ended, from the caller's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    Success(String),
    SoftFailure { status: u16 },
    Failure(String),
    /// Input was rejected before any request was sent.
    Rejected(String),
    /// A newer submission was issued before this one settled; nothing was applied.
    Superseded,
}

#[derive(Debug, Default)]
struct ResultSlot {
    /// Last applied outcome. Never `Loading`.
    settled: SubmissionResult,
    issued: u64,
    in_flight: bool,
}

/// Turns form snapshots into prediction requests and owns the result slot.
///
/// Overlapping submissions are allowed; only the most recently issued one
/// is applied to the slot and notified.
pub struct SubmissionPipeline<C: PredictionClient, N: NotificationSink> {
    client: C,
    notifier: N,
    validation: ValidationMode,
    soft_failure: SoftFailurePolicy,
    slot: Mutex<ResultSlot>,
}

impl<C: PredictionClient, N: NotificationSink> SubmissionPipeline<C, N> {
    pub fn new(client: C, notifier: N) -> Self {
        Self {
            client,
            notifier,
            validation: ValidationMode::default(),
            soft_failure: SoftFailurePolicy::default(),
            slot: Mutex::new(ResultSlot::default()),
        }
    }

    pub fn with_validation(mut self, mode: ValidationMode) -> Self {
        self.validation = mode;
        self
    }

    pub fn with_soft_failure_policy(mut self, policy: SoftFailurePolicy) -> Self {
        self.soft_failure = policy;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn validation_mode(&self) -> ValidationMode {
        self.validation
    }

    pub fn from_config(client: C, notifier: N, config: &impl ConfigProvider) -> Self {
        Self::new(client, notifier)
            .with_validation(config.validation_mode())
            .with_soft_failure_policy(config.soft_failure_policy())
    }

    fn slot(&self) -> MutexGuard<'_, ResultSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn result(&self) -> SubmissionResult {
        let slot = self.slot();
        if slot.in_flight {
            SubmissionResult::Loading
        } else {
            slot.settled.clone()
        }
    }

    pub fn is_loading(&self) -> bool {
        self.slot().in_flight
    }

    fn issue_token(&self, in_flight: bool) -> u64 {
        let mut slot = self.slot();
        slot.issued += 1;
        slot.in_flight = in_flight;
        slot.issued
    }

    pub async fn submit(&self, form: &FormState) -> Settlement {
        let request = match build_request(form, self.validation) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!("Submission rejected before sending: {}", e);
                let token = self.issue_token(false);
                return match self.settle(token, Err(e)) {
                    Settlement::Failure(message) => Settlement::Rejected(message),
                    other => other,
                };
            }
        };

        let token = self.issue_token(true);
        tracing::info!("Submitting prediction request #{} for '{}'", token, request.nct_id);

        let reply = self.client.predict(&request).await;
        self.settle(token, reply)
    }

    fn settle(&self, token: u64, reply: Result<PredictionReply>) -> Settlement {
        let (settlement, notification) = {
            let mut slot = self.slot();
            if token != slot.issued {
                tracing::debug!(
                    "Discarding response #{} superseded by #{}",
                    token,
                    slot.issued
                );
                return Settlement::Superseded;
            }
            slot.in_flight = false;

            match reply.and_then(|reply| self.interpret(reply)) {
                Ok(Ok(date)) => {
                    tracing::info!("Predicted completion date: {}", date);
                    slot.settled = SubmissionResult::Success(date.clone());
                    (Settlement::Success(date), Notification::success())
                }
                Ok(Err(status)) => {
                    tracing::warn!("Prediction service answered with status {}", status);
                    match self.soft_failure {
                        SoftFailurePolicy::Keep => {}
                        SoftFailurePolicy::Clear => slot.settled = SubmissionResult::Idle,
                        SoftFailurePolicy::Error => {
                            slot.settled = SubmissionResult::Error(format!(
                                "prediction service returned status {}",
                                status
                            ))
                        }
                    }
                    (Settlement::SoftFailure { status }, Notification::failure())
                }
                Err(e) => {
                    tracing::error!("Prediction failed: {:?}", e);
                    let message = e.to_string();
                    slot.settled = SubmissionResult::Error(message.clone());
                    (Settlement::Failure(message.clone()), Notification::error(message))
                }
            }
        };

        self.notifier.notify(notification);
        settlement
    }

    /// `Ok(Ok(date))` on a 200, `Ok(Err(status))` on any other status.
    ///
    /// A 200 whose body lacks a prediction settles as an empty date in
    /// lenient mode and as an error in strict mode.
    fn interpret(&self, reply: PredictionReply) -> Result<std::result::Result<String, u16>> {
        if reply.status != 200 {
            return Ok(Err(reply.status));
        }

        let body: serde_json::Value = serde_json::from_str(&reply.body)?;
        let unexpected = |message: String| HealixError::UnexpectedResponseError { message };
        match (body.get("predicted_completion_date"), self.validation) {
            (Some(serde_json::Value::String(date)), _) => Ok(Ok(date.clone())),
            (Some(serde_json::Value::Number(n)), _) => Ok(Ok(n.to_string())),
            (None | Some(serde_json::Value::Null), ValidationMode::Lenient) => {
                tracing::warn!("Prediction service answered 200 without a predicted date");
                Ok(Ok(String::new()))
            }
            (None, ValidationMode::Strict) => {
                Err(unexpected("predicted_completion_date is missing".to_string()))
            }
            (Some(other), _) => Err(unexpected(format!(
                "predicted_completion_date has unexpected value {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::notify::MemorySink;
    use crate::domain::model::{NotificationKind, PredictionRequest};
    use async_trait::async_trait;
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::{oneshot, Notify};

    /// Replies from a fixed script, one entry per call.
    struct ScriptedClient {
        replies: Mutex<VecDeque<Result<PredictionReply>>>,
        calls: AtomicUsize,
    }

    impl ScriptedClient {
        fn new(replies: Vec<Result<PredictionReply>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicUsize::new(0),
            }
        }

        fn ok(status: u16, body: &str) -> Result<PredictionReply> {
            Ok(PredictionReply {
                status,
                body: body.to_string(),
            })
        }
    }

    #[async_trait]
    impl PredictionClient for ScriptedClient {
        async fn predict(&self, _request: &PredictionRequest) -> Result<PredictionReply> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("no scripted reply left")
        }
    }

    fn filled_form() -> FormState {
        FormState {
            nct_id: "NCT00000001".to_string(),
            study_title: "Trial".to_string(),
            conditions: "Asthma".to_string(),
            interventions: "Drug B".to_string(),
            enrollment: "120".to_string(),
            phases: "phase 3".to_string(),
            study_type: "interventional".to_string(),
            study_design: "Randomized".to_string(),
            start_date: "2024-01-15".to_string(),
            primary_completion_date: "2025-06-01".to_string(),
            locations: "Oslo".to_string(),
        }
    }

    const SUCCESS_BODY: &str = r#"{"predicted_completion_date": "2025-01-01"}"#;

    #[tokio::test]
    async fn test_success_sets_result_and_notifies() {
        let sink = MemorySink::new();
        let pipeline = SubmissionPipeline::new(
            ScriptedClient::new(vec![ScriptedClient::ok(200, SUCCESS_BODY)]),
            sink.clone(),
        );
        assert_eq!(pipeline.result(), SubmissionResult::Idle);

        let settlement = pipeline.submit(&filled_form()).await;

        assert_eq!(settlement, Settlement::Success("2025-01-01".to_string()));
        assert_eq!(pipeline.result(), SubmissionResult::Success("2025-01-01".to_string()));
        assert_eq!(sink.notifications(), vec![Notification::success()]);
    }

    #[tokio::test]
    async fn test_soft_failure_keeps_previous_result() {
        let sink = MemorySink::new();
        let pipeline = SubmissionPipeline::new(
            ScriptedClient::new(vec![
                ScriptedClient::ok(200, SUCCESS_BODY),
                ScriptedClient::ok(500, "internal error"),
            ]),
            sink.clone(),
        );

        pipeline.submit(&filled_form()).await;
        let settlement = pipeline.submit(&filled_form()).await;

        assert_eq!(settlement, Settlement::SoftFailure { status: 500 });
        assert_eq!(pipeline.result(), SubmissionResult::Success("2025-01-01".to_string()));
        assert!(!pipeline.is_loading());
        assert_eq!(sink.last(), Some(Notification::failure()));
    }

    #[tokio::test]
    async fn test_soft_failure_from_idle_stays_idle() {
        let sink = MemorySink::new();
        let pipeline = SubmissionPipeline::new(
            ScriptedClient::new(vec![ScriptedClient::ok(404, "")]),
            sink.clone(),
        );

        pipeline.submit(&filled_form()).await;

        assert_eq!(pipeline.result(), SubmissionResult::Idle);
        assert_eq!(sink.notifications().len(), 1);
    }

    #[tokio::test]
    async fn test_soft_failure_policies() {
        let clear = SubmissionPipeline::new(
            ScriptedClient::new(vec![
                ScriptedClient::ok(200, SUCCESS_BODY),
                ScriptedClient::ok(502, ""),
            ]),
            MemorySink::new(),
        )
        .with_soft_failure_policy(SoftFailurePolicy::Clear);
        clear.submit(&filled_form()).await;
        clear.submit(&filled_form()).await;
        assert_eq!(clear.result(), SubmissionResult::Idle);

        let mark = SubmissionPipeline::new(
            ScriptedClient::new(vec![ScriptedClient::ok(502, "")]),
            MemorySink::new(),
        )
        .with_soft_failure_policy(SoftFailurePolicy::Error);
        mark.submit(&filled_form()).await;
        assert!(matches!(mark.result(), SubmissionResult::Error(msg) if msg.contains("502")));
    }

    #[tokio::test]
    async fn test_transport_error_sets_error_and_notifies_text() {
        let sink = MemorySink::new();
        let error = HealixError::IoError(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        ));
        let expected = error.to_string();
        let pipeline = SubmissionPipeline::new(ScriptedClient::new(vec![Err(error)]), sink.clone());

        let settlement = pipeline.submit(&filled_form()).await;

        assert_eq!(settlement, Settlement::Failure(expected.clone()));
        assert_eq!(pipeline.result(), SubmissionResult::Error(expected.clone()));
        let notification = sink.last().unwrap();
        assert_eq!(notification.kind, NotificationKind::Error);
        assert_eq!(notification.title, "Error");
        assert_eq!(notification.description, expected);
    }

    #[tokio::test]
    async fn test_malformed_json_is_hard_failure() {
        let sink = MemorySink::new();
        let pipeline = SubmissionPipeline::new(
            ScriptedClient::new(vec![ScriptedClient::ok(200, "<html>oops</html>")]),
            sink.clone(),
        );

        let settlement = pipeline.submit(&filled_form()).await;

        assert!(matches!(settlement, Settlement::Failure(_)));
        assert!(matches!(pipeline.result(), SubmissionResult::Error(_)));
        assert_eq!(sink.last().unwrap().kind, NotificationKind::Error);
    }

    #[tokio::test]
    async fn test_missing_prediction_field_settles_as_no_data() {
        let sink = MemorySink::new();
        let pipeline = SubmissionPipeline::new(
            ScriptedClient::new(vec![
                ScriptedClient::ok(200, r#"{"status": "ok"}"#),
                ScriptedClient::ok(200, r#"{"predicted_completion_date": null}"#),
            ]),
            sink.clone(),
        );

        let settlement = pipeline.submit(&filled_form()).await;
        assert_eq!(settlement, Settlement::Success(String::new()));
        assert_eq!(pipeline.result(), SubmissionResult::Success(String::new()));
        assert_eq!(sink.last(), Some(Notification::success()));

        let settlement = pipeline.submit(&filled_form()).await;
        assert_eq!(settlement, Settlement::Success(String::new()));
    }

    #[tokio::test]
    async fn test_missing_prediction_field_fails_in_strict_mode() {
        let sink = MemorySink::new();
        let pipeline = SubmissionPipeline::new(
            ScriptedClient::new(vec![ScriptedClient::ok(200, r#"{"status": "ok"}"#)]),
            sink.clone(),
        )
        .with_validation(ValidationMode::Strict);

        let settlement = pipeline.submit(&filled_form()).await;

        assert!(matches!(settlement, Settlement::Failure(msg) if msg.contains("missing")));
        assert_eq!(sink.last().unwrap().kind, NotificationKind::Error);
    }

    #[tokio::test]
    async fn test_non_scalar_prediction_is_hard_failure() {
        let pipeline = SubmissionPipeline::new(
            ScriptedClient::new(vec![ScriptedClient::ok(
                200,
                r#"{"predicted_completion_date": ["2025-01-01"]}"#,
            )]),
            MemorySink::new(),
        );

        let settlement = pipeline.submit(&filled_form()).await;

        assert!(matches!(settlement, Settlement::Failure(msg) if msg.contains("unexpected value")));
    }

    #[tokio::test]
    async fn test_default_mode_sends_blank_form() {
        let pipeline = SubmissionPipeline::new(
            ScriptedClient::new(vec![ScriptedClient::ok(200, SUCCESS_BODY)]),
            MemorySink::new(),
        );
        let form = FormState {
            enrollment: "250".to_string(),
            phases: "phase 1".to_string(),
            ..FormState::new()
        };

        let settlement = pipeline.submit(&form).await;

        assert_eq!(settlement, Settlement::Success("2025-01-01".to_string()));
        assert_eq!(pipeline.client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_strict_rejection_sends_nothing() {
        let sink = MemorySink::new();
        let client = ScriptedClient::new(vec![]);
        let pipeline =
            SubmissionPipeline::new(client, sink.clone()).with_validation(ValidationMode::Strict);
        let mut form = filled_form();
        form.enrollment = "many".to_string();

        let settlement = pipeline.submit(&form).await;

        assert!(matches!(settlement, Settlement::Rejected(msg) if msg.contains("Enrollment")));
        assert_eq!(pipeline.client.calls.load(Ordering::SeqCst), 0);
        assert!(!pipeline.is_loading());
        assert!(matches!(pipeline.result(), SubmissionResult::Error(_)));
        assert_eq!(sink.last().unwrap().title, "Error");
    }

    #[tokio::test]
    async fn test_lenient_mode_sends_malformed_values() {
        let pipeline = SubmissionPipeline::new(
            ScriptedClient::new(vec![ScriptedClient::ok(200, SUCCESS_BODY)]),
            MemorySink::new(),
        )
        .with_validation(ValidationMode::Lenient);
        let mut form = filled_form();
        form.enrollment = "many".to_string();

        let settlement = pipeline.submit(&form).await;

        assert_eq!(settlement, Settlement::Success("2025-01-01".to_string()));
        assert_eq!(pipeline.client.calls.load(Ordering::SeqCst), 1);
    }

    /// Blocks inside `predict` until released.
    struct GatedClient {
        started: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl PredictionClient for GatedClient {
        async fn predict(&self, _request: &PredictionRequest) -> Result<PredictionReply> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(PredictionReply {
                status: 200,
                body: SUCCESS_BODY.to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_loading_only_while_request_is_outstanding() {
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let pipeline = SubmissionPipeline::new(
            GatedClient {
                started: started.clone(),
                release: release.clone(),
            },
            MemorySink::new(),
        );
        let form = filled_form();

        assert!(!pipeline.is_loading());

        let observe = async {
            started.notified().await;
            assert!(pipeline.is_loading());
            assert_eq!(pipeline.result(), SubmissionResult::Loading);
            release.notify_one();
        };
        let (settlement, ()) = tokio::join!(pipeline.submit(&form), observe);

        assert_eq!(settlement, Settlement::Success("2025-01-01".to_string()));
        assert!(!pipeline.is_loading());
    }

    /// Each call waits on the reply channel registered for its NCT ID.
    struct ChannelClient {
        pending: Mutex<HashMap<String, oneshot::Receiver<PredictionReply>>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PredictionClient for ChannelClient {
        async fn predict(&self, request: &PredictionRequest) -> Result<PredictionReply> {
            let rx = self.pending.lock().unwrap().remove(&request.nct_id).unwrap();
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(rx.await.unwrap())
        }
    }

    async fn wait_for_calls(client: &ChannelClient, count: usize) {
        while client.calls.load(Ordering::SeqCst) < count {
            tokio::task::yield_now().await;
        }
    }

    fn reply_with(date: &str) -> PredictionReply {
        PredictionReply {
            status: 200,
            body: format!(r#"{{"predicted_completion_date": "{}"}}"#, date),
        }
    }

    #[tokio::test]
    async fn test_late_response_of_older_submission_is_ignored() {
        let (first_tx, first_rx) = oneshot::channel();
        let (second_tx, second_rx) = oneshot::channel();
        let mut pending = HashMap::new();
        pending.insert("FIRST".to_string(), first_rx);
        pending.insert("SECOND".to_string(), second_rx);

        let sink = MemorySink::new();
        let pipeline = Arc::new(SubmissionPipeline::new(
            ChannelClient {
                pending: Mutex::new(pending),
                calls: AtomicUsize::new(0),
            },
            sink.clone(),
        ));

        let mut first_form = filled_form();
        first_form.nct_id = "FIRST".to_string();
        let mut second_form = filled_form();
        second_form.nct_id = "SECOND".to_string();

        let p = pipeline.clone();
        let first = tokio::spawn(async move { p.submit(&first_form).await });
        wait_for_calls(&pipeline.client, 1).await;

        let p = pipeline.clone();
        let second = tokio::spawn(async move { p.submit(&second_form).await });
        wait_for_calls(&pipeline.client, 2).await;

        second_tx.send(reply_with("2030-02-02")).unwrap();
        assert_eq!(
            second.await.unwrap(),
            Settlement::Success("2030-02-02".to_string())
        );

        first_tx.send(reply_with("2020-01-01")).unwrap();
        assert_eq!(first.await.unwrap(), Settlement::Superseded);

        assert_eq!(pipeline.result(), SubmissionResult::Success("2030-02-02".to_string()));
        assert_eq!(sink.notifications().len(), 1);
    }

    #[tokio::test]
    async fn test_loading_persists_until_latest_settles() {
        let (first_tx, first_rx) = oneshot::channel();
        let (second_tx, second_rx) = oneshot::channel();
        let mut pending = HashMap::new();
        pending.insert("FIRST".to_string(), first_rx);
        pending.insert("SECOND".to_string(), second_rx);

        let pipeline = Arc::new(SubmissionPipeline::new(
            ChannelClient {
                pending: Mutex::new(pending),
                calls: AtomicUsize::new(0),
            },
            MemorySink::new(),
        ));

        let mut first_form = filled_form();
        first_form.nct_id = "FIRST".to_string();
        let mut second_form = filled_form();
        second_form.nct_id = "SECOND".to_string();

        let p = pipeline.clone();
        let first = tokio::spawn(async move { p.submit(&first_form).await });
        wait_for_calls(&pipeline.client, 1).await;
        let p = pipeline.clone();
        let second = tokio::spawn(async move { p.submit(&second_form).await });
        wait_for_calls(&pipeline.client, 2).await;

        first_tx.send(reply_with("2020-01-01")).unwrap();
        assert_eq!(first.await.unwrap(), Settlement::Superseded);
        assert!(pipeline.is_loading());

        second_tx.send(reply_with("2031-03-03")).unwrap();
        second.await.unwrap();
        assert!(!pipeline.is_loading());
    }
}
