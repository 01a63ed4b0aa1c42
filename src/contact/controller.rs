use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use super::{
    notice::Notice,
    relay::{DeliveryError, Relay, RelayRequest},
    ContactFields, Submission, ValidationError,
};
use crate::config::ContactConfig;

/// How long the button shows the success/failure state before going idle.
pub const RESET_DELAY: Duration = Duration::from_secs(3);

pub const SENT_MESSAGE: &str =
    "Your message has been sent successfully! I'll get back to you soon.";
pub const FAILED_MESSAGE: &str =
    "Failed to send message. Please try again or contact me directly.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormState {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

impl FormState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }

    pub fn button_label(&self) -> &'static str {
        match self {
            Self::Idle => "Send Message",
            Self::Loading => "Sending Message...",
            Self::Success => "Message Sent!",
            Self::Error => "Try Again",
        }
    }

    pub fn button_class(&self) -> &'static str {
        match self {
            Self::Idle => "",
            Self::Loading => "loading",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// A validated submission cleared to go to the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub submission: Submission,
    pub epoch: u64,
}

/// The synchronous half of the controller: field values, state and the
/// epoch of the latest dispatch.
#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    fields: ContactFields,
    state: FormState,
    epoch: u64,
}

impl ContactForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn fields(&self) -> &ContactFields {
        &self.fields
    }

    pub fn is_in_flight(&self) -> bool {
        self.state == FormState::Loading
    }

    /// Validates `snapshot` and moves to loading. `Ok(None)` means a send is
    /// already in flight and the attempt is dropped.
    pub fn begin(
        &mut self,
        snapshot: ContactFields,
    ) -> Result<Option<Dispatch>, ValidationError> {
        if self.is_in_flight() {
            return Ok(None);
        }
        self.fields = snapshot.trimmed();
        let submission = Submission::try_from(&self.fields)?;
        self.epoch += 1;
        self.state = FormState::Loading;
        Ok(Some(Dispatch {
            submission,
            epoch: self.epoch,
        }))
    }

    /// Records the relay outcome for `epoch`. Fields are cleared only on
    /// success so a failed message can be resent as is.
    pub fn complete(&mut self, epoch: u64, result: &Result<(), DeliveryError>) -> FormState {
        if epoch != self.epoch || !self.is_in_flight() {
            return self.state;
        }
        self.state = match result {
            Ok(()) => {
                self.fields = ContactFields::default();
                FormState::Success
            }
            Err(_) => FormState::Error,
        };
        self.state
    }

    /// Reset timer callback. Only the timer armed by the latest dispatch may
    /// return the form to idle, and only from a terminal state.
    pub fn settle(&mut self, epoch: u64) -> bool {
        if epoch == self.epoch && self.state.is_terminal() {
            self.state = FormState::Idle;
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Dropped,
    Invalid(ValidationError),
    Delivered { epoch: u64 },
    Failed { epoch: u64, error: DeliveryError },
}

impl SubmitOutcome {
    /// Epoch to hand to the reset timer, if the submit reached the relay.
    pub fn epoch(&self) -> Option<u64> {
        match self {
            Self::Delivered { epoch } | Self::Failed { epoch, .. } => Some(*epoch),
            Self::Dropped | Self::Invalid(_) => None,
        }
    }

    pub fn notice(&self) -> Option<Notice> {
        match self {
            Self::Dropped => None,
            Self::Invalid(err) => Some(Notice::error(err.to_string())),
            Self::Delivered { .. } => Some(Notice::success(SENT_MESSAGE)),
            Self::Failed { .. } => Some(Notice::error(FAILED_MESSAGE)),
        }
    }
}

/// Validates, guards and delivers contact submissions through a [`Relay`].
pub struct ContactController<R> {
    relay: Arc<R>,
    config: Arc<ContactConfig>,
    form: Arc<Mutex<ContactForm>>,
}

impl<R> Clone for ContactController<R> {
    fn clone(&self) -> Self {
        Self {
            relay: Arc::clone(&self.relay),
            config: Arc::clone(&self.config),
            form: Arc::clone(&self.form),
        }
    }
}

impl<R: Relay> ContactController<R> {
    pub fn new(config: ContactConfig, relay: R) -> Self {
        Self {
            relay: Arc::new(relay),
            config: Arc::new(config),
            form: Arc::new(Mutex::new(ContactForm::new())),
        }
    }

    fn form(&self) -> MutexGuard<'_, ContactForm> {
        self.form.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> FormState {
        self.form().state()
    }

    pub fn fields(&self) -> ContactFields {
        self.form().fields().clone()
    }

    pub fn is_in_flight(&self) -> bool {
        self.form().is_in_flight()
    }

    /// Synchronous half of a submit: guard and validation. Callers on an
    /// event loop use this directly so the guard is set before yielding.
    pub fn begin(&self, snapshot: ContactFields) -> Result<Option<Dispatch>, ValidationError> {
        self.form().begin(snapshot)
    }

    /// Sends one dispatch through the relay and records the outcome.
    pub async fn deliver(&self, dispatch: Dispatch) -> SubmitOutcome {
        let Dispatch { submission, epoch } = dispatch;
        let request = RelayRequest::stamped_now(&self.config, &submission);
        let result = self.relay.send(&request).await;
        self.form().complete(epoch, &result);

        match result {
            Ok(()) => SubmitOutcome::Delivered { epoch },
            Err(error) => {
                log::error!("contact relay error: {}", error);
                SubmitOutcome::Failed { epoch, error }
            }
        }
    }

    pub async fn submit(&self, snapshot: ContactFields) -> SubmitOutcome {
        match self.begin(snapshot) {
            Ok(Some(dispatch)) => self.deliver(dispatch).await,
            Ok(None) => {
                log::debug!("contact submit ignored, a message is already sending");
                SubmitOutcome::Dropped
            }
            Err(err) => {
                log::debug!("contact form invalid: {}", err);
                SubmitOutcome::Invalid(err)
            }
        }
    }

    pub fn settle(&self, epoch: u64) -> bool {
        self.form().settle(epoch)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        future::Future,
        pin::Pin,
        task::{Context, Poll},
    };

    use futures::{executor::block_on, future::join};
    use http::StatusCode;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::contact::Violation;

    #[derive(Default)]
    struct YieldOnce(bool);

    impl Future for YieldOnce {
        type Output = ();

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            if self.0 {
                Poll::Ready(())
            } else {
                self.0 = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }

    #[derive(Clone, Default)]
    struct RecordingRelay {
        calls: Arc<Mutex<Vec<RelayRequest>>>,
        fail: bool,
        suspend: bool,
    }

    impl RecordingRelay {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<RelayRequest> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Relay for RecordingRelay {
        async fn send(&self, request: &RelayRequest) -> Result<(), DeliveryError> {
            self.calls.lock().unwrap().push(request.clone());
            if self.suspend {
                YieldOnce::default().await;
            }
            if self.fail {
                Err(DeliveryError::Rejected {
                    status: StatusCode::BAD_GATEWAY,
                    message: "upstream down".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn config() -> ContactConfig {
        ContactConfig {
            endpoint: "https://relay.test/send".to_string(),
            service_id: "service_abc".to_string(),
            template_id: "template_xyz".to_string(),
            public_key: "pk_123".to_string(),
            recipient_name: "Jordan Lee".to_string(),
        }
    }

    fn jane() -> ContactFields {
        ContactFields {
            name: "Jane".to_string(),
            email: "jane@x.com".to_string(),
            subject: "Hi".to_string(),
            message: "Hello".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_submit_sends_once() {
        let relay = RecordingRelay::default();
        let ctrl = ContactController::new(config(), relay.clone());

        let outcome = block_on(ctrl.submit(jane()));
        assert_eq!(outcome, SubmitOutcome::Delivered { epoch: 1 });

        let calls = relay.calls();
        assert_eq!(calls.len(), 1);
        let params = &calls[0].template_params;
        assert_eq!(params.from_email, "jane@x.com");
        assert_eq!(params.reply_to, "jane@x.com");
        assert_eq!(params.to_name, "Jordan Lee");
        assert!(!params.timestamp.is_empty());
    }

    #[test]
    fn test_invalid_submit_never_sends() {
        let relay = RecordingRelay::default();
        let ctrl = ContactController::new(config(), relay.clone());

        let bad = ContactFields {
            email: "bad".to_string(),
            ..Default::default()
        };
        let outcome = block_on(ctrl.submit(bad));
        match &outcome {
            SubmitOutcome::Invalid(err) => assert_eq!(err.violations.len(), 4),
            other => panic!("expected validation failure, got {other:?}"),
        }
        assert!(relay.calls().is_empty());
        assert_eq!(ctrl.state(), FormState::Idle);
        assert_eq!(outcome.epoch(), None);
        assert_eq!(
            outcome.notice().map(|n| n.kind),
            Some(crate::contact::NoticeKind::Error)
        );
    }

    #[test]
    fn test_each_blank_required_field_is_named() {
        let blanks: [(fn(&mut ContactFields), Violation); 4] = [
            (|f: &mut ContactFields| f.name.clear(), Violation::MissingName),
            (|f: &mut ContactFields| f.email.clear(), Violation::MissingEmail),
            (|f: &mut ContactFields| f.subject = "   ".to_string(), Violation::MissingSubject),
            (|f: &mut ContactFields| f.message.clear(), Violation::MissingMessage),
        ];
        for (blank, violation) in blanks {
            let relay = RecordingRelay::default();
            let ctrl = ContactController::new(config(), relay.clone());
            let mut fields = jane();
            blank(&mut fields);

            let outcome = block_on(ctrl.submit(fields));
            assert_eq!(
                outcome,
                SubmitOutcome::Invalid(ValidationError {
                    violations: vec![violation]
                })
            );
            assert!(relay.calls().is_empty());
        }
    }

    #[test]
    fn test_success_clears_fields_then_settles() {
        let ctrl = ContactController::new(config(), RecordingRelay::default());

        let outcome = block_on(ctrl.submit(jane()));
        assert_eq!(ctrl.state(), FormState::Success);
        assert_eq!(ctrl.fields(), ContactFields::default());
        assert!(!ctrl.is_in_flight());
        assert_eq!(outcome.notice(), Some(Notice::success(SENT_MESSAGE)));

        let epoch = outcome.epoch().unwrap();
        assert!(ctrl.settle(epoch));
        assert_eq!(ctrl.state(), FormState::Idle);
    }

    #[test]
    fn test_failure_keeps_fields_then_settles() {
        let ctrl = ContactController::new(config(), RecordingRelay::failing());

        let mut padded = jane();
        padded.name = "  Jane  ".to_string();
        let outcome = block_on(ctrl.submit(padded));
        assert!(matches!(outcome, SubmitOutcome::Failed { epoch: 1, .. }));
        assert_eq!(ctrl.state(), FormState::Error);
        assert_eq!(ctrl.fields(), jane());
        assert_eq!(outcome.notice(), Some(Notice::error(FAILED_MESSAGE)));

        assert!(ctrl.settle(1));
        assert_eq!(ctrl.state(), FormState::Idle);
    }

    #[test]
    fn test_submit_while_loading_is_dropped() {
        let relay = RecordingRelay {
            suspend: true,
            ..Default::default()
        };
        let ctrl = ContactController::new(config(), relay.clone());

        let (first, second) = block_on(join(ctrl.submit(jane()), async {
            assert!(ctrl.is_in_flight());
            let dropped = ctrl.submit(jane()).await;
            let also_dropped = ctrl.submit(ContactFields::default()).await;
            (dropped, also_dropped)
        }));

        assert_eq!(first, SubmitOutcome::Delivered { epoch: 1 });
        assert_eq!(second, (SubmitOutcome::Dropped, SubmitOutcome::Dropped));
        assert_eq!(relay.calls().len(), 1);
        assert_eq!(ctrl.state(), FormState::Success);
    }

    #[test]
    fn test_stale_reset_timer_is_ignored() {
        let mut form = ContactForm::new();
        let first = form
            .begin(jane())
            .unwrap()
            .expect("form should accept the first submit")
            .epoch;
        // loading is never reset by a timer
        assert!(!form.settle(first));
        form.complete(first, &Ok(()));

        let second = form
            .begin(jane())
            .unwrap()
            .expect("terminal state should accept a new submit")
            .epoch;
        assert_eq!(form.begin(jane()), Ok(None));
        assert!(!form.settle(first));
        assert_eq!(form.state(), FormState::Loading);

        form.complete(
            second,
            &Err(DeliveryError::Network("offline".to_string())),
        );
        assert!(!form.settle(first));
        assert_eq!(form.state(), FormState::Error);
        assert!(form.settle(second));
        assert_eq!(form.state(), FormState::Idle);
    }

    #[test]
    fn test_invalid_submit_keeps_terminal_state() {
        let mut form = ContactForm::new();
        let epoch = form.begin(jane()).unwrap().unwrap().epoch;
        form.complete(epoch, &Err(DeliveryError::Network("offline".to_string())));

        assert!(form.begin(ContactFields::default()).is_err());
        assert_eq!(form.state(), FormState::Error);
        // the rejected submit did not claim a new epoch
        assert!(form.settle(epoch));
    }

    #[test]
    fn test_reset_delay_is_three_seconds() {
        assert_eq!(RESET_DELAY, Duration::from_secs(3));
    }

    #[test]
    fn test_button_presentation() {
        assert_eq!(FormState::Idle.button_label(), "Send Message");
        assert_eq!(FormState::Loading.button_class(), "loading");
        assert!(FormState::Error.is_terminal());
        assert!(!FormState::Loading.is_terminal());
    }
}
