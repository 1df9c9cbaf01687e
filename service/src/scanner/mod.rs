//! QR capture [`Engine`] turning decoded payloads into attendance
//! submissions.
//!
//! ```text
//! Idle ──arm──▶ Armed ──start──▶ Scanning ──decoded──▶ Processing
//!                                   ▲                      │
//!                                   └──resume── ResultShown ◀─complete
//! ```
//!
//! Any state goes back to `Idle` on [`Engine::stop()`], which releases the
//! [`Decoder`] exactly once.

mod device;
pub mod history;
mod run;

use std::{mem, time::Duration};

use derive_more::{Display, Error};
use smart_default::SmartDefault;
use tokio::time::Instant;
use tracing as log;

use crate::domain::{
    attendance::{self, Outcome, Receipt, ScannedAt},
    class, user, ClassSession, ScanEvent,
};

pub use self::{
    device::{Camera, Decoder, DeviceError},
    history::History,
    run::{run, Event, StopReason},
};

/// [`Engine`] configuration.
#[derive(Clone, Copy, Debug, SmartDefault)]
pub struct Config {
    /// Time an [`Outcome`] is shown before scanning resumes.
    #[default(Duration::from_millis(2500))]
    pub display_window: Duration,

    /// Maximum number of [`ScanEvent`]s kept in the [`History`].
    #[default(20)]
    pub history_limit: usize,
}

/// Observable state of an [`Engine`].
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum State {
    /// Nothing selected, the camera is off.
    #[display("idle")]
    Idle,

    /// Ongoing class selected, the camera is off.
    #[display("armed")]
    Armed,

    /// Camera is on and decoding.
    #[display("scanning")]
    Scanning,

    /// Decoder is paused while a [`Submission`] is in flight.
    #[display("processing")]
    Processing,

    /// Decoder is paused while an [`Outcome`] is shown.
    #[display("result shown")]
    ResultShown,
}

/// Attendance scan the [`Engine`] expects to be submitted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Submission {
    /// Sequence number distinguishing submissions of the same [`Scan`].
    ///
    /// [`Scan`]: attendance::Scan
    seq: u64,

    /// [`attendance::Scan`] to submit.
    scan: attendance::Scan,
}

impl Submission {
    /// Returns the [`attendance::Scan`] to submit.
    #[must_use]
    pub const fn scan(&self) -> attendance::Scan {
        self.scan
    }
}

/// Internal phase of an [`Engine`], owning the [`Decoder`] while it runs.
#[derive(Debug)]
enum Phase<D> {
    /// [`State::Idle`].
    Idle,

    /// [`State::Armed`].
    Armed,

    /// [`State::Scanning`].
    Scanning(D),

    /// [`State::Processing`].
    Processing(D, Submission),

    /// [`State::ResultShown`] until the [`Instant`] the scanning resumes at.
    ResultShown(D, Outcome, Instant),
}

/// QR capture state machine.
///
/// Owns the [`Decoder`] exclusively while the camera is on. Dropping the
/// [`Engine`] stops it.
#[derive(Debug)]
pub struct Engine<D: Decoder> {
    /// [`Config`] of this [`Engine`].
    config: Config,

    /// Selected [`ClassSession`], if armed.
    class: Option<ClassSession>,

    /// Current [`Phase`].
    phase: Phase<D>,

    /// [`History`] of accepted scans, kept until the [`Engine`] is dropped.
    history: History,

    /// Sequence number of the last [`Submission`].
    seq: u64,
}

impl<D: Decoder> Engine<D> {
    /// Creates a new [`State::Idle`] [`Engine`] with the provided [`Config`].
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            class: None,
            phase: Phase::Idle,
            history: History::new(config.history_limit),
            seq: 0,
        }
    }

    /// Returns the current [`State`] of this [`Engine`].
    #[must_use]
    pub const fn state(&self) -> State {
        match &self.phase {
            Phase::Idle => State::Idle,
            Phase::Armed => State::Armed,
            Phase::Scanning(_) => State::Scanning,
            Phase::Processing(..) => State::Processing,
            Phase::ResultShown(..) => State::ResultShown,
        }
    }

    /// Returns the selected [`ClassSession`], if any.
    #[must_use]
    pub const fn class(&self) -> Option<&ClassSession> {
        self.class.as_ref()
    }

    /// Returns the [`Outcome`] being shown, if any.
    #[must_use]
    pub const fn outcome(&self) -> Option<&Outcome> {
        match &self.phase {
            Phase::ResultShown(_, outcome, _) => Some(outcome),
            Phase::Idle
            | Phase::Armed
            | Phase::Scanning(_)
            | Phase::Processing(..) => None,
        }
    }

    /// Returns the [`Instant`] the scanning resumes at, if an [`Outcome`] is
    /// being shown.
    #[must_use]
    pub const fn resume_at(&self) -> Option<Instant> {
        match &self.phase {
            Phase::ResultShown(_, _, at) => Some(*at),
            Phase::Idle
            | Phase::Armed
            | Phase::Scanning(_)
            | Phase::Processing(..) => None,
        }
    }

    /// Returns the [`History`] of accepted scans.
    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    /// Selects the [`ClassSession`] to scan attendance into.
    ///
    /// Only ongoing [`ClassSession`]s are selectable. Without an explicit
    /// `selected` ID, the only ongoing one is picked automatically.
    ///
    /// # Errors
    ///
    /// - [`ArmError::Busy`] if the camera is on.
    /// - [`ArmError::NoOngoingClass`] if nothing is ongoing.
    /// - [`ArmError::NotOngoing`] if the `selected` one is not ongoing.
    /// - [`ArmError::SelectionRequired`] if several are ongoing and none is
    ///   `selected`.
    pub fn arm(
        &mut self,
        classes: &[ClassSession],
        selected: Option<class::Id>,
    ) -> Result<&ClassSession, ArmError> {
        if !matches!(self.phase, Phase::Idle | Phase::Armed) {
            return Err(ArmError::Busy);
        }

        let mut ongoing =
            classes.iter().filter(|c| c.is_ongoing()).peekable();
        if ongoing.peek().is_none() {
            return Err(ArmError::NoOngoingClass);
        }
        let class = match selected {
            Some(id) => ongoing
                .find(|c| c.id == id)
                .ok_or(ArmError::NotOngoing(id))?,
            None => {
                let only = ongoing.next().ok_or(ArmError::NoOngoingClass)?;
                if ongoing.next().is_some() {
                    return Err(ArmError::SelectionRequired);
                }
                only
            }
        };

        log::debug!("armed for class {} `{}`", class.id, class.name);
        self.phase = Phase::Armed;
        Ok(self.class.insert(class.clone()))
    }

    /// Turns the camera on, acquiring a [`Decoder`] from the provided
    /// [`Camera`].
    ///
    /// # Errors
    ///
    /// - [`StartError::NotArmed`] if no [`ClassSession`] is selected, or the
    ///   camera is on already.
    /// - [`StartError::Device`] if the [`Camera`] cannot be acquired. The
    ///   [`Engine`] stays [`State::Armed`] then.
    pub async fn start<C>(&mut self, camera: &C) -> Result<(), StartError>
    where
        C: Camera<Decoder = D>,
    {
        if !matches!(self.phase, Phase::Armed) {
            return Err(StartError::NotArmed);
        }

        let decoder = camera.acquire().await.map_err(|e| {
            log::warn!("cannot acquire camera: {e}");
            StartError::Device(e)
        })?;
        log::debug!("scanning started");
        self.phase = Phase::Scanning(decoder);
        Ok(())
    }

    /// Handles the provided decoded `payload`.
    ///
    /// Returns a [`Submission`] to perform if the `payload` is a valid
    /// student ID and the [`Engine`] is [`State::Scanning`]. The [`Decoder`]
    /// is paused until the [`Submission`] completes and its [`Outcome`] has
    /// been shown.
    ///
    /// Anything else is ignored without any transition.
    pub fn decoded(&mut self, payload: &str) -> Option<Submission> {
        let Some(student_id) = parse_payload(payload) else {
            log::debug!("ignoring non-ID payload `{}`", payload.trim());
            return None;
        };
        let class_id = self.class.as_ref()?.id;

        match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Scanning(mut decoder) => {
                decoder.pause();
                self.seq += 1;
                let submission = Submission {
                    seq: self.seq,
                    scan: attendance::Scan {
                        student_id,
                        class_id,
                    },
                };
                log::debug!("decoded student {student_id}, processing");
                self.phase = Phase::Processing(decoder, submission);
                Some(submission)
            }
            other => {
                log::debug!("ignoring payload while not scanning");
                self.phase = other;
                None
            }
        }
    }

    /// Completes the provided [`Submission`] with its `result`.
    ///
    /// Returns `false` (discarding the `result`) if the [`Submission`] is not
    /// the one being processed, e.g. the [`Engine`] has been stopped in the
    /// meantime.
    pub fn complete(
        &mut self,
        submission: Submission,
        result: Result<Receipt, String>,
    ) -> bool {
        match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Processing(decoder, pending) if pending == submission => {
                let outcome = match result {
                    Ok(receipt) => {
                        let event = ScanEvent::new(
                            submission.scan,
                            receipt,
                            ScannedAt::now(),
                        );
                        self.history.record(event.clone());
                        Outcome::Success(event)
                    }
                    Err(message) => Outcome::Failure { message },
                };
                let resume_at = Instant::now() + self.config.display_window;
                self.phase = Phase::ResultShown(decoder, outcome, resume_at);
                true
            }
            other => {
                log::debug!("discarding result of a stale submission");
                self.phase = other;
                false
            }
        }
    }

    /// Clears the shown [`Outcome`] and resumes the [`Decoder`], if the
    /// display window has elapsed by `now`.
    ///
    /// Returns whether the scanning has been resumed.
    pub fn resume(&mut self, now: Instant) -> bool {
        match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::ResultShown(mut decoder, _, at) if now >= at => {
                decoder.resume();
                log::debug!("scanning resumed");
                self.phase = Phase::Scanning(decoder);
                true
            }
            other => {
                self.phase = other;
                false
            }
        }
    }

    /// Stops this [`Engine`], releasing the [`Decoder`] if the camera is on.
    ///
    /// The [`History`] is kept.
    pub fn stop(&mut self) {
        match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Scanning(decoder)
            | Phase::Processing(decoder, _)
            | Phase::ResultShown(decoder, ..) => {
                decoder.release();
                log::debug!("scanning stopped, camera released");
            }
            Phase::Idle | Phase::Armed => {}
        }
        self.class = None;
    }

    /// Returns the running [`Decoder`] if the [`Engine`] is
    /// [`State::Scanning`].
    fn scanning_decoder(&mut self) -> Option<&mut D> {
        match &mut self.phase {
            Phase::Scanning(decoder) => Some(decoder),
            Phase::Idle
            | Phase::Armed
            | Phase::Processing(..)
            | Phase::ResultShown(..) => None,
        }
    }
}

impl<D: Decoder> Drop for Engine<D> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Parses a decoded `payload` as a student ID.
///
/// Only plain positive decimal integers are accepted.
fn parse_payload(payload: &str) -> Option<user::Id> {
    let digits = payload.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().and_then(user::Id::new)
}

/// Error of [`Engine::arm()`].
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
pub enum ArmError {
    /// Camera is on already.
    #[display("Stop the scanner before selecting another class")]
    Busy,

    /// No [`ClassSession`] is ongoing.
    #[display("No ongoing classes right now")]
    NoOngoingClass,

    /// Selected [`ClassSession`] is not ongoing.
    #[display("Class {_0} is not ongoing")]
    NotOngoing(#[error(not(source))] class::Id),

    /// Several [`ClassSession`]s are ongoing, and none is selected.
    #[display("Please select a class first")]
    SelectionRequired,
}

/// Error of [`Engine::start()`].
#[derive(Debug, Display, Error)]
pub enum StartError {
    /// No [`ClassSession`] is selected, or the camera is on already.
    #[display("Please select a class first")]
    NotArmed,

    /// [`Camera`] cannot be acquired.
    #[display("{_0}")]
    Device(DeviceError),
}

#[cfg(test)]
pub(crate) mod spec {
    use std::sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    };

    use tokio::{sync::mpsc, time::Instant};

    use crate::domain::{
        attendance::{Outcome, Receipt, Status},
        class, ClassSession,
    };

    use super::{
        ArmError, Camera, Config, Decoder, DeviceError, Engine, StartError,
        State,
    };

    /// [`Decoder`] fed through a channel, counting its releases.
    #[derive(Debug)]
    pub(crate) struct FakeDecoder {
        pub(crate) payloads: mpsc::UnboundedReceiver<String>,
        pub(crate) paused: Arc<AtomicBool>,
        pub(crate) released: Arc<AtomicUsize>,
    }

    impl Decoder for FakeDecoder {
        async fn next(&mut self) -> Option<String> {
            self.payloads.recv().await
        }

        fn pause(&mut self) {
            self.paused.store(true, Ordering::SeqCst);
        }

        fn resume(&mut self) {
            self.paused.store(false, Ordering::SeqCst);
        }

        fn release(self) {
            _ = self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// [`Camera`] handing out a single [`FakeDecoder`].
    #[derive(Debug)]
    pub(crate) struct FakeCamera {
        pub(crate) decoder: std::sync::Mutex<Option<FakeDecoder>>,
        pub(crate) paused: Arc<AtomicBool>,
        pub(crate) released: Arc<AtomicUsize>,
    }

    impl FakeCamera {
        pub(crate) fn new() -> (Self, mpsc::UnboundedSender<String>) {
            let (tx, rx) = mpsc::unbounded_channel();
            let paused = Arc::new(AtomicBool::new(false));
            let released = Arc::new(AtomicUsize::new(0));
            let decoder = FakeDecoder {
                payloads: rx,
                paused: Arc::clone(&paused),
                released: Arc::clone(&released),
            };
            let camera = Self {
                decoder: std::sync::Mutex::new(Some(decoder)),
                paused,
                released,
            };
            (camera, tx)
        }

        pub(crate) fn broken() -> Self {
            let (camera, _) = Self::new();
            drop(camera.decoder.lock().unwrap().take());
            camera
        }

        pub(crate) fn releases(&self) -> usize {
            self.released.load(Ordering::SeqCst)
        }

        pub(crate) fn is_paused(&self) -> bool {
            self.paused.load(Ordering::SeqCst)
        }
    }

    impl Camera for FakeCamera {
        type Decoder = FakeDecoder;

        async fn acquire(&self) -> Result<FakeDecoder, DeviceError> {
            self.decoder.lock().unwrap().take().ok_or_else(|| {
                DeviceError::Unavailable("permission denied".into())
            })
        }
    }

    pub(crate) fn class(id: u64, status: &str) -> ClassSession {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "class_name": format!("Class {id}"),
            "computed_status": status,
        }))
        .unwrap()
    }

    fn receipt(name: &str) -> Receipt {
        Receipt {
            student_name: name.into(),
            status: Status::Present,
            scan_time: None,
        }
    }

    async fn scanning(camera: &FakeCamera) -> Engine<FakeDecoder> {
        let mut engine = Engine::new(Config::default());
        _ = engine.arm(&[class(7, "ongoing")], None).unwrap();
        engine.start(camera).await.unwrap();
        engine
    }

    #[test]
    fn arms_only_ongoing_classes() {
        let mut engine = Engine::<FakeDecoder>::new(Config::default());

        assert_eq!(
            engine.arm(&[class(1, "upcoming"), class(2, "completed")], None),
            Err(ArmError::NoOngoingClass),
        );
        assert_eq!(engine.arm(&[], None), Err(ArmError::NoOngoingClass));
        assert_eq!(engine.state(), State::Idle);

        let classes = [class(1, "ongoing"), class(2, "upcoming")];
        assert_eq!(engine.arm(&classes, None).unwrap().id.get(), 1);
        assert_eq!(engine.state(), State::Armed);

        let two = class::Id::new(2).unwrap();
        assert_eq!(
            engine.arm(&classes, Some(two)),
            Err(ArmError::NotOngoing(two)),
        );

        let classes = [class(1, "ongoing"), class(3, "ongoing")];
        assert_eq!(
            engine.arm(&classes, None),
            Err(ArmError::SelectionRequired),
        );
        let three = class::Id::new(3).unwrap();
        assert_eq!(engine.arm(&classes, Some(three)).unwrap().id, three);
    }

    #[tokio::test]
    async fn device_error_keeps_engine_armed() {
        let camera = FakeCamera::broken();
        let mut engine = Engine::new(Config::default());
        _ = engine.arm(&[class(7, "ongoing")], None).unwrap();

        let err = engine.start(&camera).await.unwrap_err();

        assert!(matches!(err, StartError::Device(_)));
        assert_eq!(engine.state(), State::Armed);
        assert!(matches!(
            Engine::new(Config::default()).start(&camera).await,
            Err(StartError::NotArmed),
        ));
    }

    #[tokio::test]
    async fn ignores_invalid_payloads() {
        let (camera, _tx) = FakeCamera::new();
        let mut engine = scanning(&camera).await;

        for payload in ["", "  ", "abc", "12abc", "-5", "0", "+5", "1.5"] {
            assert_eq!(engine.decoded(payload), None, "{payload:?}");
            assert_eq!(engine.state(), State::Scanning);
        }
        assert!(!camera.is_paused());

        let submission = engine.decoded(" 42\r\n").unwrap();
        assert_eq!(submission.scan().student_id.get(), 42);
        assert_eq!(submission.scan().class_id.get(), 7);
        assert_eq!(engine.state(), State::Processing);
        assert!(camera.is_paused());
    }

    #[tokio::test]
    async fn never_submits_twice_until_resumed() {
        let (camera, _tx) = FakeCamera::new();
        let mut engine = scanning(&camera).await;

        let submission = engine.decoded("42").unwrap();
        assert_eq!(engine.decoded("43"), None);
        assert_eq!(engine.state(), State::Processing);

        assert!(engine.complete(submission, Ok(receipt("Ana"))));
        assert_eq!(engine.state(), State::ResultShown);
        assert_eq!(engine.decoded("43"), None);
        assert!(!engine.complete(submission, Ok(receipt("Ana"))));

        let at = engine.resume_at().unwrap();
        assert!(!engine.resume(at - std::time::Duration::from_millis(1)));
        assert_eq!(engine.state(), State::ResultShown);
        assert!(engine.resume(at));
        assert_eq!(engine.state(), State::Scanning);
        assert!(engine.outcome().is_none());
        assert!(!camera.is_paused());
        assert!(engine.decoded("43").is_some());
    }

    #[tokio::test]
    async fn failures_are_shown_but_not_recorded() {
        let (camera, _tx) = FakeCamera::new();
        let mut engine = scanning(&camera).await;

        let submission = engine.decoded("42").unwrap();
        assert!(engine.complete(submission, Err("Student not found".into())));

        assert_eq!(
            engine.outcome(),
            Some(&Outcome::Failure {
                message: "Student not found".into(),
            }),
        );
        assert!(engine.history().is_empty());
    }

    #[tokio::test]
    async fn history_is_bounded() {
        let (camera, _tx) = FakeCamera::new();
        let mut engine = scanning(&camera).await;

        for id in 1..=21 {
            let submission = engine.decoded(&id.to_string()).unwrap();
            assert!(engine.complete(submission, Ok(receipt(&id.to_string()))));
            let window = Config::default().display_window;
            assert!(engine.resume(Instant::now() + window));
        }

        assert_eq!(engine.history().len(), 20);
        assert_eq!(engine.history().latest().unwrap().identity_name, "21");
        assert_eq!(
            engine.history().iter().last().unwrap().identity_name,
            "2",
        );
    }

    #[tokio::test]
    async fn releases_decoder_exactly_once() {
        let (camera, _tx) = FakeCamera::new();
        let mut engine = scanning(&camera).await;
        let submission = engine.decoded("42").unwrap();

        engine.stop();
        assert_eq!(camera.releases(), 1);
        assert_eq!(engine.state(), State::Idle);

        assert!(!engine.complete(submission, Ok(receipt("Ana"))));
        assert_eq!(engine.state(), State::Idle);
        assert!(engine.history().is_empty());

        engine.stop();
        drop(engine);
        assert_eq!(camera.releases(), 1);
    }

    #[tokio::test]
    async fn drop_releases_decoder() {
        let (camera, _tx) = FakeCamera::new();
        let engine = scanning(&camera).await;

        drop(engine);

        assert_eq!(camera.releases(), 1);
    }

    #[tokio::test]
    async fn busy_engine_cannot_be_rearmed() {
        let (camera, _tx) = FakeCamera::new();
        let mut engine = scanning(&camera).await;

        assert_eq!(
            engine.arm(&[class(7, "ongoing")], None),
            Err(ArmError::Busy),
        );
        assert_eq!(engine.state(), State::Scanning);
    }
}
