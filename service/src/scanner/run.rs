//! Driver running a started [`Engine`] against the [`Service`].

use std::future::Future;

use tokio::{pin, sync::mpsc, time};
use tracerr::Traced;
use tracing as log;

use crate::{
    command::{submit_scan, SubmitScan},
    domain::{
        attendance::{Outcome, Receipt},
        ClassSession,
    },
    Command, Service,
};

use super::{Decoder, Engine, State, Submission};

/// Event emitted while [`run`]ning an [`Engine`].
#[derive(Clone, Debug)]
pub enum Event {
    /// Scanning has started for the [`ClassSession`].
    Started(ClassSession),

    /// Decoded payload has been ignored.
    Ignored(String),

    /// [`Submission`] is in flight.
    Submitted(Submission),

    /// [`Submission`] has completed with the [`Outcome`] now shown.
    Completed(Outcome),

    /// Shown [`Outcome`] has been cleared and scanning resumed.
    Resumed,

    /// Scanning has stopped and the camera is released.
    Stopped(StopReason),
}

/// Reason [`run`] has returned for.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StopReason {
    /// Shutdown has been requested.
    Shutdown,

    /// [`Decoder`] has stopped on its own.
    DecoderEnded,

    /// Session has expired.
    Unauthorized,

    /// [`Engine`] was not scanning.
    NotStarted,
}

/// Runs the provided started [`Engine`], submitting decoded scans via the
/// [`Service`] until the `shutdown` resolves, the [`Decoder`] ends or the
/// session expires.
///
/// The [`Engine`] is stopped (releasing the [`Decoder`]) before returning.
/// If the `shutdown` resolves while a [`Submission`] is in flight, the
/// camera is released right away, and the [`Submission`] result is awaited
/// and discarded.
pub async fn run<Be, D>(
    engine: &mut Engine<D>,
    service: &Service<Be>,
    events: &mpsc::UnboundedSender<Event>,
    shutdown: impl Future<Output = ()>,
) -> StopReason
where
    D: Decoder,
    Service<Be>: Command<
        SubmitScan,
        Ok = Receipt,
        Err = Traced<submit_scan::ExecutionError>,
    >,
{
    let emit = |event| {
        if events.send(event).is_err() {
            log::trace!("scanner events receiver is gone");
        }
    };

    if engine.state() != State::Scanning {
        return StopReason::NotStarted;
    }
    if let Some(class) = engine.class() {
        emit(Event::Started(class.clone()));
    }

    pin!(shutdown);
    let reason = loop {
        if let Some(at) = engine.resume_at() {
            tokio::select! {
                () = &mut shutdown => break StopReason::Shutdown,
                () = time::sleep_until(at) => {
                    if engine.resume(time::Instant::now()) {
                        emit(Event::Resumed);
                    }
                    continue;
                }
            }
        }

        let Some(decoder) = engine.scanning_decoder() else {
            break StopReason::NotStarted;
        };
        let payload = tokio::select! {
            () = &mut shutdown => break StopReason::Shutdown,
            payload = decoder.next() => payload,
        };
        let Some(payload) = payload else {
            log::warn!("QR decoder has stopped unexpectedly");
            break StopReason::DecoderEnded;
        };

        let Some(submission) = engine.decoded(&payload) else {
            emit(Event::Ignored(payload));
            continue;
        };
        emit(Event::Submitted(submission));

        let submit = service.execute(SubmitScan(submission.scan()));
        pin!(submit);
        let result = tokio::select! {
            res = &mut submit => res,
            () = &mut shutdown => {
                engine.stop();
                log::debug!("awaiting in-flight submission before stopping");
                drop(submit.await);
                break StopReason::Shutdown;
            }
        };

        let unauthorized =
            matches!(&result, Err(e) if e.as_ref().is_unauthorized());
        let result = result.map_err(|e| {
            let e = e.as_ref();
            log::warn!("attendance submission failed: {e}");
            e.to_string()
        });
        if engine.complete(submission, result) {
            if let Some(outcome) = engine.outcome() {
                emit(Event::Completed(outcome.clone()));
            }
        }
        if unauthorized {
            break StopReason::Unauthorized;
        }
    };

    engine.stop();
    emit(Event::Stopped(reason));
    reason
}

#[cfg(test)]
mod spec {
    use std::{
        future,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
        time::Duration,
    };

    use common::operations::Perform;
    use tokio::{sync::mpsc, time};
    use tracerr::Traced;

    use crate::{
        domain::attendance::{Outcome, Receipt, Scan, Status},
        infra::{backend, Backend, MemoryStorage},
        scanner::{
            spec::{class, FakeCamera, FakeDecoder},
            Config, Engine, State,
        },
        session, Service,
    };

    use super::{run, Event, StopReason};

    /// [`Backend`] answering scans after a delay.
    #[derive(Debug)]
    struct FakeBackend {
        delay: Duration,
        calls: Arc<AtomicUsize>,
        reject: Option<backend::Error>,
    }

    impl FakeBackend {
        fn new(delay: Duration) -> Self {
            Self {
                delay,
                calls: Arc::new(AtomicUsize::new(0)),
                reject: None,
            }
        }
    }

    impl Backend<Perform<Scan>> for FakeBackend {
        type Ok = Receipt;
        type Err = Traced<backend::Error>;

        async fn execute(
            &self,
            Perform(scan): Perform<Scan>,
        ) -> Result<Self::Ok, Self::Err> {
            _ = self.calls.fetch_add(1, Ordering::SeqCst);
            time::sleep(self.delay).await;
            match &self.reject {
                Some(backend::Error::Unauthorized { message }) => {
                    Err(tracerr::new!(backend::Error::Unauthorized {
                        message: message.clone(),
                    }))
                }
                Some(e) => Err(tracerr::new!(backend::Error::Rejected {
                    status: 409,
                    message: e.to_string(),
                })),
                None => Ok(Receipt {
                    student_name: format!("Student {}", scan.student_id),
                    status: Status::Present,
                    scan_time: None,
                }),
            }
        }
    }

    fn service(backend: FakeBackend) -> Service<FakeBackend> {
        let store = session::Store::hydrate(MemoryStorage::new());
        Service::new(backend, store)
    }

    async fn started(camera: &FakeCamera) -> Engine<FakeDecoder> {
        let mut engine = Engine::new(Config::default());
        _ = engine.arm(&[class(7, "ongoing")], None).unwrap();
        engine.start(camera).await.unwrap();
        engine
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<Event>) -> Vec<Event> {
        let mut events = vec![];
        while let Ok(ev) = rx.try_recv() {
            events.push(ev);
        }
        events
    }

    #[tokio::test(start_paused = true)]
    async fn submits_once_and_resumes_after_window() {
        let (camera, payloads) = FakeCamera::new();
        let mut engine = started(&camera).await;
        let backend = FakeBackend::new(Duration::from_millis(100));
        let calls = Arc::clone(&backend.calls);
        let service = service(backend);
        let (tx, mut rx) = mpsc::unbounded_channel();

        for payload in ["hello", "42", "42", "43"] {
            payloads.send(payload.into()).unwrap();
        }
        drop(payloads);

        let reason =
            run(&mut engine, &service, &tx, future::pending()).await;

        assert_eq!(reason, StopReason::DecoderEnded);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(engine.state(), State::Idle);
        assert_eq!(camera.releases(), 1);
        assert_eq!(engine.history().len(), 3);

        let events = drain(&mut rx);
        assert!(matches!(events.first(), Some(Event::Started(_))));
        assert!(matches!(&events[1], Event::Ignored(p) if p == "hello"));
        let completed = events
            .iter()
            .filter(|e| matches!(e, Event::Completed(Outcome::Success(_))))
            .count();
        assert_eq!(completed, 3);
        let resumed =
            events.iter().filter(|e| matches!(e, Event::Resumed)).count();
        assert_eq!(resumed, 3);
        assert!(matches!(
            events.last(),
            Some(Event::Stopped(StopReason::DecoderEnded)),
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_mid_submission_releases_camera_first() {
        let (camera, payloads) = FakeCamera::new();
        let mut engine = started(&camera).await;
        let service = service(FakeBackend::new(Duration::from_secs(10)));
        let (tx, mut rx) = mpsc::unbounded_channel();

        payloads.send("42".into()).unwrap();
        let reason = run(
            &mut engine,
            &service,
            &tx,
            time::sleep(Duration::from_secs(1)),
        )
        .await;

        assert_eq!(reason, StopReason::Shutdown);
        assert_eq!(camera.releases(), 1);
        assert_eq!(engine.state(), State::Idle);
        assert!(engine.history().is_empty());
        assert!(!drain(&mut rx)
            .iter()
            .any(|e| matches!(e, Event::Completed(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn failure_is_shown_and_scanning_continues() {
        let (camera, payloads) = FakeCamera::new();
        let mut engine = started(&camera).await;
        let mut backend = FakeBackend::new(Duration::ZERO);
        backend.reject = Some(backend::Error::Rejected {
            status: 409,
            message: "Already marked".into(),
        });
        let service = service(backend);
        let (tx, mut rx) = mpsc::unbounded_channel();

        payloads.send("42".into()).unwrap();
        drop(payloads);
        let reason =
            run(&mut engine, &service, &tx, future::pending()).await;

        assert_eq!(reason, StopReason::DecoderEnded);
        assert!(engine.history().is_empty());
        assert!(drain(&mut rx).iter().any(|e| matches!(
            e,
            Event::Completed(Outcome::Failure { message })
                if message == "Already marked",
        )));
    }

    #[tokio::test(start_paused = true)]
    async fn expired_session_stops_scanning() {
        let (camera, payloads) = FakeCamera::new();
        let mut engine = started(&camera).await;
        let mut backend = FakeBackend::new(Duration::ZERO);
        backend.reject = Some(backend::Error::Unauthorized {
            message: "Session expired".into(),
        });
        let service = service(backend);
        let (tx, _rx) = mpsc::unbounded_channel();

        payloads.send("42".into()).unwrap();
        let reason =
            run(&mut engine, &service, &tx, future::pending()).await;

        assert_eq!(reason, StopReason::Unauthorized);
        assert_eq!(camera.releases(), 1);
    }

    #[tokio::test]
    async fn refuses_engine_not_scanning() {
        let mut engine = Engine::<FakeDecoder>::new(Config::default());
        let service = service(FakeBackend::new(Duration::ZERO));
        let (tx, _rx) = mpsc::unbounded_channel();

        let reason =
            run(&mut engine, &service, &tx, future::pending()).await;

        assert_eq!(reason, StopReason::NotStarted);
    }
}
