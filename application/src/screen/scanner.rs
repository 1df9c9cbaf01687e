//! Attendance QR scanner screen.

use service::{
    domain::{attendance::Outcome, class},
    infra::ProcessCamera,
    query,
    scanner::{self, ArmError, Engine, Event, StartError, StopReason},
    Query as _,
};
use tokio::sync::mpsc;
use tracing as log;

use crate::{define_error, AsError, Context, Error};

/// Scans attendance QR codes into an ongoing class until interrupted.
///
/// Without a `class` selected, the only ongoing class is picked.
///
/// # Errors
///
/// If there is no class to scan into, the camera cannot be started, or the
/// navigation guard doesn't allow it.
pub async fn scan(
    ctx: &Context,
    class: Option<class::Id>,
) -> Result<(), Error> {
    _ = ctx.enter("/scanner")?;
    let classes = ctx
        .service()
        .execute(query::classes::Ongoing)
        .await
        .map_err(AsError::into_error)?;

    let conf = ctx.scanner();
    let camera = ProcessCamera::from_command(conf.command.iter())
        .ok_or(ScannerError::NoCommand)?;

    let mut engine = Engine::new(conf.into());
    let selected = engine
        .arm(&classes, class)
        .map_err(AsError::into_error)?;
    println!("Class: {} ({})", selected.name, selected.time_span());

    engine.start(&camera).await.map_err(AsError::into_error)?;

    let (tx, rx) = mpsc::unbounded_channel();
    let driver = async {
        let reason = scanner::run(&mut engine, ctx.service(), &tx, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("cannot listen for Ctrl+C: {e}");
            }
        })
        .await;
        drop(tx);
        reason
    };
    let (reason, ()) = tokio::join!(driver, print_events(rx));

    let history = engine.history();
    println!();
    println!("Scanned {} student(s):", history.len());
    for event in history.iter() {
        println!(
            "  {} {:<28} {}",
            event.scanned_at.to_clock_string(),
            event.identity_name,
            event.status,
        );
    }

    match reason {
        StopReason::Unauthorized => Err(ScannerError::SessionExpired.into()),
        StopReason::Shutdown
        | StopReason::DecoderEnded
        | StopReason::NotStarted => Ok(()),
    }
}

/// Prints the [`Event`]s received until the channel is closed.
async fn print_events(mut events: mpsc::UnboundedReceiver<Event>) {
    while let Some(event) = events.recv().await {
        match event {
            Event::Started(class) => {
                println!(
                    "Scanning into `{}`, press Ctrl+C to stop",
                    class.name,
                );
            }
            Event::Ignored(payload) => {
                println!("Not a student QR code: {payload}");
            }
            Event::Submitted(submission) => {
                let scan = submission.scan();
                println!("Processing student #{}...", scan.student_id);
            }
            Event::Completed(Outcome::Success(event)) => {
                println!(
                    "OK   {} marked {}{}",
                    event.identity_name,
                    event.status,
                    event
                        .scan_time
                        .as_deref()
                        .map(|t| format!(" at {t}"))
                        .unwrap_or_default(),
                );
            }
            Event::Completed(Outcome::Failure { message }) => {
                println!("FAIL {message}");
            }
            Event::Resumed => println!("Ready for the next scan"),
            Event::Stopped(reason) => {
                let why = match reason {
                    StopReason::Shutdown => "stopped",
                    StopReason::DecoderEnded => "decoder has exited",
                    StopReason::Unauthorized => "session has expired",
                    StopReason::NotStarted => "camera was not started",
                };
                println!("Scanner is off: {why}");
            }
        }
    }
}

define_error! {
    enum ScannerError {
        #[code = "NO_SCANNER_COMMAND"]
        #[message = "QR decoder command is not configured"]
        NoCommand,

        #[code = "SESSION_EXPIRED"]
        #[message = "Session has expired, please sign in again"]
        SessionExpired,
    }
}

impl AsError for ArmError {
    fn try_as_error(&self) -> Option<Error> {
        let code = match self {
            Self::Busy => "SCANNER_BUSY",
            Self::NoOngoingClass => "NO_ONGOING_CLASS",
            Self::NotOngoing(_) => "CLASS_NOT_ONGOING",
            Self::SelectionRequired => "CLASS_SELECTION_REQUIRED",
        };
        Some(Error {
            code,
            message: self.to_string(),
            backtrace: None,
        })
    }
}

impl AsError for StartError {
    fn try_as_error(&self) -> Option<Error> {
        let code = match self {
            Self::NotArmed => "CLASS_SELECTION_REQUIRED",
            Self::Device(_) => "CAMERA_UNAVAILABLE",
        };
        Some(Error {
            code,
            message: self.to_string(),
            backtrace: None,
        })
    }
}
