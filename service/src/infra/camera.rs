//! [`Camera`] backed by an external QR decoder process.

use std::{
    process::Stdio,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use tokio::{
    io::{AsyncBufReadExt as _, BufReader},
    process::{Child, ChildStdout, Command},
    sync::mpsc,
    task::JoinHandle,
};
use tracing as log;

use crate::scanner::{Camera, Decoder, DeviceError};

/// [`Camera`] spawning an external decoder process (`zbarcam` by default),
/// which prints every decoded QR payload as a separate stdout line.
#[derive(Clone, Debug)]
pub struct ProcessCamera {
    /// Program to spawn.
    program: String,

    /// Arguments of the `program`.
    args: Vec<String>,
}

impl ProcessCamera {
    /// Creates a new [`ProcessCamera`] spawning the provided `program`.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: vec![],
        }
    }

    /// Creates a new [`ProcessCamera`] from the provided command line, the
    /// first element being the program.
    ///
    /// [`None`] is returned if the `command` is empty.
    #[must_use]
    pub fn from_command<I, S>(command: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut command = command.into_iter().map(Into::into);
        let program = command.next()?;
        Some(Self::new(program).args(command))
    }

    /// Appends the provided `args` to the spawned command.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl Camera for ProcessCamera {
    type Decoder = ProcessDecoder;

    async fn acquire(&self) -> Result<Self::Decoder, DeviceError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(DeviceError::Spawn)?;
        let stdout = child.stdout.take().ok_or_else(|| {
            DeviceError::Unavailable("decoder output is not captured".into())
        })?;

        let paused = Arc::new(AtomicBool::new(false));
        let (tx, payloads) = mpsc::unbounded_channel();
        let reader =
            tokio::spawn(read_payloads(stdout, Arc::clone(&paused), tx));
        log::debug!("spawned QR decoder `{}`", self.program);

        Ok(ProcessDecoder {
            child,
            reader,
            payloads,
            paused,
        })
    }
}

/// [`Decoder`] reading payloads of a running decoder process.
///
/// The process is killed once the [`ProcessDecoder`] is released or dropped.
#[derive(Debug)]
pub struct ProcessDecoder {
    /// Running decoder process.
    child: Child,

    /// Task forwarding the process output into the `payloads`.
    reader: JoinHandle<()>,

    /// Decoded payloads.
    payloads: mpsc::UnboundedReceiver<String>,

    /// Indicator whether newly decoded payloads are dropped.
    paused: Arc<AtomicBool>,
}

impl ProcessDecoder {
    /// Drops the payloads decoded but not consumed yet.
    fn drain(&mut self) {
        while self.payloads.try_recv().is_ok() {}
    }
}

impl Decoder for ProcessDecoder {
    async fn next(&mut self) -> Option<String> {
        self.payloads.recv().await
    }

    fn pause(&mut self) {
        self.paused.store(true, Ordering::Release);
        self.drain();
    }

    fn resume(&mut self) {
        self.drain();
        self.paused.store(false, Ordering::Release);
    }

    fn release(mut self) {
        self.reader.abort();
        if let Err(e) = self.child.start_kill() {
            log::warn!("failed to kill QR decoder: {e}");
        }
        log::debug!("QR decoder released");
    }
}

/// Forwards every line of the decoder `stdout` into the `payloads`, unless
/// `paused`.
async fn read_payloads(
    stdout: ChildStdout,
    paused: Arc<AtomicBool>,
    payloads: mpsc::UnboundedSender<String>,
) {
    let mut lines = BufReader::new(stdout).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if paused.load(Ordering::Acquire) {
                    log::trace!("dropping payload decoded while paused");
                    continue;
                }
                if payloads.send(line).is_err() {
                    break;
                }
            }
            Ok(None) => {
                log::debug!("QR decoder output closed");
                break;
            }
            Err(e) => {
                log::warn!("failed to read QR decoder output: {e}");
                break;
            }
        }
    }
}

#[cfg(all(test, unix))]
mod spec {
    use crate::scanner::{Camera as _, Decoder as _, DeviceError};

    use super::ProcessCamera;

    #[tokio::test]
    async fn forwards_output_lines() {
        let camera =
            ProcessCamera::from_command(["sh", "-c", "printf '42\\nhello\\n'"])
                .unwrap();

        let mut decoder = camera.acquire().await.unwrap();

        assert_eq!(decoder.next().await.as_deref(), Some("42"));
        assert_eq!(decoder.next().await.as_deref(), Some("hello"));
        assert_eq!(decoder.next().await, None);
        decoder.release();
    }

    #[tokio::test]
    async fn missing_program_is_device_error() {
        let camera = ProcessCamera::new("/nonexistent/qr-decoder");

        let err = camera.acquire().await.unwrap_err();

        assert!(matches!(err, DeviceError::Spawn(_)));
    }

    #[test]
    fn empty_command_is_rejected() {
        assert!(ProcessCamera::from_command(Vec::<String>::new()).is_none());
    }
}
