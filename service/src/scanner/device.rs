//! [`Camera`] and [`Decoder`] abstractions.

use std::{future::Future, io};

use derive_more::{Display, Error};

/// Source of [`Decoder`]s.
pub trait Camera {
    /// [`Decoder`] acquired from this [`Camera`].
    type Decoder: Decoder;

    /// Acquires exclusive access to this [`Camera`].
    ///
    /// # Errors
    ///
    /// If the [`Camera`] is unavailable or cannot be opened.
    fn acquire(
        &self,
    ) -> impl Future<Output = Result<Self::Decoder, DeviceError>>;
}

/// Exclusively owned handle to a running QR decoder.
pub trait Decoder {
    /// Waits for the next decoded payload.
    ///
    /// [`None`] means the decoder has stopped on its own.
    fn next(&mut self) -> impl Future<Output = Option<String>>;

    /// Pauses decoding: payloads decoded while paused are dropped.
    fn pause(&mut self);

    /// Resumes decoding after a [`Decoder::pause()`].
    fn resume(&mut self);

    /// Releases the underlying device.
    fn release(self);
}

/// Error of acquiring a [`Camera`].
#[derive(Debug, Display, Error)]
pub enum DeviceError {
    /// Decoder process cannot be started.
    #[display("Cannot start QR decoder: {_0}")]
    Spawn(io::Error),

    /// Device is unavailable.
    #[display("Camera is unavailable: {_0}")]
    Unavailable(#[error(not(source))] String),
}
