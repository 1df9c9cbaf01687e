//! [`Command`] for signing out.

use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{session, Service};

use super::Command;

/// [`Command`] for signing out, destroying the current session.
///
/// Idempotent: signing out without a session is a no-op.
#[derive(Clone, Copy, Debug)]
pub struct SignOut;

impl<Be> Command<SignOut> for Service<Be> {
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, _: SignOut) -> Result<Self::Ok, Self::Err> {
        self.session()
            .clear()
            .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))?;
        log::info!("signed out");
        Ok(())
    }
}

/// Error of [`SignOut`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`session::Store`] error.
    #[display("Failed to remove persisted session: {_0}")]
    Session(session::Error),
}
