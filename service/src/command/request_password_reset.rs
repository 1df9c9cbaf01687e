//! [`Command`] for requesting a password reset code.

use common::operations::Perform;
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::user::Email,
    infra::{
        backend::{self, RequestResetCode, ResetCode},
        Backend,
    },
    Service,
};

use super::Command;

/// [`Command`] for requesting a password reset code to be sent to an
/// [`Email`].
#[derive(Clone, Debug, From)]
pub struct RequestPasswordReset {
    /// [`Email`] of the user.
    pub email: Email,
}

impl<Be> Command<RequestPasswordReset> for Service<Be>
where
    Be: Backend<
        Perform<RequestResetCode>,
        Ok = ResetCode,
        Err = Traced<backend::Error>,
    >,
{
    type Ok = ResetCode;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        RequestPasswordReset { email }: RequestPasswordReset,
    ) -> Result<Self::Ok, Self::Err> {
        let code = self
            .backend()
            .execute(Perform(RequestResetCode { email }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))?;
        log::info!("password reset code requested");
        Ok(code)
    }
}

/// Error of [`RequestPasswordReset`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Backend`] error, e.g. the [`Email`] is unknown.
    #[display("{_0}")]
    Backend(backend::Error),
}
