//! [`Command`] for verifying a password reset code.

use common::operations::Perform;
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::user::Email,
    infra::{backend, Backend},
    Service,
};

use super::Command;

/// [`Command`] for verifying a password reset code before choosing a new
/// password.
#[derive(Clone, Debug)]
pub struct VerifyResetCode {
    /// [`Email`] of the user.
    pub email: Email,

    /// Reset code, as typed.
    pub code: String,
}

impl<Be> Command<VerifyResetCode> for Service<Be>
where
    Be: Backend<
        Perform<backend::VerifyResetCode>,
        Ok = (),
        Err = Traced<backend::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        VerifyResetCode { email, code }: VerifyResetCode,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let otp = code.trim().to_owned();
        if otp.is_empty() {
            return Err(tracerr::new!(E::EmptyCode));
        }

        self.backend()
            .execute(Perform(backend::VerifyResetCode { email, otp }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`VerifyResetCode`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Reset code is empty.
    #[display("Enter the code you received")]
    EmptyCode,

    /// [`Backend`] error, e.g. the code is wrong or expired.
    #[display("{_0}")]
    Backend(backend::Error),
}
