//! [`Command`] for resetting a forgotten [`Password`].

use common::operations::Perform;
use derive_more::{Display, Error, From};
use secrecy::SecretBox;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::user::{Email, Password, PasswordError},
    infra::{backend, Backend},
    Service,
};

use super::Command;

/// [`Command`] for resetting a forgotten [`Password`] with a verified reset
/// code.
#[derive(Clone, Debug)]
pub struct ResetPassword {
    /// [`Email`] of the user.
    pub email: Email,

    /// Verified reset code.
    pub code: String,

    /// New password, as typed.
    pub new: String,

    /// Confirmation of the new password, as typed.
    pub confirmation: String,
}

impl<Be> Command<ResetPassword> for Service<Be>
where
    Be: Backend<
        Perform<backend::ResetPassword>,
        Ok = (),
        Err = Traced<backend::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ResetPassword,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ResetPassword {
            email,
            code,
            new,
            confirmation,
        } = cmd;

        let new = Password::new_confirmed(new, confirmation)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        self.backend()
            .execute(Perform(backend::ResetPassword {
                email,
                otp: code.trim().to_owned(),
                new_password: SecretBox::new(Box::new(new)),
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        log::info!("password reset");
        Ok(())
    }
}

/// Error of [`ResetPassword`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// New [`Password`] is not acceptable.
    #[display("{_0}")]
    Validation(PasswordError),

    /// [`Backend`] error.
    #[display("{_0}")]
    Backend(backend::Error),
}
