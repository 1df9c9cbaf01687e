//! [`Command`] for changing the signed-in user's [`Password`].

use common::operations::Perform;
use derive_more::{Display, Error, From};
use secrecy::SecretBox;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        user::{Password, PasswordError, ProfileUpdate},
        Session,
    },
    infra::{backend, Backend},
    session, Service,
};

use super::Command;

/// [`Command`] for changing the signed-in user's [`Password`].
///
/// Clears the forced password change flag of the [`Session`] on success.
#[derive(Debug)]
pub struct ChangePassword {
    /// Current [`Password`].
    pub current: SecretBox<Password>,

    /// New password, as typed.
    pub new: String,

    /// Confirmation of the new password, as typed.
    pub confirmation: String,
}

impl<Be> Command<ChangePassword> for Service<Be>
where
    Be: Backend<
        Perform<backend::ChangePassword>,
        Ok = (),
        Err = Traced<backend::Error>,
    >,
{
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ChangePassword,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ChangePassword {
            current,
            new,
            confirmation,
        } = cmd;

        let new = Password::new_confirmed(new, confirmation)
            .map_err(tracerr::from_and_wrap!(=> E))?;
        if self.session().current().is_none() {
            return Err(tracerr::new!(E::NoSession));
        }

        self.backend()
            .execute(Perform(backend::ChangePassword {
                current_password: current,
                new_password: SecretBox::new(Box::new(new)),
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        log::info!("password changed");

        self.session()
            .update(ProfileUpdate::password_changed())
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::NoSession)
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`ChangePassword`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// New [`Password`] is not acceptable.
    #[display("{_0}")]
    Validation(PasswordError),

    /// There is no [`Session`] to change the password of.
    #[display("Not signed in")]
    NoSession,

    /// [`Backend`] error, e.g. the current password is wrong.
    #[display("{_0}")]
    Backend(backend::Error),

    /// [`session::Store`] error.
    #[display("Failed to persist session: {_0}")]
    Session(session::Error),
}
