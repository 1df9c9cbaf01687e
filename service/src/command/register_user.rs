//! [`Command`] for registering a new user.

use common::operations::Insert;
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        user::{DefaultPassword, Registration},
        Role,
    },
    infra::{backend, Backend},
    Service,
};

use super::Command;

/// [`Command`] for registering a new user.
///
/// The backend generates a [`DefaultPassword`] the user has to change on
/// the first sign-in.
#[derive(Clone, Debug, From)]
pub struct RegisterUser(pub Registration);

impl<Be> Command<RegisterUser> for Service<Be>
where
    Be: Backend<
        Insert<Registration>,
        Ok = DefaultPassword,
        Err = Traced<backend::Error>,
    >,
{
    type Ok = DefaultPassword;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        RegisterUser(mut form): RegisterUser,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        if form.role == Role::Admin {
            return Err(tracerr::new!(E::AdminRegistration));
        }
        if form.role != Role::Student {
            form.student = None;
        }

        let role = form.role;
        let password = self
            .backend()
            .execute(Insert(form))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        log::info!("registered new {role}");
        Ok(password)
    }
}

/// Error of [`RegisterUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Admins cannot be registered from the client.
    #[display("Admins cannot be registered")]
    AdminRegistration,

    /// [`Backend`] error, e.g. the email is taken.
    #[display("{_0}")]
    Backend(backend::Error),
}
