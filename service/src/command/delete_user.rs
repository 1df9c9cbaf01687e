//! [`Command`] for deleting a user.

use common::operations::{By, Delete};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::user,
    infra::{backend, Backend},
    read::Account,
    Service,
};

use super::Command;

/// [`Command`] for deleting a user [`Account`].
#[derive(Clone, Copy, Debug, From)]
pub struct DeleteUser(pub user::Id);

impl<Be> Command<DeleteUser> for Service<Be>
where
    Be: Backend<
        Delete<By<Account, user::Id>>,
        Ok = (),
        Err = Traced<backend::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        DeleteUser(id): DeleteUser,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        if self.session().current().is_some_and(|s| s.identity_id() == id) {
            return Err(tracerr::new!(E::SelfDeletion));
        }

        self.backend()
            .execute(Delete(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        log::info!("deleted user {id}");
        Ok(())
    }
}

/// Error of [`DeleteUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Signed-in user cannot delete itself.
    #[display("You cannot delete your own account")]
    SelfDeletion,

    /// [`Backend`] error.
    #[display("{_0}")]
    Backend(backend::Error),
}
