//! [`Command`] for deleting a student record.

use common::operations::{By, Delete};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::user::{self, Student},
    infra::{backend, Backend},
    Service,
};

use super::Command;

/// [`Command`] for deleting a student record along with its account.
#[derive(Clone, Copy, Debug, From)]
pub struct DeleteStudent(pub user::Id);

impl<Be> Command<DeleteStudent> for Service<Be>
where
    Be: Backend<
        Delete<By<Student, user::Id>>,
        Ok = (),
        Err = Traced<backend::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        DeleteStudent(id): DeleteStudent,
    ) -> Result<Self::Ok, Self::Err> {
        self.backend()
            .execute(Delete(By::<Student, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))?;
        log::info!("deleted student {id}");
        Ok(())
    }
}

/// Error of [`DeleteStudent`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Backend`] error.
    #[display("{_0}")]
    Backend(backend::Error),
}
