//! [`Command`] for updating a student record.

use common::operations::Update;
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::user::StudentUpdate,
    infra::{backend, Backend},
    Service,
};

use super::Command;

/// [`Command`] for updating a student record.
#[derive(Clone, Debug, From)]
pub struct UpdateStudent(pub StudentUpdate);

impl<Be> Command<UpdateStudent> for Service<Be>
where
    Be: Backend<Update<StudentUpdate>, Ok = (), Err = Traced<backend::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        UpdateStudent(form): UpdateStudent,
    ) -> Result<Self::Ok, Self::Err> {
        let id = form.id;
        self.backend()
            .execute(Update(form))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))?;
        log::info!("updated student {id}");
        Ok(())
    }
}

/// Error of [`UpdateStudent`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Backend`] error.
    #[display("{_0}")]
    Backend(backend::Error),
}
