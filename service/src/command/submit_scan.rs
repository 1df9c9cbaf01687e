//! [`Command`] for submitting a scanned attendance.

use common::operations::Perform;
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::attendance::{Receipt, Scan},
    infra::{backend, Backend},
    Service,
};

use super::Command;

/// [`Command`] for submitting an attendance [`Scan`].
#[derive(Clone, Copy, Debug, From)]
pub struct SubmitScan(pub Scan);

impl<Be> Command<SubmitScan> for Service<Be>
where
    Be: Backend<Perform<Scan>, Ok = Receipt, Err = Traced<backend::Error>>,
{
    type Ok = Receipt;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        SubmitScan(scan): SubmitScan,
    ) -> Result<Self::Ok, Self::Err> {
        let receipt = self
            .backend()
            .execute(Perform(scan))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))?;
        log::info!(
            "marked student {} as {} in class {}",
            scan.student_id,
            receipt.status,
            scan.class_id,
        );
        Ok(receipt)
    }
}

/// Error of [`SubmitScan`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Backend`] error, e.g. the student is already marked.
    #[display("{_0}")]
    Backend(backend::Error),
}

impl ExecutionError {
    /// Indicates whether the session has expired while submitting.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        match self {
            Self::Backend(e) => e.is_unauthorized(),
        }
    }
}
