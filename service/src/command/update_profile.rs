//! [`Command`] for updating the signed-in user's [`Profile`].

use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::Profile;
use crate::{
    domain::{user::ProfileUpdate, Session},
    session, Service,
};

use super::Command;

/// [`Command`] for merging a [`ProfileUpdate`] into the current [`Session`].
#[derive(Clone, Debug, From)]
pub struct UpdateProfile(pub ProfileUpdate);

impl<Be> Command<UpdateProfile> for Service<Be> {
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        UpdateProfile(update): UpdateProfile,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        self.session()
            .update(update)
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::NoSession)
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`UpdateProfile`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// There is no [`Session`] to update.
    #[display("Not signed in")]
    NoSession,

    /// [`session::Store`] error.
    #[display("Failed to persist session: {_0}")]
    Session(session::Error),
}
