//! [`Store`] of the client [`Session`].

use std::sync::{Arc, PoisonError, RwLock};

use derive_more::{Display, Error as StdError, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        user::{session::Token, Profile, ProfileUpdate},
        Session,
    },
    infra::storage::{self, Key, Storage},
};

/// Single source of truth about the signed-in identity.
///
/// Cheap to clone: all the clones share the same state.
#[derive(Clone, Debug)]
pub struct Store(Arc<Inner>);

/// Shared state of a [`Store`].
#[derive(Debug)]
struct Inner {
    /// [`Storage`] the [`Session`] is persisted into.
    storage: Box<dyn Storage>,

    /// Current [`Session`], if any.
    current: RwLock<Option<Session>>,
}

impl Store {
    /// Creates a new [`Store`] hydrated from the provided [`Storage`].
    ///
    /// Never touches the network. Partially present or corrupted persisted
    /// state hydrates as no [`Session`].
    #[must_use]
    pub fn hydrate(storage: impl Storage + 'static) -> Self {
        let current = restore(&storage);
        match &current {
            Some(s) => log::debug!(
                "restored session of user {} ({})",
                s.identity_id(),
                s.role(),
            ),
            None => log::debug!("no session to restore"),
        }
        Self(Arc::new(Inner {
            storage: Box::new(storage),
            current: RwLock::new(current),
        }))
    }

    /// Returns the current [`Session`], if any.
    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.0
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the [`Token`] of the current [`Session`], if any.
    #[must_use]
    pub fn token(&self) -> Option<Token> {
        self.0
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.token.clone())
    }

    /// Makes the provided [`Session`] the current one and persists it.
    ///
    /// # Errors
    ///
    /// If the [`Session`] cannot be persisted. It stays current in memory
    /// nevertheless.
    pub fn establish(&self, session: Session) -> Result<(), Traced<Error>> {
        let profile = serde_json::to_string(&session.profile)
            .map_err(tracerr::from_and_wrap!(=> Error))?;
        let token = session.token.clone();

        *self
            .0
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(session);

        self.0
            .storage
            .save(Key::Profile, &profile)
            .map_err(tracerr::map_from_and_wrap!(=> Error))?;
        self.0
            .storage
            .save(Key::Token, token.as_ref())
            .map_err(tracerr::map_from_and_wrap!(=> Error))
    }

    /// Merges the provided [`ProfileUpdate`] into the current [`Session`] and
    /// re-persists its [`Profile`].
    ///
    /// Returns the updated [`Session`], or [`None`] if there is no current
    /// one (the update is dropped then).
    ///
    /// # Errors
    ///
    /// If the updated [`Profile`] cannot be persisted.
    pub fn update(
        &self,
        update: ProfileUpdate,
    ) -> Result<Option<Session>, Traced<Error>> {
        let updated = {
            let mut current = self
                .0
                .current
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let Some(session) = current.as_mut() else {
                log::debug!("no session to update");
                return Ok(None);
            };
            session.profile.apply(update);
            session.clone()
        };

        let profile = serde_json::to_string(&updated.profile)
            .map_err(tracerr::from_and_wrap!(=> Error))?;
        self.0
            .storage
            .save(Key::Profile, &profile)
            .map_err(tracerr::map_from_and_wrap!(=> Error))?;
        Ok(Some(updated))
    }

    /// Destroys the current [`Session`] and its persisted state.
    ///
    /// Idempotent: clearing an empty [`Store`] is a no-op.
    ///
    /// # Errors
    ///
    /// If the persisted state cannot be removed. The [`Session`] is gone from
    /// memory nevertheless.
    pub fn clear(&self) -> Result<(), Traced<Error>> {
        let previous = self
            .0
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(s) = previous {
            log::debug!("cleared session of user {}", s.identity_id());
        }

        let token = self.0.storage.remove(Key::Token);
        let profile = self.0.storage.remove(Key::Profile);
        token
            .and(profile)
            .map_err(tracerr::map_from_and_wrap!(=> Error))
    }
}

/// Restores the persisted [`Session`] from the provided [`Storage`].
fn restore(storage: &dyn Storage) -> Option<Session> {
    let load = |key| {
        storage
            .load(key)
            .map_err(|e| log::warn!("cannot load `{key}`: {e}"))
            .ok()
            .flatten()
    };
    let token = load(Key::Token).and_then(Token::new);
    let profile = load(Key::Profile);

    match (token, profile) {
        (Some(token), Some(profile)) => {
            match serde_json::from_str::<Profile>(&profile) {
                Ok(profile) => Some(Session { profile, token }),
                Err(e) => {
                    log::warn!("ignoring corrupted `{}`: {e}", Key::Profile);
                    None
                }
            }
        }
        (None, None) => None,
        (Some(_), None) | (None, Some(_)) => {
            log::warn!("ignoring partially persisted session");
            None
        }
    }
}

/// [`Store`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Failed to encode the [`Profile`].
    #[display("Failed to encode `Profile`: {_0}")]
    Encode(serde_json::Error),

    /// [`Storage`] error.
    #[display("`Storage` error: {_0}")]
    Storage(storage::Error),
}
