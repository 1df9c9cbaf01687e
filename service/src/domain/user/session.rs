//! [`Session`] definitions.

use derive_more::{AsRef, Debug, FromStr};
use serde::{Deserialize, Serialize};

use super::{Id, Name, Profile, Role};

/// Authenticated identity of the client.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    /// [`Profile`] of the signed-in user.
    pub profile: Profile,

    /// [`Token`] authenticating the backend requests.
    pub token: Token,
}

impl Session {
    /// Returns the ID of the signed-in user.
    #[must_use]
    pub fn identity_id(&self) -> Id {
        self.profile.id
    }

    /// Returns the display [`Name`] of the signed-in user.
    #[must_use]
    pub fn display_name(&self) -> &Name {
        &self.profile.name
    }

    /// Returns the [`Role`] of the signed-in user.
    #[must_use]
    pub fn role(&self) -> Role {
        self.profile.role
    }

    /// Indicates whether the signed-in user must change the password first.
    #[must_use]
    pub fn must_change_password(&self) -> bool {
        self.profile.must_change_password
    }
}

/// Opaque access token of a [`Session`], sent as a `Bearer` credential.
#[derive(AsRef, Clone, Debug, Deserialize, Eq, FromStr, PartialEq, Serialize)]
#[as_ref(str)]
#[debug("Token(..)")]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    /// Creates a new [`Token`] if the provided value is not blank.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        (!token.trim().is_empty()).then_some(Self(token))
    }
}
