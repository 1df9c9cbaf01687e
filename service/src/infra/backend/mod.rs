//! [`Backend`]-related definitions.

#[cfg(feature = "http")]
pub mod http;

use derive_more::{Display, Error as StdError, From};
use secrecy::SecretBox;
use serde::{Deserialize, Serialize};

use crate::domain::{
    lenient,
    user::{expose_password, session::Token, Email, Password, Profile},
    Session,
};

#[cfg(feature = "http")]
pub use self::http::Http;

/// Remote backend operation.
pub use common::Handler as Backend;

/// [`Backend`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Request lacks valid credentials. The session is invalidated by the
    /// time this error is returned.
    #[display("{message}")]
    #[from(ignore)]
    Unauthorized {
        /// Message reported by the backend.
        message: String,
    },

    /// Request has been rejected by the backend.
    #[display("{message}")]
    #[from(ignore)]
    Rejected {
        /// HTTP status code of the response.
        status: u16,

        /// Message reported by the backend.
        message: String,
    },

    /// Backend cannot be reached.
    #[cfg(feature = "http")]
    #[display("Backend is unreachable: {_0}")]
    Transport(reqwest::Error),

    /// Response has unexpected format.
    #[display("Backend sent malformed response: {_0}")]
    Decode(serde_json::Error),

    /// Backend URL is not valid.
    #[display("Invalid backend URL `{url}`: {reason}")]
    #[from(ignore)]
    InvalidUrl {
        /// Invalid URL.
        url: String,

        /// Reason of invalidity.
        reason: String,
    },
}

impl Error {
    /// Indicates whether this [`Error`] is an [`Error::Unauthorized`] one.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Indicates whether this [`Error`] originates from the network rather
    /// than from the backend.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        match self {
            #[cfg(feature = "http")]
            Self::Transport(_) => true,
            Self::Unauthorized { .. }
            | Self::Rejected { .. }
            | Self::Decode(_)
            | Self::InvalidUrl { .. } => false,
        }
    }
}

/// Credentials to sign in with.
#[derive(Debug, Serialize)]
pub struct Login {
    /// [`Email`] of the user.
    pub email: Email,

    /// [`Password`] of the user.
    #[serde(serialize_with = "expose_password")]
    pub password: SecretBox<Password>,
}

/// Response to a successful [`Login`].
#[derive(Clone, Debug, Deserialize)]
pub struct Authenticated {
    /// Issued access [`Token`].
    pub token: Token,

    /// [`Profile`] of the signed-in user.
    pub user: Profile,
}

impl From<Authenticated> for Session {
    fn from(auth: Authenticated) -> Self {
        Self {
            profile: auth.user,
            token: auth.token,
        }
    }
}

/// Request of a password reset code to be sent to the provided [`Email`].
#[derive(Clone, Debug, Serialize)]
pub struct RequestResetCode {
    /// [`Email`] of the user.
    pub email: Email,
}

/// Response to a [`RequestResetCode`].
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ResetCode {
    /// Code itself, echoed back by demo deployments only.
    #[serde(default, deserialize_with = "lenient::text")]
    pub otp_demo: Option<String>,
}

/// Check of a password reset code.
#[derive(Clone, Debug, Serialize)]
pub struct VerifyResetCode {
    /// [`Email`] of the user.
    pub email: Email,

    /// Reset code received by the user.
    pub otp: String,
}

/// Reset of a forgotten password with a verified reset code.
#[derive(Debug, Serialize)]
pub struct ResetPassword {
    /// [`Email`] of the user.
    pub email: Email,

    /// Verified reset code.
    pub otp: String,

    /// New [`Password`].
    #[serde(serialize_with = "expose_password")]
    pub new_password: SecretBox<Password>,
}

/// Change of the signed-in user's password.
#[derive(Debug, Serialize)]
pub struct ChangePassword {
    /// Current [`Password`].
    #[serde(serialize_with = "expose_password")]
    pub current_password: SecretBox<Password>,

    /// New [`Password`].
    #[serde(serialize_with = "expose_password")]
    pub new_password: SecretBox<Password>,
}

#[cfg(test)]
mod spec {
    use secrecy::SecretBox;

    use super::{ChangePassword, Error, Login};

    #[test]
    fn passwords_are_exposed_to_the_wire_only() {
        let login = Login {
            email: "ana@school.test".parse().unwrap(),
            password: SecretBox::new(Box::new("hunter22".into())),
        };

        assert_eq!(
            serde_json::to_string(&login).unwrap(),
            r#"{"email":"ana@school.test","password":"hunter22"}"#,
        );
        assert!(!format!("{login:?}").contains("hunter22"));

        let change = ChangePassword {
            current_password: SecretBox::new(Box::new("old-pass".into())),
            new_password: SecretBox::new(Box::new("new-password".into())),
        };
        assert_eq!(
            serde_json::to_string(&change).unwrap(),
            r#"{"current_password":"old-pass","new_password":"new-password"}"#,
        );
    }

    #[test]
    fn backend_messages_are_shown_verbatim() {
        let err = Error::Rejected {
            status: 409,
            message: "Already scanned".into(),
        };

        assert_eq!(err.to_string(), "Already scanned");
        assert!(!err.is_unauthorized());
        assert!(!err.is_transport());
    }
}
