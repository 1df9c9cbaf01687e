//! [`Account`] read model definition.

use serde::Deserialize;

use crate::domain::{
    lenient,
    user::{self, StudentDetails},
    Role,
};

/// User account, as listed to admins.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Account {
    /// ID of the account.
    pub id: user::Id,

    /// Name of the account holder.
    pub name: String,

    /// Email of the account holder.
    #[serde(default, deserialize_with = "lenient::text")]
    pub email: Option<String>,

    /// Phone number of the account holder.
    #[serde(default, deserialize_with = "lenient::text")]
    pub phone: Option<String>,

    /// [`Role`] of the account, if reported.
    #[serde(default)]
    pub role: Option<Role>,

    /// [`StudentDetails`] (students only).
    #[serde(flatten)]
    pub details: StudentDetails,
}
