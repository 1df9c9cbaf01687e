//! [`Query`] collection related to the multiple [`Account`]s.

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::{domain::Role, read::Account};

use super::BackendQuery;

/// Queries the [`Account`]s having the provided [`Role`].
pub type ByRole = BackendQuery<By<Vec<Account>, Role>>;
