//! [`Query`] collection related to attendance records.

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::read::{self, attendance::Params};

use super::BackendQuery;

/// Queries the attendance [`read::History`] visible to the signed-in user.
pub type History = BackendQuery<By<read::History, Params>>;
