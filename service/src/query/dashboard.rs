//! [`Query`] collection related to the role dashboards.

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::read::Dashboard;

use super::BackendQuery;

/// Queries the [`Dashboard`] of the signed-in user.
pub type Overview = BackendQuery<By<Dashboard, ()>>;
