//! [`Query`] collection related to the attendance reports.

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::read::report::{Month, Monthly as Report};

use super::BackendQuery;

/// Queries the monthly [`Report`] for the provided [`Month`].
pub type Monthly = BackendQuery<By<Report, Month>>;
