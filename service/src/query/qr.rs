//! [`Query`] collection related to the student QR codes.

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::read::QrCode;

use super::BackendQuery;

/// Queries the [`QrCode`] of the signed-in student.
pub type Mine = BackendQuery<By<QrCode, ()>>;
