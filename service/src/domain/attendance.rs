//! Attendance definitions.

use common::{define_kind, unit, DateTimeOf};
use serde::{Deserialize, Serialize};

use super::{class, user};

define_kind! {
    #[doc = "Attendance status of a student in a `ClassSession`."]
    enum Status {
        #[doc = "Scanned in on time."]
        Present,

        #[doc = "Scanned in after the grace period."]
        Late,

        #[doc = "Not scanned in at all."]
        Absent,
    }
}

impl Status {
    /// Indicates whether this [`Status`] counts as attended.
    #[must_use]
    pub const fn is_attended(self) -> bool {
        matches!(self, Self::Present | Self::Late)
    }
}

/// Attendance scan submitted to the backend.
///
/// The backend computes the resulting [`Status`] itself.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct Scan {
    /// ID of the scanned student.
    pub student_id: user::Id,

    /// ID of the `ClassSession` the student is scanned into.
    pub class_id: class::Id,
}

/// Backend acknowledgement of an accepted [`Scan`].
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Receipt {
    /// Name of the scanned student.
    pub student_name: String,

    /// [`Status`] assigned by the backend.
    pub status: Status,

    /// Backend-formatted scan time, if any.
    #[serde(default, deserialize_with = "super::lenient::text")]
    pub scan_time: Option<String>,
}

/// Moment a [`ScanEvent`] has been recorded.
pub type ScannedAt = DateTimeOf<(ScanEvent, unit::Scan)>;

/// Accepted attendance scan, as kept in the scan history.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanEvent {
    /// ID of the scanned student.
    pub identity_id: user::Id,

    /// Name of the scanned student.
    pub identity_name: String,

    /// [`Status`] assigned by the backend.
    pub status: Status,

    /// Local time the scan has been accepted at.
    pub scanned_at: ScannedAt,

    /// Backend-formatted scan time, if any.
    pub scan_time: Option<String>,
}

impl ScanEvent {
    /// Creates a new [`ScanEvent`] out of the provided [`Scan`] and its
    /// [`Receipt`].
    #[must_use]
    pub fn new(scan: Scan, receipt: Receipt, scanned_at: ScannedAt) -> Self {
        Self {
            identity_id: scan.student_id,
            identity_name: receipt.student_name,
            status: receipt.status,
            scanned_at,
            scan_time: receipt.scan_time,
        }
    }
}

/// Result of a single attendance submission.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// Scan accepted.
    Success(ScanEvent),

    /// Scan rejected or failed to be delivered.
    Failure {
        /// Message to show, as reported by the backend.
        message: String,
    },
}

impl Outcome {
    /// Indicates whether this [`Outcome`] is a [`Outcome::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}
