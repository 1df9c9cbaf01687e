//! [`ClassSession`] definitions.

use std::{num::NonZeroU64, str::FromStr};

use common::define_kind;
use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

use super::attendance;

/// Scheduled teaching period.
///
/// Read-only on the client: the backend owns it and derives its
/// [`Status`] from the current time.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ClassSession {
    /// ID of this [`ClassSession`].
    pub id: Id,

    /// Name of this [`ClassSession`] (e.g. "Mathematics Grade 10").
    #[serde(rename = "class_name")]
    pub name: String,

    /// Subject taught.
    #[serde(default, deserialize_with = "super::lenient::text")]
    pub subject: Option<String>,

    /// Date of this [`ClassSession`] (`YYYY-MM-DD`).
    #[serde(rename = "class_date", default)]
    pub date: String,

    /// Start time (`HH:MM` or `HH:MM:SS`).
    #[serde(default)]
    pub start_time: String,

    /// End time (`HH:MM` or `HH:MM:SS`).
    #[serde(default)]
    pub end_time: String,

    /// Room the class takes place in.
    #[serde(default, deserialize_with = "super::lenient::text")]
    pub room: Option<String>,

    /// Name of the teacher running the class.
    #[serde(default, deserialize_with = "super::lenient::text")]
    pub teacher_name: Option<String>,

    /// Server-derived temporal [`Status`].
    #[serde(rename = "computed_status")]
    pub status: Status,

    /// Number of students marked present.
    #[serde(default, deserialize_with = "super::lenient::count")]
    pub present_count: u64,

    /// Number of students enrolled.
    #[serde(default, deserialize_with = "super::lenient::count")]
    pub total_students: u64,

    /// Attendance of the signed-in student (student dashboards only).
    #[serde(default)]
    pub my_attendance: Option<attendance::Status>,

    /// Attendance of the child (parent dashboards only).
    #[serde(default)]
    pub child_attendance: Option<attendance::Status>,
}

impl ClassSession {
    /// Indicates whether this [`ClassSession`] is [`Status::Ongoing`].
    #[must_use]
    pub fn is_ongoing(&self) -> bool {
        self.status == Status::Ongoing
    }

    /// Returns the `start-end` time span of this [`ClassSession`].
    #[must_use]
    pub fn time_span(&self) -> String {
        format!("{}-{}", self.start_time, self.end_time)
    }
}

define_kind! {
    #[doc = "Temporal status of a `ClassSession`, derived by the backend."]
    enum Status {
        #[doc = "Starts later."]
        Upcoming,

        #[doc = "Takes place right now, attendance may be scanned."]
        Ongoing,

        #[doc = "Already ended."]
        Completed,
    }
}

/// ID of a [`ClassSession`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[serde(transparent)]
pub struct Id(#[serde(deserialize_with = "super::lenient::id")] NonZeroU64);

impl Id {
    /// Creates a new [`Id`] if the provided value is positive.
    #[must_use]
    pub const fn new(id: u64) -> Option<Self> {
        match NonZeroU64::new(id) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }

    /// Returns the numeric value of this [`Id`].
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl FromStr for Id {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .ok()
            .and_then(Self::new)
            .ok_or("invalid class `Id`")
    }
}

/// Form of a new [`ClassSession`], submitted by an admin or a teacher.
#[derive(Clone, Debug, Serialize)]
pub struct New {
    /// Name of the class.
    pub class_name: String,

    /// Subject taught.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Date of the class (`YYYY-MM-DD`).
    pub class_date: String,

    /// Start time (`HH:MM`).
    pub start_time: String,

    /// End time (`HH:MM`).
    pub end_time: String,

    /// Room the class takes place in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
}
