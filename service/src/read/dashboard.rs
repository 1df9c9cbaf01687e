//! Dashboard read definitions.

use common::Percent;
use serde::Deserialize;

use crate::domain::{class::Status, lenient, user::StudentDetails, ClassSession};

/// Number of upcoming classes a dashboard lists.
pub const UPCOMING_LIMIT: usize = 3;

/// Role-specific dashboard payload.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Dashboard {
    /// Headline [`Stats`].
    #[serde(default)]
    pub stats: Stats,

    /// [`ClassSession`]s relevant to the signed-in user (teachers and
    /// students).
    #[serde(default)]
    pub classes: Vec<ClassSession>,

    /// [`ClassSession`]s of the last days (admins only).
    #[serde(default)]
    pub recent_classes: Vec<ClassSession>,

    /// Per-child cards (parents only).
    #[serde(default)]
    pub children: Vec<Child>,
}

impl Dashboard {
    /// Returns the [`Schedule`] of [`Dashboard::classes`].
    #[must_use]
    pub fn schedule(&self) -> Schedule<'_> {
        Schedule(&self.classes)
    }
}

/// Headline numbers of a [`Dashboard`].
///
/// Which ones are present depends on the role of the signed-in user.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
pub struct Stats {
    /// Classes attended on time.
    #[serde(default, deserialize_with = "lenient::count")]
    pub present: u64,

    /// Classes attended late.
    #[serde(default, deserialize_with = "lenient::count")]
    pub late: u64,

    /// Classes missed.
    #[serde(default, deserialize_with = "lenient::count")]
    pub absent: u64,

    /// Classes in total.
    #[serde(default, deserialize_with = "lenient::count")]
    pub total: u64,

    /// Attendance rate, as computed by the backend.
    #[serde(default)]
    pub percentage: Option<Percent>,

    /// Classes taught in total (teachers only).
    #[serde(
        default,
        rename = "totalClasses",
        deserialize_with = "lenient::count"
    )]
    pub total_classes: u64,

    /// Number of teachers (admins only).
    #[serde(default, deserialize_with = "lenient::count")]
    pub teachers: u64,

    /// Number of students (admins only).
    #[serde(default, deserialize_with = "lenient::count")]
    pub students: u64,

    /// Number of classes today (admins only).
    #[serde(default, deserialize_with = "lenient::count")]
    pub classes: u64,

    /// Students present today (admins only).
    #[serde(
        default,
        rename = "todayPresent",
        deserialize_with = "lenient::count"
    )]
    pub today_present: u64,

    /// Students absent today (admins only).
    #[serde(
        default,
        rename = "todayAbsent",
        deserialize_with = "lenient::count"
    )]
    pub today_absent: u64,
}

impl Stats {
    /// Returns the attendance rate, preferring the backend-computed one.
    #[must_use]
    pub fn attendance_rate(&self) -> Percent {
        self.percentage.unwrap_or_else(|| {
            Percent::ratio(self.present.saturating_add(self.late), self.total)
        })
    }
}

/// Card of a child on a parent [`Dashboard`].
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Child {
    /// [`ChildInfo`] of the child.
    pub info: ChildInfo,

    /// Attendance [`Stats`] of the child.
    #[serde(default)]
    pub stats: Stats,

    /// [`ClassSession`]s of the child.
    #[serde(default)]
    pub classes: Vec<ClassSession>,
}

impl Child {
    /// Returns the [`Schedule`] of the child.
    #[must_use]
    pub fn schedule(&self) -> Schedule<'_> {
        Schedule(&self.classes)
    }
}

/// Identity of a child on a parent [`Dashboard`].
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ChildInfo {
    /// Name of the child.
    pub name: String,

    /// [`StudentDetails`] of the child.
    #[serde(flatten)]
    pub details: StudentDetails,
}

/// View over a list of [`ClassSession`]s, in the order the backend sent them.
#[derive(Clone, Copy, Debug)]
pub struct Schedule<'c>(&'c [ClassSession]);

impl<'c> Schedule<'c> {
    /// Wraps the provided [`ClassSession`]s.
    #[must_use]
    pub const fn new(classes: &'c [ClassSession]) -> Self {
        Self(classes)
    }

    /// Returns the first [`ClassSession`] taking place right now.
    #[must_use]
    pub fn ongoing(self) -> Option<&'c ClassSession> {
        self.0.iter().find(|c| c.status == Status::Ongoing)
    }

    /// Returns all the [`ClassSession`]s taking place right now.
    pub fn all_ongoing(self) -> impl Iterator<Item = &'c ClassSession> {
        self.0.iter().filter(|c| c.status == Status::Ongoing)
    }

    /// Returns at most `n` upcoming [`ClassSession`]s.
    pub fn upcoming(
        self,
        n: usize,
    ) -> impl Iterator<Item = &'c ClassSession> {
        self.0
            .iter()
            .filter(|c| c.status == Status::Upcoming)
            .take(n)
    }

    /// Returns the first completed [`ClassSession`], which the backend
    /// orders as the most recent one.
    #[must_use]
    pub fn last_completed(self) -> Option<&'c ClassSession> {
        self.0.iter().find(|c| c.status == Status::Completed)
    }

    /// Returns the [`ClassSession`]s taking place on the provided date
    /// (`YYYY-MM-DD`).
    pub fn on(self, date: &'c str) -> impl Iterator<Item = &'c ClassSession> {
        self.0.iter().filter(move |c| c.date == date)
    }
}
