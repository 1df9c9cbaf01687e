//! Attendance report aggregation.

use std::collections::BTreeMap;

use common::{DateTime, Percent};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::domain::{attendance::Status, lenient};

pub use crate::read::attendance::Record;

/// Attendance counts by [`Status`].
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct Summary {
    /// Number of [`Status::Present`] records.
    #[serde(default, deserialize_with = "lenient::count")]
    pub present: u64,

    /// Number of [`Status::Late`] records.
    #[serde(default, deserialize_with = "lenient::count")]
    pub late: u64,

    /// Number of [`Status::Absent`] records.
    #[serde(default, deserialize_with = "lenient::count")]
    pub absent: u64,
}

impl Summary {
    /// Returns the total number of counted records.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.present.saturating_add(self.late).saturating_add(self.absent)
    }

    /// Returns the share of attended (present or late) records.
    ///
    /// [`Percent::ZERO`] if nothing has been counted.
    #[must_use]
    pub fn percentage(&self) -> Percent {
        Percent::ratio(self.present.saturating_add(self.late), self.total())
    }

    /// Counts the provided [`Status`] in.
    pub fn count(&mut self, status: Status) {
        match status {
            Status::Present => self.present += 1,
            Status::Late => self.late += 1,
            Status::Absent => self.absent += 1,
        }
    }
}

impl FromIterator<Status> for Summary {
    fn from_iter<I: IntoIterator<Item = Status>>(iter: I) -> Self {
        let mut summary = Self::default();
        for status in iter {
            summary.count(status);
        }
        summary
    }
}

/// Calendar month a [`Monthly`] report is requested for.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Month {
    /// Year of the month.
    year: i32,

    /// Number of the month (`1..=12`).
    month: u8,
}

impl Month {
    /// Creates a new [`Month`] if the provided `month` is in `1..=12`.
    #[must_use]
    pub const fn new(year: i32, month: u8) -> Option<Self> {
        if month >= 1 && month <= 12 {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// Returns the current [`Month`] (in UTC).
    #[must_use]
    pub fn current() -> Self {
        let (year, month) = DateTime::now().year_month();
        Self { year, month }
    }

    /// Returns the year of this [`Month`].
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Returns the number (`1..=12`) of this [`Month`].
    #[must_use]
    pub const fn number(self) -> u8 {
        self.month
    }

    /// Returns the short English name of this [`Month`].
    #[must_use]
    pub const fn short_name(self) -> &'static str {
        const NAMES: [&str; 12] = [
            "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep",
            "Oct", "Nov", "Dec",
        ];
        NAMES[(self.month - 1) as usize]
    }
}

/// Single attendance entry of a day in a [`Monthly`] report.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
pub struct Entry {
    /// Attendance [`Status`] of the entry.
    pub status: Status,
}

/// Per-day attendance counts of a [`Monthly`] report.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DayCounts {
    /// Day of the month (`1..=31`).
    pub day: u8,

    /// Counts of the day.
    pub summary: Summary,
}

/// Monthly attendance report payload.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Monthly {
    /// [`Summary`] of the whole month.
    #[serde(default)]
    pub summary: Summary,

    /// [`Entry`]s keyed by the day of the month.
    #[serde(default, deserialize_with = "daily")]
    pub daily: BTreeMap<u8, Vec<Entry>>,

    /// Detailed [`Record`]s of the month.
    #[serde(default)]
    pub records: Vec<Record>,
}

impl Monthly {
    /// Returns the per-day counts for days `1..=31`, omitting days without
    /// any entry.
    #[must_use]
    pub fn daily_counts(&self) -> Vec<DayCounts> {
        (1..=31)
            .filter_map(|day| {
                let summary = self
                    .daily
                    .get(&day)?
                    .iter()
                    .map(|e| e.status)
                    .collect::<Summary>();
                (summary.total() > 0).then_some(DayCounts { day, summary })
            })
            .collect()
    }
}

/// Keeps the [`Record`]s whose class name or subject contains the provided
/// `text`, ignoring case.
///
/// Empty (or blank) `text` keeps all the [`Record`]s.
#[must_use]
pub fn filter<'r>(records: &'r [Record], text: &str) -> Vec<&'r Record> {
    let needle = text.trim().to_lowercase();
    records
        .iter()
        .filter(|r| needle.is_empty() || r.mentions(&needle))
        .collect()
}

/// Deserializes [`Monthly::daily`] either from an object keyed by days, or
/// from an (empty) array, which the backend sends when there is nothing to
/// report.
fn daily<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<BTreeMap<u8, Vec<Entry>>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Days(BTreeMap<String, Vec<Entry>>),
        List(Vec<Vec<Entry>>),
    }

    match Option::<Raw>::deserialize(d)? {
        None => Ok(BTreeMap::new()),
        Some(Raw::Days(days)) => days
            .into_iter()
            .map(|(day, entries)| {
                day.trim()
                    .parse::<u8>()
                    .map(|day| (day, entries))
                    .map_err(|_| de::Error::custom("invalid day of month"))
            })
            .collect(),
        Some(Raw::List(list)) => Ok(list
            .into_iter()
            .enumerate()
            .filter_map(|(i, entries)| Some((u8::try_from(i).ok()?, entries)))
            .collect()),
    }
}

#[cfg(test)]
mod spec {
    use super::{filter, Month, Monthly, Record, Summary};
    use crate::domain::attendance::Status;

    fn record(class_name: &str, subject: Option<&str>) -> Record {
        Record {
            class_name: class_name.into(),
            subject: subject.map(Into::into),
            class_date: None,
            scan_time: None,
            status: Status::Present,
            day: None,
        }
    }

    #[test]
    fn percentage_counts_late_as_attended() {
        let s = Summary {
            present: 6,
            late: 1,
            absent: 3,
        };

        assert_eq!(s.total(), 10);
        assert_eq!(s.percentage().get(), 70);
        assert_eq!(Summary::default().percentage().get(), 0);
    }

    #[test]
    fn percentage_rounds_attended_share() {
        let s = Summary {
            present: 5,
            late: 2,
            absent: 3,
        };

        assert_eq!(s.percentage().get(), 70);
    }

    #[test]
    fn huge_counts_saturate() {
        let s: Summary = serde_json::from_str(
            r#"{"present": 18446744073709551615, "late": 1, "absent": 2}"#,
        )
        .unwrap();

        assert_eq!(s.total(), u64::MAX);
        assert_eq!(s.percentage().get(), 100);
    }

    #[test]
    fn daily_counts_skip_empty_days() {
        let m: Monthly = serde_json::from_str(
            r#"{
                "summary": {"present": 2, "late": 1, "absent": 1},
                "daily": {
                    "3": [{"status": "present"}, {"status": "late"}],
                    "10": [],
                    "14": [{"status": "absent"}, {"status": "present"}],
                    "40": [{"status": "present"}]
                },
                "records": []
            }"#,
        )
        .unwrap();

        let counts = m.daily_counts();

        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].day, 3);
        assert_eq!(counts[0].summary.present, 1);
        assert_eq!(counts[0].summary.late, 1);
        assert_eq!(counts[1].day, 14);
        assert_eq!(counts[1].summary.absent, 1);
    }

    #[test]
    fn empty_daily_array_is_accepted() {
        let m: Monthly = serde_json::from_str(
            r#"{"summary": {"present": 0, "late": 0, "absent": 0},
                "daily": [], "records": []}"#,
        )
        .unwrap();

        assert!(m.daily_counts().is_empty());
        assert_eq!(m.summary.percentage().get(), 0);
    }

    #[test]
    fn filters_by_class_or_subject() {
        let records = [
            record("Mathematics Grade 10", Some("Algebra")),
            record("Physics", Some("Applied Math")),
            record("History", None),
        ];

        let found = filter(&records, "math");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].class_name, "Mathematics Grade 10");
        assert_eq!(found[1].class_name, "Physics");

        assert_eq!(filter(&records, "MATH").len(), 2);
        assert_eq!(filter(&records, "").len(), 3);
        assert!(filter(&records, "chemistry").is_empty());
    }

    #[test]
    fn month_bounds() {
        assert!(Month::new(2025, 0).is_none());
        assert!(Month::new(2025, 13).is_none());
        assert_eq!(Month::new(2025, 3).unwrap().short_name(), "Mar");
        assert_eq!(
            serde_json::to_string(&Month::new(2025, 3).unwrap()).unwrap(),
            r#"{"year":2025,"month":3}"#,
        );
    }
}
