//! Attendance history read definitions.

use serde::{Deserialize, Serialize};

use crate::{
    domain::{attendance::Status, lenient},
    read::report::Summary,
};

/// Attendance record of a single student in a single class.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Record {
    /// Name of the class.
    #[serde(default)]
    pub class_name: String,

    /// Subject of the class.
    #[serde(default, deserialize_with = "lenient::text")]
    pub subject: Option<String>,

    /// Date of the class (`YYYY-MM-DD`).
    #[serde(
        default,
        alias = "date",
        deserialize_with = "lenient::text"
    )]
    pub class_date: Option<String>,

    /// Backend-formatted scan time, if scanned at all.
    #[serde(default, deserialize_with = "lenient::text")]
    pub scan_time: Option<String>,

    /// Attendance [`Status`].
    pub status: Status,

    /// Day of the month (monthly reports only).
    #[serde(default, deserialize_with = "lenient::text")]
    pub day: Option<String>,
}

impl Record {
    /// Indicates whether the class name or the subject of this [`Record`]
    /// contains the provided `needle`, ignoring case.
    ///
    /// The `needle` is expected to be lowercase already.
    pub(crate) fn mentions(&self, needle: &str) -> bool {
        self.class_name.to_lowercase().contains(needle)
            || self
                .subject
                .as_deref()
                .is_some_and(|s| s.to_lowercase().contains(needle))
    }
}

/// Query parameters of the attendance history.
///
/// All empty by default, which makes the backend return the history of the
/// signed-in user (or of the children, for parents).
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Params {
    /// ID of the class to narrow the history to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<crate::domain::class::Id>,

    /// ID of the student to narrow the history to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<crate::domain::user::Id>,
}

/// Attendance history of a child, as returned to parents.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ChildHistory {
    /// [`Record`]s of the child.
    #[serde(default)]
    pub records: Vec<Record>,

    /// [`Summary`] of the child's attendance.
    #[serde(flatten)]
    pub summary: Summary,
}

/// Attendance history payload.
///
/// Individual roles receive their own `records` and `summary`, while parents
/// receive one [`ChildHistory`] per linked child.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct History {
    /// Own [`Record`]s.
    #[serde(default)]
    records: Option<Vec<Record>>,

    /// Own [`Summary`].
    #[serde(default)]
    summary: Option<Summary>,

    /// Histories of the linked children (parents only).
    #[serde(default)]
    children: Vec<ChildHistory>,
}

impl History {
    /// Returns the [`Record`]s to show: own ones, or the ones of the first
    /// child.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        self.records
            .as_deref()
            .or_else(|| self.children.first().map(|c| c.records.as_slice()))
            .unwrap_or_default()
    }

    /// Returns the [`Summary`] to show: own one, or the one of the first
    /// child.
    #[must_use]
    pub fn summary(&self) -> Summary {
        self.summary
            .or_else(|| self.children.first().map(|c| c.summary))
            .unwrap_or_default()
    }

    /// Returns the [`ChildHistory`]s of the linked children.
    #[must_use]
    pub fn children(&self) -> &[ChildHistory] {
        &self.children
    }
}

#[cfg(test)]
mod spec {
    use super::History;
    use crate::domain::attendance::Status;

    #[test]
    fn reads_own_history() {
        let h: History = serde_json::from_str(
            r#"{
                "records": [
                    {"class_name": "Physics", "subject": "Science",
                     "class_date": "2025-03-01", "scan_time": null,
                     "status": "absent"}
                ],
                "summary": {"present": 3, "late": "1", "absent": 1}
            }"#,
        )
        .unwrap();

        assert_eq!(h.records().len(), 1);
        assert_eq!(h.records()[0].status, Status::Absent);
        assert_eq!(h.records()[0].scan_time, None);
        assert_eq!(h.summary().total(), 5);
        assert_eq!(h.summary().percentage().get(), 80);
    }

    #[test]
    fn falls_back_to_first_child() {
        let h: History = serde_json::from_str(
            r#"{
                "children": [
                    {"name": "Ana", "present": 1, "late": 0, "absent": 1,
                     "records": [
                        {"class_name": "Art", "date": "2025-03-02",
                         "status": "present"}
                     ]},
                    {"name": "Ben", "present": 0, "late": 0, "absent": 2,
                     "records": []}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(h.children().len(), 2);
        assert_eq!(h.records().len(), 1);
        assert_eq!(h.records()[0].class_date.as_deref(), Some("2025-03-02"));
        assert_eq!(h.summary().percentage().get(), 50);
    }

    #[test]
    fn empty_payload_is_empty_history() {
        let h: History = serde_json::from_str("{}").unwrap();

        assert!(h.records().is_empty());
        assert_eq!(h.summary().total(), 0);
        assert_eq!(h.summary().percentage().get(), 0);
    }
}
