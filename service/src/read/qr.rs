//! [`QrCode`] read model definition.

use serde::Deserialize;

use crate::domain::user::{self, StudentDetails};

/// Attendance QR code of the signed-in student.
///
/// The encoded payload is nothing but the student ID, which is exactly what
/// the scanner expects to decode.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct QrCode {
    /// Payload to encode into the QR image.
    #[serde(rename = "qr_data")]
    pub payload: user::Id,

    /// [`StudentDetails`] of the student.
    #[serde(default)]
    pub student: StudentDetails,
}

#[cfg(test)]
mod spec {
    use super::QrCode;

    #[test]
    fn payload_is_student_id() {
        let qr: QrCode = serde_json::from_str(
            r#"{"qr_data": "42",
                "student": {"roll_number": "7", "grade": "9",
                            "section": "A"}}"#,
        )
        .unwrap();

        assert_eq!(qr.payload.to_string(), "42");
        assert_eq!(qr.student.section.as_deref(), Some("A"));
    }
}
