//! [`User`] definitions.
//!
//! [`User`]: Profile

pub mod session;

use std::{num::NonZeroU64, str::FromStr, sync::LazyLock};

use common::define_kind;
use derive_more::{AsRef, Display, Error, From, Into};
use regex::Regex;
use secrecy::{zeroize::Zeroize, CloneableSecret, ExposeSecret as _};
use serde::{Deserialize, Serialize, Serializer};

pub use self::session::Session;

define_kind! {
    #[doc = "Role of a platform user, determining the accessible screens."]
    enum Role {
        #[doc = "School administrator."]
        Admin,

        #[doc = "Teacher running classes and scanning attendance."]
        Teacher,

        #[doc = "Student attending classes."]
        Student,

        #[doc = "Parent watching their children attendance."]
        Parent,
    }
}

impl Role {
    /// Returns the home path of this [`Role`] (`/admin`, `/teacher`, ...).
    #[must_use]
    pub fn home_path(self) -> String {
        format!("/{self}")
    }
}

/// ID of a platform user (student, teacher, admin or parent).
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

    /// Parses an [`Id`] from its decimal representation, surrounding
    /// whitespace allowed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err("`Id` must be a decimal number");
        }
        s.parse::<u64>()
            .ok()
            .and_then(Self::new)
            .ok_or("`Id` must be a positive number")
    }
}

/// Display name of a user.
#[derive(AsRef, Clone, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[as_ref(str, String)]
#[serde(try_from = "String", into = "String")]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Returns the first word of this [`Name`], used for greetings.
    #[must_use]
    pub fn first(&self) -> &str {
        self.0.split_whitespace().next().unwrap_or(&self.0)
    }

    /// Returns up to two uppercase initials of this [`Name`].
    #[must_use]
    pub fn initials(&self) -> String {
        self.0
            .split_whitespace()
            .filter_map(|w| w.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect()
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.trim()).ok_or("invalid `Name`")
    }
}

impl TryFrom<String> for Name {
    type Error = &'static str;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Name> for String {
    fn from(name: Name) -> Self {
        name.0
    }
}

/// Email address of a user, used as the login.
#[derive(AsRef, Clone, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[as_ref(str, String)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Email`].
    fn check(address: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Email`] format: a single `@`
        /// separating a non-empty local part from a dotted domain.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[^@\s]+@[^@\s.]+(\.[^@\s.]+)+$").expect("valid regex")
        });

        REGEX.is_match(address.as_ref())
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.trim()).ok_or("invalid `Email`")
    }
}

impl TryFrom<String> for Email {
    type Error = &'static str;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

/// Password of a user.
#[derive(Clone, Debug, Eq, From, PartialEq)]
#[from(&str, String)]
pub struct Password(String);

impl Password {
    /// Minimal length of a newly chosen [`Password`].
    pub const MIN_LENGTH: usize = 8;

    /// Maximal length of a [`Password`].
    pub const MAX_LENGTH: usize = 128;

    /// Creates a new [`Password`] if the given `password` is not empty and
    /// not longer than [`Password::MAX_LENGTH`].
    ///
    /// Existing passwords are not checked against [`Password::MIN_LENGTH`]:
    /// default passwords issued by an admin may be shorter.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Option<Self> {
        let password = password.into();
        (!password.is_empty() && password.len() <= Self::MAX_LENGTH)
            .then_some(Self(password))
    }

    /// Validates a newly chosen `password` against its `confirmation`.
    ///
    /// # Errors
    ///
    /// With a [`PasswordError`] describing the first violated constraint.
    pub fn new_confirmed(
        password: impl Into<String>,
        confirmation: impl AsRef<str>,
    ) -> Result<Self, PasswordError> {
        let password = password.into();
        if password != confirmation.as_ref() {
            return Err(PasswordError::Mismatch);
        }
        if password.chars().count() < Self::MIN_LENGTH {
            return Err(PasswordError::TooShort);
        }
        if password.len() > Self::MAX_LENGTH {
            return Err(PasswordError::TooLong);
        }
        Ok(Self(password))
    }

    /// Returns the plain text of this [`Password`].
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl FromStr for Password {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Password`")
    }
}

impl CloneableSecret for Password {}
impl Zeroize for Password {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// Serializes a secret [`Password`] as a plain string for a request body.
///
/// # Errors
///
/// Only propagates the `serializer` errors.
pub fn expose_password<S: Serializer>(
    password: &secrecy::SecretBox<Password>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(password.expose_secret().expose())
}

/// Violated constraint of a newly chosen [`Password`].
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
pub enum PasswordError {
    /// Password and its confirmation differ.
    #[display("Passwords do not match")]
    Mismatch,

    /// Password is shorter than [`Password::MIN_LENGTH`].
    #[display("Password must be at least 8 characters")]
    TooShort,

    /// Password is longer than [`Password::MAX_LENGTH`].
    #[display("Password must be at most 128 characters")]
    TooLong,
}

/// Profile of the signed-in user, as returned by the backend and persisted
/// between runs.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Profile {
    /// ID of the user.
    pub id: Id,

    /// [`Name`] of the user.
    pub name: Name,

    /// [`Email`] of the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,

    /// [`Role`] of the user.
    pub role: Role,

    /// Indicator whether the user must change the password before using any
    /// other screen.
    #[serde(default, deserialize_with = "super::lenient::flag")]
    pub must_change_password: bool,

    /// Fields of the backend user record the client doesn't interpret,
    /// preserved on re-persisting.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Profile {
    /// Merges the provided [`ProfileUpdate`] into this [`Profile`].
    pub fn apply(&mut self, update: ProfileUpdate) {
        let ProfileUpdate {
            name,
            email,
            must_change_password,
        } = update;
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(email) = email {
            self.email = Some(email);
        }
        if let Some(flag) = must_change_password {
            self.must_change_password = flag;
        }
    }
}

/// Partial update of a [`Profile`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProfileUpdate {
    /// New [`Name`], if changed.
    pub name: Option<Name>,

    /// New [`Email`], if changed.
    pub email: Option<Email>,

    /// New value of [`Profile::must_change_password`], if changed.
    pub must_change_password: Option<bool>,
}

impl ProfileUpdate {
    /// [`ProfileUpdate`] clearing the forced password change flag.
    #[must_use]
    pub fn password_changed() -> Self {
        Self {
            must_change_password: Some(false),
            ..Self::default()
        }
    }
}

/// Registration form of a new user, submitted by an admin.
#[derive(Clone, Debug, Serialize)]
pub struct Registration {
    /// [`Name`] of the new user.
    pub name: Name,

    /// [`Email`] of the new user.
    pub email: Email,

    /// Phone number of the new user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Date of birth (`YYYY-MM-DD`).
    pub dob: String,

    /// [`Role`] of the new user.
    pub role: Role,

    /// [`StudentDetails`] (students only).
    #[serde(flatten)]
    pub student: Option<StudentDetails>,
}

/// School placement of a student.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct StudentDetails {
    /// Grade of the student.
    #[serde(default, deserialize_with = "super::lenient::text")]
    pub grade: Option<String>,

    /// Section of the student.
    #[serde(default, deserialize_with = "super::lenient::text")]
    pub section: Option<String>,

    /// Roll number of the student.
    #[serde(default, deserialize_with = "super::lenient::text")]
    pub roll_number: Option<String>,
}

/// Default password generated by the backend for a newly registered user.
#[derive(Clone, Debug, Deserialize, Display)]
#[display("{password}")]
pub struct DefaultPassword {
    /// Plain text of the password.
    #[serde(rename = "default_password")]
    password: String,
}

impl DefaultPassword {
    /// Returns the plain text of this [`DefaultPassword`].
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.password
    }
}

/// Update of an existing student record, submitted by an admin.
#[derive(Clone, Debug, Serialize)]
pub struct StudentUpdate {
    /// ID of the student to update.
    pub id: Id,

    /// New [`Name`] of the student.
    pub name: Name,

    /// New [`Email`] of the student.
    pub email: Email,

    /// New phone number of the student.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// New [`StudentDetails`] of the student.
    #[serde(flatten)]
    pub details: StudentDetails,
}

/// Marker type of the student-specific user records.
#[derive(Clone, Copy, Debug)]
pub struct Student;

#[cfg(test)]
mod spec {
    use super::{Email, Id, Name, Password, PasswordError, Profile, Role};

    #[test]
    fn parses_positive_ids_only() {
        assert_eq!("42".parse::<Id>().unwrap().get(), 42);
        assert_eq!(" 7\n".parse::<Id>().unwrap().get(), 7);
        assert!("0".parse::<Id>().is_err());
        assert!("-3".parse::<Id>().is_err());
        assert!("+3".parse::<Id>().is_err());
        assert!("12abc".parse::<Id>().is_err());
        assert!("https://example.com".parse::<Id>().is_err());
        assert!("".parse::<Id>().is_err());
        assert!("99999999999999999999999".parse::<Id>().is_err());
    }

    #[test]
    fn role_wire_format() {
        assert_eq!(Role::Teacher.to_string(), "teacher");
        assert_eq!("Parent".parse::<Role>().unwrap(), Role::Parent);
        assert_eq!(Role::Admin.home_path(), "/admin");
        assert_eq!(
            serde_json::to_string(&Role::Student).unwrap(),
            "\"student\"",
        );
    }

    #[test]
    fn validates_new_passwords() {
        assert_eq!(
            Password::new_confirmed("secret123", "secret124"),
            Err(PasswordError::Mismatch),
        );
        assert_eq!(
            Password::new_confirmed("short", "short"),
            Err(PasswordError::TooShort),
        );
        assert!(Password::new_confirmed("long enough", "long enough").is_ok());
        assert!(Password::new("").is_none());
    }

    #[test]
    fn validates_names_and_emails() {
        assert!(Name::new(" padded").is_none());
        assert_eq!(Name::new("Asha Verma").unwrap().initials(), "AV");
        assert_eq!(Name::new("Asha Verma").unwrap().first(), "Asha");
        assert!(Email::new("teacher@school.edu").is_some());
        assert!(Email::new("teacher@school").is_none());
        assert!(Email::new("not an email").is_none());
    }

    #[test]
    fn profile_preserves_unknown_fields() {
        let json = r#"{
            "id": "5",
            "name": "Ravi Kumar",
            "email": "ravi@school.edu",
            "role": "teacher",
            "must_change_password": 1,
            "phone": "555-0100"
        }"#;
        let profile: Profile = serde_json::from_str(json).unwrap();

        assert_eq!(profile.id.get(), 5);
        assert!(profile.must_change_password);
        assert_eq!(profile.extra["phone"], "555-0100");

        let back = serde_json::to_value(&profile).unwrap();
        assert_eq!(back["phone"], "555-0100");
        assert_eq!(back["role"], "teacher");
        assert_eq!(back["must_change_password"], true);
    }
}
