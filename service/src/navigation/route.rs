//! Declarative [`Route`] table.

use crate::domain::Role;

/// Access requirement of a [`Route`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Access {
    /// Reachable without a session.
    Public,

    /// Reachable with any session.
    Session,

    /// Reachable with a session of one of the listed [`Role`]s only.
    Roles(&'static [Role]),
}

/// Client screen reachable by a path.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Route {
    /// Path of this [`Route`], without the trailing `/*` of nested ones.
    pub path: &'static str,

    /// Indicator whether nested paths (`/admin/teachers` for `/admin`)
    /// belong to this [`Route`].
    pub nested: bool,

    /// [`Access`] requirement of this [`Route`].
    pub access: Access,
}

impl Route {
    /// Sign-in screen.
    pub const LOGIN: Self = Self::exact("/login", Access::Public);

    /// Password recovery screen.
    pub const FORGOT_PASSWORD: Self =
        Self::exact("/forgot-password", Access::Public);

    /// Forced (or voluntary) password change screen.
    pub const CHANGE_PASSWORD: Self =
        Self::exact("/change-password", Access::Session);

    /// Root, redirecting to the home of the signed-in [`Role`].
    pub const ROOT: Self = Self::exact("/", Access::Session);

    /// Admin dashboard and management screens.
    pub const ADMIN: Self = Self::nested("/admin", &[Role::Admin]);

    /// Teacher dashboard and class screens.
    pub const TEACHER: Self = Self::nested("/teacher", &[Role::Teacher]);

    /// Student dashboard and QR code screens.
    pub const STUDENT: Self = Self::nested("/student", &[Role::Student]);

    /// Parent dashboard.
    pub const PARENT: Self = Self::nested("/parent", &[Role::Parent]);

    /// QR attendance scanner.
    pub const SCANNER: Self =
        Self::exact("/scanner", Access::Roles(&[Role::Teacher]));

    /// Attendance history of the signed-in user (or their children).
    pub const ATTENDANCE_HISTORY: Self =
        Self::exact("/attendance-history", Access::Session);

    /// Monthly attendance report.
    pub const MONTHLY_REPORT: Self =
        Self::exact("/monthly-report", Access::Session);

    /// All the known [`Route`]s.
    pub const ALL: &'static [Self] = &[
        Self::LOGIN,
        Self::FORGOT_PASSWORD,
        Self::CHANGE_PASSWORD,
        Self::ROOT,
        Self::ADMIN,
        Self::TEACHER,
        Self::STUDENT,
        Self::PARENT,
        Self::SCANNER,
        Self::ATTENDANCE_HISTORY,
        Self::MONTHLY_REPORT,
    ];

    const fn exact(path: &'static str, access: Access) -> Self {
        Self {
            path,
            nested: false,
            access,
        }
    }

    const fn nested(path: &'static str, roles: &'static [Role]) -> Self {
        Self {
            path,
            nested: true,
            access: Access::Roles(roles),
        }
    }

    /// Resolves the [`Route`] the provided `path` belongs to.
    ///
    /// Query strings, fragments and trailing slashes are ignored. Unknown
    /// paths resolve as [`Route::ROOT`].
    #[must_use]
    pub fn resolve(path: &str) -> &'static Self {
        let path = normalize(path);
        Self::ALL
            .iter()
            .find(|r| r.matches(path))
            .unwrap_or(&Self::ROOT)
    }

    /// Indicates whether the provided normalized `path` belongs to this
    /// [`Route`].
    fn matches(&self, path: &str) -> bool {
        path == self.path
            || (self.nested
                && path
                    .strip_prefix(self.path)
                    .is_some_and(|rest| rest.starts_with('/')))
    }

    /// Returns the [`Role`]s allowed to render this [`Route`], if restricted.
    #[must_use]
    pub const fn allowed_roles(&self) -> Option<&'static [Role]> {
        match self.access {
            Access::Roles(roles) => Some(roles),
            Access::Public | Access::Session => None,
        }
    }
}

/// Strips query string, fragment and trailing slashes off the `path`.
pub(crate) fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or_default().trim();
    match path.trim_end_matches('/') {
        "" => "/",
        p => p,
    }
}
