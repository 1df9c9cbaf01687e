//! Navigation guard deciding whether a screen may be rendered.

use derive_more::Display;

use crate::domain::{Role, Session};

use super::route::{self, Access, Route};

/// Screen a [`Decision::Redirect`] leads to.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Target {
    /// Sign-in screen.
    #[display("/login")]
    Login,

    /// Forced password change screen.
    #[display("/change-password")]
    ChangePassword,

    /// Home of the [`Role`].
    #[display("/{_0}")]
    Home(Role),
}

impl Target {
    /// Returns the path of this [`Target`].
    #[must_use]
    pub fn path(self) -> String {
        self.to_string()
    }
}

/// Outcome of the navigation guard.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Decision {
    /// Requested screen may be rendered.
    Render,

    /// Navigation must be redirected to the [`Target`].
    Redirect(Target),
}

/// Decides whether the screen at `path` may be rendered for the provided
/// `session`, restricted to the `allowed` [`Role`]s (if any).
///
/// Rules apply in order:
/// 1. without a session, redirect to [`Target::Login`];
/// 2. if the password must be changed, redirect to
///    [`Target::ChangePassword`] from anywhere except that screen;
/// 3. if the [`Role`] is not `allowed`, redirect to its [`Target::Home`];
/// 4. otherwise, render.
#[must_use]
pub fn decide(
    path: &str,
    session: Option<&Session>,
    allowed: Option<&[Role]>,
) -> Decision {
    let Some(session) = session else {
        return Decision::Redirect(Target::Login);
    };
    if session.must_change_password()
        && route::normalize(path) != Route::CHANGE_PASSWORD.path
    {
        return Decision::Redirect(Target::ChangePassword);
    }
    if allowed.is_some_and(|roles| !roles.contains(&session.role())) {
        return Decision::Redirect(Target::Home(session.role()));
    }
    Decision::Render
}

/// Decides whether the screen at `path` may be rendered for the provided
/// `session`, taking the requirements from the [`Route`] table.
///
/// [`Route::ROOT`] (and any unknown path) never renders on its own: it
/// redirects to the home of the signed-in [`Role`].
#[must_use]
pub fn navigate(path: &str, session: Option<&Session>) -> Decision {
    let route = Route::resolve(path);
    if route.access == Access::Public {
        return Decision::Render;
    }
    match decide(route.path, session, route.allowed_roles()) {
        Decision::Render if *route == Route::ROOT => session.map_or(
            Decision::Redirect(Target::Login),
            |s| Decision::Redirect(Target::Home(s.role())),
        ),
        decision @ (Decision::Render | Decision::Redirect(_)) => decision,
    }
}
