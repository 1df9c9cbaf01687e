//! [`Context`]-related definitions.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use service::{
    domain::Session,
    infra::{FileStorage, Http},
    navigation::{self, Decision, Target},
    session,
};
use tracing as log;

use crate::{config, define_error, AsError, Config, Error, Service};

/// Application context shared by the screens.
#[derive(Debug)]
pub struct Context {
    /// [`Service`] instance.
    service: Service,

    /// QR scanner configuration.
    scanner: config::Scanner,

    /// Indicator whether the backend has reported the session as expired.
    expired: Arc<AtomicBool>,

    /// Indicator whether a persisted session was restored on start.
    restored: bool,
}

impl Context {
    /// Creates a new [`Context`] out of the provided [`Config`], restoring
    /// the persisted session (if any).
    ///
    /// # Errors
    ///
    /// If the backend client cannot be created.
    pub fn new(conf: Config) -> Result<Self, Error> {
        let Config {
            backend,
            storage,
            scanner,
            log: _,
        } = conf;

        let store =
            session::Store::hydrate(FileStorage::new(storage.dir));
        let restored = store.current().is_some();
        let expired = Arc::new(AtomicBool::new(false));
        let http = Http::new(&backend.into(), store.clone())
            .map_err(AsError::into_error)?
            .on_unauthorized({
                let expired = Arc::clone(&expired);
                move || {
                    expired.store(true, Ordering::Relaxed);
                    log::warn!("session has expired, please sign in again");
                }
            });

        Ok(Self {
            service: Service::new(http, store),
            scanner,
            expired,
            restored,
        })
    }

    /// Returns [`Service`] instance of this [`Context`].
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Returns the QR scanner configuration.
    #[must_use]
    pub fn scanner(&self) -> &config::Scanner {
        &self.scanner
    }

    /// Returns the current [`Session`], if any.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.service.session().current()
    }

    /// Returns the current [`Session`].
    ///
    /// # Errors
    ///
    /// If nobody is signed in.
    pub fn require_session(&self) -> Result<Session, Error> {
        self.session()
            .ok_or_else(|| AuthError::AuthorizationRequired.into())
    }

    /// Indicates whether the backend has invalidated the session restored
    /// on start during this run.
    ///
    /// Rejections without a restored session (like wrong credentials on
    /// sign in) don't count as an expiry.
    #[must_use]
    pub fn session_expired(&self) -> bool {
        self.restored && self.expired.load(Ordering::Relaxed)
    }

    /// Enters the screen at the provided `path`, passing it through the
    /// navigation guard.
    ///
    /// # Errors
    ///
    /// If the guard redirects elsewhere.
    pub fn enter(&self, path: &str) -> Result<Session, Error> {
        let session = self.session();
        match navigation::navigate(path, session.as_ref()) {
            Decision::Render => {
                session.ok_or_else(|| AuthError::AuthorizationRequired.into())
            }
            Decision::Redirect(target) => {
                log::debug!("`{path}` redirects to `{target}`");
                Err(match target {
                    Target::Login => AuthError::AuthorizationRequired,
                    Target::ChangePassword => AuthError::PasswordChangeRequired,
                    Target::Home(_) => AuthError::Forbidden,
                }
                .into())
            }
        }
    }

    /// Enters the home screen of the signed-in user.
    ///
    /// # Errors
    ///
    /// If the guard redirects elsewhere.
    pub fn enter_home(&self) -> Result<Session, Error> {
        let home = self
            .session()
            .map_or_else(|| "/".to_owned(), |s| s.role().home_path());
        self.enter(&home)
    }
}

define_error! {
    enum AuthError {
        #[code = "AUTHORIZATION_REQUIRED"]
        #[message = "Please sign in first"]
        AuthorizationRequired,

        #[code = "PASSWORD_CHANGE_REQUIRED"]
        #[message = "Please change your password first"]
        PasswordChangeRequired,

        #[code = "FORBIDDEN"]
        #[message = "This screen is not available for your role"]
        Forbidden,
    }
}

#[cfg(test)]
mod spec {
    use std::{path::Path, sync::atomic::Ordering};

    use service::{
        domain::{
            user::{session::Token, Profile},
            Role, Session,
        },
        infra::FileStorage,
        session,
    };

    use crate::{config, Config};

    use super::Context;

    fn context(dir: &Path, session: Option<(Role, bool)>) -> Context {
        if let Some((role, must_change_password)) = session {
            let mut profile: Profile =
                serde_json::from_value(serde_json::json!({
                    "id": 9,
                    "name": "Dana Reyes",
                    "role": role.as_str(),
                }))
                .unwrap();
            profile.must_change_password = must_change_password;
            session::Store::hydrate(FileStorage::new(dir))
                .establish(Session {
                    profile,
                    token: Token::new("token").unwrap(),
                })
                .unwrap();
        }
        Context::new(Config {
            storage: config::Storage { dir: dir.into() },
            ..Config::default()
        })
        .unwrap()
    }

    #[test]
    fn guards_screens() {
        let dir = tempfile::tempdir().unwrap();
        let anonymous = context(dir.path(), None);
        assert_eq!(
            anonymous.enter("/scanner").unwrap_err().code,
            "AUTHORIZATION_REQUIRED",
        );

        let teacher = context(dir.path(), Some((Role::Teacher, false)));
        assert_eq!(teacher.enter("/scanner").unwrap().role(), Role::Teacher);
        assert_eq!(
            teacher.enter("/student/qr").unwrap_err().code,
            "FORBIDDEN",
        );
        assert_eq!(teacher.enter_home().unwrap().role(), Role::Teacher);
    }

    #[test]
    fn expiry_requires_restored_session() {
        let dir = tempfile::tempdir().unwrap();
        let anonymous = context(dir.path(), None);
        anonymous.expired.store(true, Ordering::Relaxed);
        assert!(!anonymous.session_expired());

        let teacher = context(dir.path(), Some((Role::Teacher, false)));
        assert!(!teacher.session_expired());
        teacher.expired.store(true, Ordering::Relaxed);
        assert!(teacher.session_expired());
    }

    #[test]
    fn forces_password_change() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path(), Some((Role::Student, true)));

        assert_eq!(
            ctx.enter_home().unwrap_err().code,
            "PASSWORD_CHANGE_REQUIRED",
        );
        assert!(ctx.enter("/change-password").is_ok());
    }
}
