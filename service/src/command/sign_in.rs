//! [`Command`] for signing in.

use common::operations::Perform;
use derive_more::{Display, Error, From};
use secrecy::SecretBox;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        user::{Email, Password},
        Session,
    },
    infra::{
        backend::{self, Authenticated, Login},
        Backend,
    },
    session, Service,
};

use super::Command;

/// [`Command`] for signing in with credentials.
#[derive(Debug)]
pub struct SignIn {
    /// [`Email`] of the user.
    pub email: Email,

    /// [`Password`] of the user.
    pub password: SecretBox<Password>,
}

impl<Be> Command<SignIn> for Service<Be>
where
    Be: Backend<
        Perform<Login>,
        Ok = Authenticated,
        Err = Traced<backend::Error>,
    >,
{
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: SignIn) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SignIn { email, password } = cmd;

        let session = Session::from(
            self.backend()
                .execute(Perform(Login { email, password }))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?,
        );

        self.session()
            .establish(session.clone())
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        log::info!(
            "signed in as user {} ({})",
            session.identity_id(),
            session.role(),
        );

        Ok(session)
    }
}

/// Error of [`SignIn`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Backend`] error, including rejected credentials.
    #[display("{_0}")]
    Backend(backend::Error),

    /// [`session::Store`] error.
    #[display("Failed to persist session: {_0}")]
    Session(session::Error),
}

#[cfg(test)]
mod spec {
    use common::operations::Perform;
    use secrecy::SecretBox;
    use tracerr::Traced;

    use crate::{
        domain::user::{session::Token, Email, Password, Profile},
        infra::{
            backend::{self, Authenticated, Login},
            Backend, MemoryStorage,
        },
        session, Service,
    };

    use super::{ExecutionError, SignIn};

    /// Backend accepting the only known password.
    #[derive(Debug)]
    struct Accounts;

    impl Backend<Perform<Login>> for Accounts {
        type Ok = Authenticated;
        type Err = Traced<backend::Error>;

        async fn execute(
            &self,
            Perform(login): Perform<Login>,
        ) -> Result<Self::Ok, Self::Err> {
            use secrecy::ExposeSecret as _;

            if login.password.expose_secret().expose() != "correct horse" {
                return Err(tracerr::new!(backend::Error::Unauthorized {
                    message: "Invalid credentials".into(),
                }));
            }
            let user: Profile = serde_json::from_value(serde_json::json!({
                "id": 4,
                "name": "Ana Lim",
                "email": login.email,
                "role": "teacher",
            }))
            .map_err(|e| tracerr::new!(backend::Error::Decode(e)))?;
            Ok(Authenticated {
                token: Token::new("issued").unwrap(),
                user,
            })
        }
    }

    fn sign_in(password: &str) -> SignIn {
        SignIn {
            email: Email::new("ana@school.edu").unwrap(),
            password: SecretBox::new(Box::new(
                Password::new(password).unwrap(),
            )),
        }
    }

    #[tokio::test]
    async fn persists_established_session() {
        let service = Service::new(
            Accounts,
            session::Store::hydrate(MemoryStorage::new()),
        );

        let session = service.execute(sign_in("correct horse")).await.unwrap();

        assert_eq!(session.token.as_ref(), "issued");
        assert_eq!(service.session().current(), Some(session));
        assert_eq!(
            service.session().token().map(|t| t.as_ref().to_owned()),
            Some("issued".to_owned()),
        );
    }

    #[tokio::test]
    async fn rejected_credentials_leave_no_session() {
        let service = Service::new(
            Accounts,
            session::Store::hydrate(MemoryStorage::new()),
        );

        let err = service.execute(sign_in("wrong")).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Backend(e) if e.is_unauthorized(),
        ));
        assert_eq!(service.session().current(), None);
    }
}
