//! HTTP [`Backend`] implementation.

use std::{fmt, sync::Arc, time::Duration};

use common::operations::{By, Delete, Insert, Perform, Select, Update};
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::{de::DeserializeOwned, Deserialize};
use smart_default::SmartDefault;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        attendance,
        class::{self, ClassSession},
        user::{self, DefaultPassword, Registration, StudentUpdate},
        Role,
    },
    infra::backend::{
        self, Authenticated, Backend, ChangePassword, Login,
        RequestResetCode, ResetCode, ResetPassword, VerifyResetCode,
    },
    read::{self, report::Month, Account, Dashboard, History, Monthly, QrCode},
    session,
};

/// Callback invoked whenever the backend reports an invalid session.
pub type OnUnauthorized = Arc<dyn Fn() + Send + Sync>;

/// [`Http`] client configuration.
#[derive(Clone, Debug, SmartDefault)]
pub struct Config {
    /// Base URL of the backend.
    #[default("https://school-erp.kesug.com/backend".into())]
    pub url: String,

    /// Timeout of a single request.
    #[default(Duration::from_secs(30))]
    pub timeout: Duration,
}

/// [`Backend`] talking JSON over HTTP.
#[derive(Clone)]
pub struct Http {
    /// Underlying HTTP client.
    client: reqwest::Client,

    /// Base URL the endpoint paths are resolved against.
    base: Url,

    /// [`session::Store`] providing the access token, and cleared on `401`.
    session: session::Store,

    /// Additional [`OnUnauthorized`] callback.
    on_unauthorized: OnUnauthorized,
}

impl fmt::Debug for Http {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Http")
            .field("base", &self.base.as_str())
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl Http {
    /// Creates a new [`Http`] client with the provided [`Config`], reading
    /// the access token from the provided [`session::Store`].
    ///
    /// # Errors
    ///
    /// If the [`Config::url`] is invalid, or the HTTP client cannot be built.
    pub fn new(
        conf: &Config,
        session: session::Store,
    ) -> Result<Self, Traced<backend::Error>> {
        let base = Url::parse(&format!("{}/", conf.url.trim_end_matches('/')))
            .map_err(|e| {
                tracerr::new!(backend::Error::InvalidUrl {
                    url: conf.url.clone(),
                    reason: e.to_string(),
                })
            })?;
        let client = reqwest::Client::builder()
            .timeout(conf.timeout)
            .build()
            .map_err(tracerr::from_and_wrap!(=> backend::Error))?;
        Ok(Self {
            client,
            base,
            session,
            on_unauthorized: Arc::new(|| {}),
        })
    }

    /// Sets the [`OnUnauthorized`] callback, invoked after the
    /// [`session::Store`] has been cleared.
    #[must_use]
    pub fn on_unauthorized(
        mut self,
        f: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        self.on_unauthorized = Arc::new(f);
        self
    }

    /// Returns the base URL of this [`Http`] client.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Starts a request to the provided endpoint `path`, authorized with the
    /// current session token, if any.
    fn request(
        &self,
        method: Method,
        path: &str,
    ) -> Result<RequestBuilder, Traced<backend::Error>> {
        let url = self.base.join(path).map_err(|e| {
            tracerr::new!(backend::Error::InvalidUrl {
                url: format!("{}{path}", self.base),
                reason: e.to_string(),
            })
        })?;
        let req = self.client.request(method, url);
        Ok(match self.session.token() {
            Some(token) => req.bearer_auth(token.as_ref()),
            None => req,
        })
    }

    /// Sends the provided request, returning the raw body of a successful
    /// response.
    async fn send(
        &self,
        req: RequestBuilder,
    ) -> Result<Vec<u8>, Traced<backend::Error>> {
        let resp = req
            .send()
            .await
            .map_err(tracerr::from_and_wrap!(=> backend::Error))?;
        let status = resp.status();
        let path = resp.url().path().to_owned();
        let body = resp
            .bytes()
            .await
            .map_err(tracerr::from_and_wrap!(=> backend::Error))?;

        if status == StatusCode::UNAUTHORIZED {
            log::warn!("`{path}` responded `401`, invalidating session");
            self.invalidate();
            return Err(tracerr::new!(backend::Error::Unauthorized {
                message: message_of(&body)
                    .unwrap_or_else(|| "Session expired".into()),
            }));
        }
        if !status.is_success() {
            log::debug!("`{path}` responded `{status}`");
            return Err(tracerr::new!(backend::Error::Rejected {
                status: status.as_u16(),
                message: message_of(&body).unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("Request failed")
                        .into()
                }),
            }));
        }
        Ok(body.to_vec())
    }

    /// Sends the provided request, decoding the body of a successful
    /// response.
    async fn fetch<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
    ) -> Result<T, Traced<backend::Error>> {
        let body = self.send(req).await.map_err(tracerr::wrap!())?;
        serde_json::from_slice(&body)
            .map_err(tracerr::from_and_wrap!(=> backend::Error))
    }

    /// Sends the provided request, decoding the `data` field of a successful
    /// response.
    async fn fetch_data<T: DeserializeOwned + Default>(
        &self,
        req: RequestBuilder,
    ) -> Result<T, Traced<backend::Error>> {
        self.fetch::<Envelope<T>>(req)
            .await
            .map(|e| e.data.unwrap_or_default())
            .map_err(tracerr::wrap!())
    }

    /// Invalidates the current session.
    fn invalidate(&self) {
        if let Err(e) = self.session.clear() {
            log::error!("cannot clear invalidated session: {e}");
        }
        (self.on_unauthorized)();
    }
}

/// Response wrapping its payload into a `data` field.
#[derive(Deserialize)]
struct Envelope<T> {
    /// Wrapped payload.
    #[serde(default)]
    data: Option<T>,
}

/// Extracts the `message` of an error response body, if any.
fn message_of(body: &[u8]) -> Option<String> {
    #[derive(Deserialize)]
    struct Failure {
        message: Option<String>,
    }

    serde_json::from_slice::<Failure>(body)
        .ok()?
        .message
        .filter(|m| !m.trim().is_empty())
}

impl Backend<Perform<Login>> for Http {
    type Ok = Authenticated;
    type Err = Traced<backend::Error>;

    async fn execute(
        &self,
        Perform(login): Perform<Login>,
    ) -> Result<Self::Ok, Self::Err> {
        let req = self.request(Method::POST, "api/login.php")?.json(&login);
        self.fetch(req).await.map_err(tracerr::wrap!())
    }
}

impl Backend<Perform<RequestResetCode>> for Http {
    type Ok = ResetCode;
    type Err = Traced<backend::Error>;

    async fn execute(
        &self,
        Perform(req): Perform<RequestResetCode>,
    ) -> Result<Self::Ok, Self::Err> {
        let req =
            self.request(Method::POST, "api/forgotPassword.php")?.json(&req);
        self.fetch(req).await.map_err(tracerr::wrap!())
    }
}

impl Backend<Perform<VerifyResetCode>> for Http {
    type Ok = ();
    type Err = Traced<backend::Error>;

    async fn execute(
        &self,
        Perform(req): Perform<VerifyResetCode>,
    ) -> Result<Self::Ok, Self::Err> {
        let req = self.request(Method::POST, "api/verifyOTP.php")?.json(&req);
        self.send(req).await.map(drop).map_err(tracerr::wrap!())
    }
}

impl Backend<Perform<ResetPassword>> for Http {
    type Ok = ();
    type Err = Traced<backend::Error>;

    async fn execute(
        &self,
        Perform(req): Perform<ResetPassword>,
    ) -> Result<Self::Ok, Self::Err> {
        let req =
            self.request(Method::POST, "api/resetPassword.php")?.json(&req);
        self.send(req).await.map(drop).map_err(tracerr::wrap!())
    }
}

impl Backend<Perform<ChangePassword>> for Http {
    type Ok = ();
    type Err = Traced<backend::Error>;

    async fn execute(
        &self,
        Perform(req): Perform<ChangePassword>,
    ) -> Result<Self::Ok, Self::Err> {
        let req =
            self.request(Method::POST, "api/changePassword.php")?.json(&req);
        self.send(req).await.map(drop).map_err(tracerr::wrap!())
    }
}

impl Backend<Select<By<Dashboard, ()>>> for Http {
    type Ok = Dashboard;
    type Err = Traced<backend::Error>;

    async fn execute(
        &self,
        _: Select<By<Dashboard, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let req = self.request(Method::GET, "api/getDashboardData.php")?;
        self.fetch_data(req).await.map_err(tracerr::wrap!())
    }
}

impl Backend<Select<By<History, read::attendance::Params>>> for Http {
    type Ok = History;
    type Err = Traced<backend::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<History, read::attendance::Params>>,
    ) -> Result<Self::Ok, Self::Err> {
        let req = self
            .request(Method::GET, "api/getAttendance.php")?
            .query(by.as_inner());
        self.fetch(req).await.map_err(tracerr::wrap!())
    }
}

impl Backend<Select<By<Monthly, Month>>> for Http {
    type Ok = Monthly;
    type Err = Traced<backend::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Monthly, Month>>,
    ) -> Result<Self::Ok, Self::Err> {
        let req = self
            .request(Method::GET, "api/getMonthlyReport.php")?
            .query(by.as_inner());
        self.fetch_data(req).await.map_err(tracerr::wrap!())
    }
}

impl Backend<Insert<Registration>> for Http {
    type Ok = DefaultPassword;
    type Err = Traced<backend::Error>;

    async fn execute(
        &self,
        Insert(form): Insert<Registration>,
    ) -> Result<Self::Ok, Self::Err> {
        let req =
            self.request(Method::POST, "api/registerUser.php")?.json(&form);
        self.fetch(req).await.map_err(tracerr::wrap!())
    }
}

impl Backend<Select<By<Vec<Account>, Role>>> for Http {
    type Ok = Vec<Account>;
    type Err = Traced<backend::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Account>, Role>>,
    ) -> Result<Self::Ok, Self::Err> {
        let req = self
            .request(Method::GET, "api/getUsers.php")?
            .query(&[("role", by.into_inner().as_str())]);
        self.fetch_data(req).await.map_err(tracerr::wrap!())
    }
}

impl Backend<Delete<By<Account, user::Id>>> for Http {
    type Ok = ();
    type Err = Traced<backend::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Account, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let req = self
            .request(Method::DELETE, "api/getUsers.php")?
            .query(&[("id", by.into_inner().get())]);
        self.send(req).await.map(drop).map_err(tracerr::wrap!())
    }
}

impl Backend<Update<StudentUpdate>> for Http {
    type Ok = ();
    type Err = Traced<backend::Error>;

    async fn execute(
        &self,
        Update(form): Update<StudentUpdate>,
    ) -> Result<Self::Ok, Self::Err> {
        let req = self.request(Method::PUT, "api/addStudent.php")?.json(&form);
        self.send(req).await.map(drop).map_err(tracerr::wrap!())
    }
}

impl Backend<Delete<By<user::Student, user::Id>>> for Http {
    type Ok = ();
    type Err = Traced<backend::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<user::Student, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let req = self
            .request(Method::DELETE, "api/addStudent.php")?
            .query(&[("id", by.into_inner().get())]);
        self.send(req).await.map(drop).map_err(tracerr::wrap!())
    }
}

impl Backend<Select<By<Vec<ClassSession>, ()>>> for Http {
    type Ok = Vec<ClassSession>;
    type Err = Traced<backend::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<ClassSession>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let req = self.request(Method::GET, "api/addClass.php")?;
        self.fetch_data(req).await.map_err(tracerr::wrap!())
    }
}

impl Backend<Insert<class::New>> for Http {
    type Ok = ();
    type Err = Traced<backend::Error>;

    async fn execute(
        &self,
        Insert(form): Insert<class::New>,
    ) -> Result<Self::Ok, Self::Err> {
        let req = self.request(Method::POST, "api/addClass.php")?.json(&form);
        self.send(req).await.map(drop).map_err(tracerr::wrap!())
    }
}

impl Backend<Select<By<QrCode, ()>>> for Http {
    type Ok = QrCode;
    type Err = Traced<backend::Error>;

    async fn execute(
        &self,
        _: Select<By<QrCode, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let req = self.request(Method::GET, "api/generateQR.php")?;
        self.fetch(req).await.map_err(tracerr::wrap!())
    }
}

impl Backend<Perform<attendance::Scan>> for Http {
    type Ok = attendance::Receipt;
    type Err = Traced<backend::Error>;

    async fn execute(
        &self,
        Perform(scan): Perform<attendance::Scan>,
    ) -> Result<Self::Ok, Self::Err> {
        let req =
            self.request(Method::POST, "api/scanAttendance.php")?.json(&scan);
        self.fetch(req).await.map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use std::{
        collections::HashMap,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
    };

    use axum::{
        extract::Query,
        http::{HeaderMap, StatusCode},
        routing::{get, post},
        Json, Router,
    };
    use common::operations::{By, Perform, Select};
    use secrecy::SecretBox;
    use serde_json::{json, Value};

    use crate::{
        domain::{attendance, class, user, Role},
        infra::{
            backend::{self, Login},
            storage::MemoryStorage,
            Backend as _,
        },
        read::{Account, Dashboard},
        session,
    };

    use super::{Config, Http};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        drop(tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        }));
        format!("http://{addr}/backend")
    }

    fn client(url: String, store: &session::Store) -> Http {
        Http::new(
            &Config {
                url,
                ..Config::default()
            },
            store.clone(),
        )
        .unwrap()
    }

    fn login() -> Login {
        Login {
            email: "ana@school.test".parse().unwrap(),
            password: SecretBox::new(Box::new("hunter22".into())),
        }
    }

    fn router() -> Router {
        Router::new()
            .route(
                "/backend/api/login.php",
                post(|Json(body): Json<Value>| async move {
                    if body["password"] == "hunter22" {
                        Ok(Json(json!({
                            "token": "t0k3n",
                            "user": {
                                "id": 5,
                                "name": "Ana Lopez",
                                "role": "teacher",
                                "must_change_password": "0",
                            },
                        })))
                    } else {
                        Err((
                            StatusCode::UNAUTHORIZED,
                            Json(json!({"message": "Invalid credentials"})),
                        ))
                    }
                }),
            )
            .route(
                "/backend/api/getDashboardData.php",
                get(|headers: HeaderMap| async move {
                    let authorized = headers
                        .get("authorization")
                        .is_some_and(|v| v == "Bearer t0k3n");
                    if authorized {
                        Ok(Json(json!({"data": {
                            "stats": {"totalClasses": 4},
                            "classes": [],
                        }})))
                    } else {
                        Err((
                            StatusCode::UNAUTHORIZED,
                            Json(json!({"message": "Token expired"})),
                        ))
                    }
                }),
            )
            .route(
                "/backend/api/getUsers.php",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    Json(json!({"data": [
                        {"id": 1, "name": "Ben", "role": q["role"]},
                    ]}))
                }),
            )
            .route(
                "/backend/api/scanAttendance.php",
                post(|| async {
                    (
                        StatusCode::CONFLICT,
                        Json(json!({"message": "Already scanned"})),
                    )
                }),
            )
    }

    #[tokio::test]
    async fn signs_in_and_authorizes_requests() {
        let url = serve(router()).await;
        let store = session::Store::hydrate(MemoryStorage::new());
        let http = client(url, &store);

        let auth = http.execute(Perform(login())).await.unwrap();
        assert_eq!(auth.user.role, Role::Teacher);
        assert!(!auth.user.must_change_password);
        store.establish(auth.into()).unwrap();

        let dashboard = http
            .execute(Select(By::<Dashboard, ()>::new(())))
            .await
            .unwrap();
        assert_eq!(dashboard.stats.total_classes, 4);
    }

    #[tokio::test]
    async fn unauthorized_response_clears_session() {
        let url = serve(router()).await;
        let store = session::Store::hydrate(MemoryStorage::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let http = client(url, &store).on_unauthorized({
            let calls = Arc::clone(&calls);
            move || {
                _ = calls.fetch_add(1, Ordering::SeqCst);
            }
        });

        let auth = http.execute(Perform(login())).await.unwrap();
        let mut session: crate::domain::Session = auth.into();
        session.token = "stale".parse().unwrap();
        store.establish(session).unwrap();

        let err = http
            .execute(Select(By::<Dashboard, ()>::new(())))
            .await
            .unwrap_err();

        assert!(err.as_ref().is_unauthorized());
        assert_eq!(err.as_ref().to_string(), "Token expired");
        assert!(store.current().is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rejected_credentials_keep_backend_message() {
        let url = serve(router()).await;
        let store = session::Store::hydrate(MemoryStorage::new());
        let http = client(url, &store);

        let err = http
            .execute(Perform(Login {
                password: SecretBox::new(Box::new("wrong-one".into())),
                ..login()
            }))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            backend::Error::Unauthorized { message }
                if message == "Invalid credentials",
        ));
    }

    #[tokio::test]
    async fn rejected_scan_reports_message() {
        let url = serve(router()).await;
        let store = session::Store::hydrate(MemoryStorage::new());
        let http = client(url, &store);

        let err = http
            .execute(Perform(attendance::Scan {
                student_id: user::Id::new(42).unwrap(),
                class_id: class::Id::new(7).unwrap(),
            }))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            backend::Error::Rejected { status: 409, .. },
        ));
        assert_eq!(err.as_ref().to_string(), "Already scanned");
    }

    #[tokio::test]
    async fn lists_users_by_role() {
        let url = serve(router()).await;
        let store = session::Store::hydrate(MemoryStorage::new());
        let http = client(url, &store);

        let users = http
            .execute(Select(By::<Vec<Account>, _>::new(Role::Student)))
            .await
            .unwrap();

        assert_eq!(users.len(), 1);
        assert_eq!(users[0].role, Some(Role::Student));
    }

    #[tokio::test]
    async fn unreachable_backend_is_transport_error() {
        let store = session::Store::hydrate(MemoryStorage::new());
        let http = client("http://127.0.0.1:9/backend".into(), &store);

        let err = http
            .execute(Select(By::<Dashboard, ()>::new(())))
            .await
            .unwrap_err();

        assert!(err.as_ref().is_transport());
    }
}
