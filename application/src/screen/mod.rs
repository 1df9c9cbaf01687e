//! Screens of the client, one per dashboard page.

pub mod admin;
pub mod attendance;
pub mod auth;
pub mod dashboard;
pub mod qr;
pub mod scanner;

use tokio::io::{self, AsyncBufReadExt as _, BufReader, Lines, Stdin};

use crate::{
    args::{ClassesAction, Screen, StudentsAction, UsersAction},
    define_error, AsError, Context, Error,
};

/// Opens the provided [`Screen`].
///
/// # Errors
///
/// If the [`Screen`] fails, or the navigation guard doesn't allow it.
pub async fn open(ctx: &Context, screen: Screen) -> Result<(), Error> {
    match screen {
        Screen::Login { email, password } => {
            auth::login(ctx, email, password).await
        }
        Screen::Logout => auth::logout(ctx).await,
        Screen::Whoami => auth::whoami(ctx),
        Screen::ChangePassword => auth::change_password(ctx).await,
        Screen::ForgotPassword { email } => {
            auth::forgot_password(ctx, email).await
        }
        Screen::Dashboard => dashboard::overview(ctx).await,
        Screen::Menu => dashboard::menu(ctx),
        Screen::Attendance {
            search,
            class,
            student,
        } => attendance::history(ctx, search, class, student).await,
        Screen::Report {
            year,
            month,
            search,
        } => attendance::monthly_report(ctx, year, month, search).await,
        Screen::Users { action } => match action {
            UsersAction::List { role } => admin::users(ctx, role).await,
            UsersAction::Register(form) => admin::register(ctx, form).await,
            UsersAction::Delete { id } => admin::delete_user(ctx, id).await,
        },
        Screen::Students { action } => match action {
            StudentsAction::Update {
                id,
                name,
                email,
                phone,
                details,
            } => {
                admin::update_student(ctx, id, name, email, phone, details)
                    .await
            }
            StudentsAction::Delete { id } => {
                admin::delete_student(ctx, id).await
            }
        },
        Screen::Classes { action } => match action {
            ClassesAction::List => admin::classes(ctx).await,
            ClassesAction::Create {
                name,
                subject,
                date,
                start,
                end,
                room,
            } => {
                admin::create_class(
                    ctx,
                    service::domain::class::New {
                        class_name: name,
                        subject,
                        class_date: date,
                        start_time: start,
                        end_time: end,
                        room,
                    },
                )
                .await
            }
        },
        Screen::Qr => qr::show(ctx).await,
        Screen::Scan { class } => scanner::scan(ctx, class).await,
    }
}

/// Line-based input read from the standard input.
#[derive(Debug)]
pub struct Input(Lines<BufReader<Stdin>>);

impl Input {
    /// Creates a new [`Input`] reading the standard input.
    #[must_use]
    pub fn stdin() -> Self {
        Self(BufReader::new(io::stdin()).lines())
    }

    /// Prompts for a single non-empty line, labeled with the `label`.
    ///
    /// # Errors
    ///
    /// If the input is closed or cannot be read.
    pub async fn line(&mut self, label: &str) -> Result<String, Error> {
        eprint!("{label}: ");
        let line = self
            .0
            .next_line()
            .await
            .map_err(AsError::into_error)?
            .ok_or(InputError::Closed)?;
        let line = line.trim();
        if line.is_empty() {
            return Err(InputError::Empty.into());
        }
        Ok(line.to_owned())
    }
}

define_error! {
    enum InputError {
        #[code = "INPUT_CLOSED"]
        #[message = "Input has been closed before a value was entered"]
        Closed,

        #[code = "INPUT_EMPTY"]
        #[message = "Value must not be empty"]
        Empty,
    }
}
