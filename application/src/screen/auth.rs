//! Sign-in, sign-out and password screens.

use secrecy::SecretBox;
use service::{
    command::{
        self, ChangePassword, RequestPasswordReset, ResetPassword, SignIn,
        SignOut, VerifyResetCode,
    },
    domain::user::{Email, Password},
    Command as _,
};
use tracing as log;

use crate::{define_error, AsError, Context, Error};

use super::Input;

/// Signs in, prompting for the password unless provided.
///
/// # Errors
///
/// If the credentials are rejected, or the backend is unreachable.
pub async fn login(
    ctx: &Context,
    email: Email,
    password: Option<String>,
) -> Result<(), Error> {
    let password = match password {
        Some(p) => p,
        None => Input::stdin().line("Password").await?,
    };
    let password = Password::new(password).ok_or(CredentialsError::Invalid)?;

    let session = ctx
        .service()
        .execute(SignIn {
            email,
            password: SecretBox::new(Box::new(password)),
        })
        .await
        .map_err(AsError::into_error)?;

    println!(
        "Welcome back, {}! Signed in as {}.",
        session.display_name().first(),
        session.role(),
    );
    if session.must_change_password() {
        println!(
            "You must change your password first: `attendance change-password`",
        );
    }
    Ok(())
}

/// Signs out.
///
/// # Errors
///
/// If the persisted session cannot be removed.
pub async fn logout(ctx: &Context) -> Result<(), Error> {
    ctx.service()
        .execute(SignOut)
        .await
        .map_err(AsError::into_error)?;
    println!("Signed out.");
    Ok(())
}

/// Shows the signed-in user.
///
/// # Errors
///
/// If nobody is signed in.
pub fn whoami(ctx: &Context) -> Result<(), Error> {
    let session = ctx.require_session()?;
    let profile = &session.profile;

    println!("{} ({})", profile.name, profile.role);
    println!("  ID:    {}", profile.id);
    if let Some(email) = &profile.email {
        println!("  Email: {email}");
    }
    if session.must_change_password() {
        println!("  Password change is required");
    }
    Ok(())
}

/// Changes the password of the signed-in user.
///
/// # Errors
///
/// If the new password is invalid, or the current one is rejected.
pub async fn change_password(ctx: &Context) -> Result<(), Error> {
    _ = ctx.enter("/change-password")?;

    let mut input = Input::stdin();
    let current = Password::new(input.line("Current password").await?)
        .ok_or(CredentialsError::Invalid)?;
    let new = input.line("New password").await?;
    let confirmation = input.line("Confirm new password").await?;

    let session = ctx
        .service()
        .execute(ChangePassword {
            current: SecretBox::new(Box::new(current)),
            new,
            confirmation,
        })
        .await
        .map_err(AsError::into_error)?;

    println!(
        "Password changed. Your home is `{}`.",
        session.role().home_path(),
    );
    Ok(())
}

/// Recovers a forgotten password: requests a reset code, verifies it and
/// sets a new password.
///
/// # Errors
///
/// If any of the steps is rejected.
pub async fn forgot_password(ctx: &Context, email: Email) -> Result<(), Error> {
    let code = ctx
        .service()
        .execute(RequestPasswordReset {
            email: email.clone(),
        })
        .await
        .map_err(AsError::into_error)?;
    println!("Reset code has been sent to {email}.");
    if let Some(demo) = code.otp_demo {
        println!("Demo code: {demo}");
    }

    let mut input = Input::stdin();
    let code = input.line("Reset code").await?;
    ctx.service()
        .execute(VerifyResetCode {
            email: email.clone(),
            code: code.clone(),
        })
        .await
        .map_err(AsError::into_error)?;

    let new = input.line("New password").await?;
    let confirmation = input.line("Confirm new password").await?;
    ctx.service()
        .execute(ResetPassword {
            email,
            code,
            new,
            confirmation,
        })
        .await
        .map_err(AsError::into_error)?;

    log::info!("password has been reset");
    println!("Password has been reset, please sign in.");
    Ok(())
}

define_error! {
    enum CredentialsError {
        #[code = "INVALID_CREDENTIALS"]
        #[message = "Password must not be empty"]
        Invalid,
    }
}

define_error! {
    enum PasswordError {
        #[code = "PASSWORD_MISMATCH"]
        #[message = "Passwords do not match"]
        Mismatch,

        #[code = "PASSWORD_TOO_SHORT"]
        #[message = "Password must be at least 8 characters"]
        TooShort,

        #[code = "PASSWORD_TOO_LONG"]
        #[message = "Password must be at most 128 characters"]
        TooLong,
    }
}

impl AsError for service::domain::user::PasswordError {
    fn try_as_error(&self) -> Option<Error> {
        Some(
            match self {
                Self::Mismatch => PasswordError::Mismatch,
                Self::TooShort => PasswordError::TooShort,
                Self::TooLong => PasswordError::TooLong,
            }
            .into(),
        )
    }
}

define_error! {
    enum SessionError {
        #[code = "AUTHORIZATION_REQUIRED"]
        #[message = "Please sign in first"]
        NoSession,
    }
}

define_error! {
    enum ResetError {
        #[code = "EMPTY_CODE"]
        #[message = "Please enter the code"]
        EmptyCode,
    }
}

impl AsError for command::sign_in::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Backend(e) => e.try_as_error(),
            Self::Session(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::sign_out::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Session(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::change_password::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Validation(e) => e.try_as_error(),
            Self::NoSession => Some(SessionError::NoSession.into()),
            Self::Backend(e) => e.try_as_error(),
            Self::Session(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::request_password_reset::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Backend(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::verify_reset_code::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::EmptyCode => Some(ResetError::EmptyCode.into()),
            Self::Backend(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::reset_password::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Validation(e) => e.try_as_error(),
            Self::Backend(e) => e.try_as_error(),
        }
    }
}
