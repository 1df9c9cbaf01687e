//! User, student and class management screens.

use itertools::Itertools as _;
use service::{
    command::{
        self, CreateClass, DeleteStudent, DeleteUser, RegisterUser,
        UpdateStudent,
    },
    domain::{class, user, Role},
    query,
    read::Account,
    Command as _,
};

use crate::{
    args::{self, Registration},
    define_error, AsError, Context, Error,
};

use super::dashboard::print_classes;

/// Lists the users having the provided [`Role`].
///
/// # Errors
///
/// If the users cannot be fetched, or the navigation guard doesn't allow
/// it.
pub async fn users(ctx: &Context, role: Role) -> Result<(), Error> {
    _ = ctx.enter(&format!("/admin/{role}s"))?;
    let accounts = ctx
        .service()
        .execute(query::users::ByRole::by(role))
        .await
        .map_err(AsError::into_error)?;

    if accounts.is_empty() {
        println!("No {role}s found.");
    }
    for account in &accounts {
        print_account(account);
    }
    Ok(())
}

/// Registers a new user from the provided [`Registration`] form, showing
/// the generated default password.
///
/// # Errors
///
/// If the registration is rejected, or the navigation guard doesn't allow
/// it.
pub async fn register(ctx: &Context, form: Registration) -> Result<(), Error> {
    _ = ctx.enter("/admin")?;

    let Registration {
        role,
        name,
        email,
        phone,
        dob,
        details,
    } = form;
    let password = ctx
        .service()
        .execute(RegisterUser(user::Registration {
            name,
            email: email.clone(),
            phone,
            dob,
            role,
            student: Some(details.into()),
        }))
        .await
        .map_err(AsError::into_error)?;

    println!("Registered {role} {email}.");
    println!("Default password: {password}");
    println!("The password must be changed on the first sign in.");
    Ok(())
}

/// Deletes the user with the provided [`user::Id`].
///
/// # Errors
///
/// If the deletion is rejected, or the navigation guard doesn't allow it.
pub async fn delete_user(ctx: &Context, id: user::Id) -> Result<(), Error> {
    _ = ctx.enter("/admin")?;
    ctx.service()
        .execute(DeleteUser(id))
        .await
        .map_err(AsError::into_error)?;
    println!("User #{id} has been deleted.");
    Ok(())
}

/// Updates the student record with the provided [`user::Id`].
///
/// # Errors
///
/// If the update is rejected, or the navigation guard doesn't allow it.
pub async fn update_student(
    ctx: &Context,
    id: user::Id,
    name: user::Name,
    email: user::Email,
    phone: Option<String>,
    details: args::StudentDetails,
) -> Result<(), Error> {
    _ = ctx.enter("/admin/students")?;
    ctx.service()
        .execute(UpdateStudent(user::StudentUpdate {
            id,
            name,
            email,
            phone,
            details: details.into(),
        }))
        .await
        .map_err(AsError::into_error)?;
    println!("Student #{id} has been updated.");
    Ok(())
}

/// Deletes the student record with the provided [`user::Id`].
///
/// # Errors
///
/// If the deletion is rejected, or the navigation guard doesn't allow it.
pub async fn delete_student(ctx: &Context, id: user::Id) -> Result<(), Error> {
    _ = ctx.enter("/admin/students")?;
    ctx.service()
        .execute(DeleteStudent(id))
        .await
        .map_err(AsError::into_error)?;
    println!("Student #{id} has been deleted.");
    Ok(())
}

/// Lists the classes visible to the signed-in admin or teacher.
///
/// # Errors
///
/// If the classes cannot be fetched, or the navigation guard doesn't allow
/// it.
pub async fn classes(ctx: &Context) -> Result<(), Error> {
    _ = ctx.enter(classes_path(ctx))?;
    let classes = ctx
        .service()
        .execute(query::classes::List::mine())
        .await
        .map_err(AsError::into_error)?;
    print_classes(&classes);
    Ok(())
}

/// Schedules a new class.
///
/// # Errors
///
/// If the class is invalid or rejected, or the navigation guard doesn't
/// allow it.
pub async fn create_class(ctx: &Context, new: class::New) -> Result<(), Error> {
    _ = ctx.enter(classes_path(ctx))?;
    let name = new.class_name.trim().to_owned();
    ctx.service()
        .execute(CreateClass(new))
        .await
        .map_err(AsError::into_error)?;
    println!("Class `{name}` has been scheduled.");
    Ok(())
}

/// Returns the path of the class management screen of the signed-in user.
fn classes_path(ctx: &Context) -> &'static str {
    match ctx.session().map(|s| s.role()) {
        Some(Role::Admin) => "/admin/classes",
        Some(Role::Teacher | Role::Student | Role::Parent) | None => {
            "/teacher/classes"
        }
    }
}

/// Prints a single line describing the provided [`Account`].
fn print_account(account: &Account) {
    let details = &account.details;
    let contacts = [account.email.as_deref(), account.phone.as_deref()]
        .into_iter()
        .flatten()
        .join(", ");
    let placement = [
        details.grade.as_deref(),
        details.section.as_deref(),
        details.roll_number.as_deref(),
    ]
    .into_iter()
    .flatten()
    .join("/");

    print!("  #{:<5} {:<28} {contacts}", account.id, account.name);
    if !placement.is_empty() {
        print!(" [{placement}]");
    }
    println!();
}

impl From<args::StudentDetails> for user::StudentDetails {
    fn from(value: args::StudentDetails) -> Self {
        let args::StudentDetails {
            grade,
            section,
            roll_number,
        } = value;
        Self {
            grade,
            section,
            roll_number,
        }
    }
}

define_error! {
    enum ManagementError {
        #[code = "ADMIN_REGISTRATION"]
        #[message = "Admins cannot be registered"]
        AdminRegistration,

        #[code = "SELF_DELETION"]
        #[message = "You cannot delete your own account"]
        SelfDeletion,
    }
}

define_error! {
    enum ClassError {
        #[code = "EMPTY_CLASS_NAME"]
        #[message = "Class name is required"]
        EmptyName,

        #[code = "INVALID_CLASS_TIME"]
        #[message = "Class times must be in HH:MM format"]
        InvalidTime,

        #[code = "CLASS_ENDS_BEFORE_START"]
        #[message = "Class must end after it starts"]
        EndsBeforeStart,
    }
}

impl AsError for command::register_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::AdminRegistration => {
                Some(ManagementError::AdminRegistration.into())
            }
            Self::Backend(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::delete_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::SelfDeletion => Some(ManagementError::SelfDeletion.into()),
            Self::Backend(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::update_student::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Backend(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::delete_student::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Backend(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::create_class::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::EmptyName => ClassError::EmptyName.into(),
            Self::InvalidTime => ClassError::InvalidTime.into(),
            Self::EndsBeforeStart => ClassError::EndsBeforeStart.into(),
            Self::Backend(e) => return e.try_as_error(),
        })
    }
}

#[cfg(test)]
mod spec {
    use service::{command, domain::user};

    use crate::{args, AsError as _};

    #[test]
    fn converts_student_details() {
        let details: user::StudentDetails = args::StudentDetails {
            grade: Some("9".into()),
            section: None,
            roll_number: Some("12".into()),
        }
        .into();

        assert_eq!(details.grade.as_deref(), Some("9"));
        assert_eq!(details.section, None);
    }

    #[test]
    fn class_validation_has_codes() {
        let err = command::create_class::ExecutionError::EndsBeforeStart
            .into_error();

        assert_eq!(err.code, "CLASS_ENDS_BEFORE_START");
    }
}
