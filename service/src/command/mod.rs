//! [`Command`] definition.

pub mod change_password;
pub mod create_class;
pub mod delete_student;
pub mod delete_user;
pub mod register_user;
pub mod request_password_reset;
pub mod reset_password;
pub mod sign_in;
pub mod sign_out;
pub mod submit_scan;
pub mod update_profile;
pub mod update_student;
pub mod verify_reset_code;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    change_password::ChangePassword, create_class::CreateClass,
    delete_student::DeleteStudent, delete_user::DeleteUser,
    register_user::RegisterUser,
    request_password_reset::RequestPasswordReset,
    reset_password::ResetPassword, sign_in::SignIn, sign_out::SignOut,
    submit_scan::SubmitScan, update_profile::UpdateProfile,
    update_student::UpdateStudent, verify_reset_code::VerifyResetCode,
};
