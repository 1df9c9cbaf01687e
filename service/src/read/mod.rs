//! Read entities definitions.

pub mod attendance;
pub mod dashboard;
pub mod qr;
pub mod report;
pub mod user;

pub use self::{
    attendance::History, dashboard::Dashboard, qr::QrCode, report::Monthly,
    user::Account,
};
