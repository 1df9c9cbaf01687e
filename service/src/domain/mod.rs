//! Domain definitions.

pub mod attendance;
pub mod class;
pub mod lenient;
pub mod user;

pub use self::{
    attendance::ScanEvent,
    class::ClassSession,
    user::{Role, Session},
};
