//! Role-gated navigation between the client screens.

pub mod guard;
pub mod menu;
pub mod route;

pub use self::{
    guard::{decide, navigate, Decision, Target},
    route::{Access, Route},
};
