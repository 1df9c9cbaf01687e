//! Service contains the client-side logic of the school attendance platform:
//! session lifecycle, navigation guard, QR capture engine and report
//! aggregation over the remote backend.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod navigation;
pub mod query;
pub mod read;
pub mod scanner;
pub mod session;

#[cfg(test)]
use axum as _;
#[cfg(test)]
use tempfile as _;

#[cfg(doc)]
use infra::Backend;

pub use self::{command::Command, query::Query};

/// Client-side domain service.
#[derive(Clone, Debug)]
pub struct Service<Be> {
    /// [`Backend`] of this [`Service`].
    backend: Be,

    /// [`session::Store`] of this [`Service`].
    session: session::Store,
}

impl<Be> Service<Be> {
    /// Creates a new [`Service`] with the provided parameters.
    ///
    /// The `session` must be the same [`session::Store`] the `backend` reads
    /// its access token from.
    #[must_use]
    pub fn new(backend: Be, session: session::Store) -> Self {
        Self { backend, session }
    }

    /// Returns [`Backend`] of this [`Service`].
    #[must_use]
    pub fn backend(&self) -> &Be {
        &self.backend
    }

    /// Returns [`session::Store`] of this [`Service`].
    #[must_use]
    pub fn session(&self) -> &session::Store {
        &self.session
    }
}
