//! Client-side project cache with optimistic writes.
//!
//! [`ProjectsStore`] owns a [`ProjectsState`] snapshot and reconciles it with
//! the server through a [`ProjectsApi`] transport.

pub mod api;
pub mod error;
pub mod state;
pub mod store;

pub use api::{ClientConfig, HttpProjectsApi, ProjectsApi};
pub use error::{ClientError, ClientResult};
pub use state::ProjectsState;
pub use store::ProjectsStore;
