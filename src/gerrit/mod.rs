//! Gerrit code review client.
//!
//! - [`api`] defines the [`Api`] boundary (`query`, `gsql`, `review`) and
//!   the row-shaped [`ApiResult`] it returns.
//! - [`ssh`] implements it over Gerrit's SSH command interface, building
//!   every remote command with the escaping in [`crate::execution`].
//! - [`change`] is the model for a single change.

pub mod api;
pub mod change;
pub mod ssh;

pub use api::{bind_gsql, Api, ApiResult, GsqlValue};
pub use change::Change;
pub use ssh::SshApi;
