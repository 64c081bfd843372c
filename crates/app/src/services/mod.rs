//! Application services.

pub mod roles;

pub use roles::resolve_role;
