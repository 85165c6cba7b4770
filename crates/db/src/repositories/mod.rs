//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod service_repo;
pub mod service_type_repo;

pub use service_repo::ServiceRepo;
pub use service_type_repo::ServiceTypeRepo;
