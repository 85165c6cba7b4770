//! Domain core for the Gigflow service catalog.
//!
//! Zero internal dependencies: the filter builder, the pagination engine and
//! the catalog field rules live here so the repository and HTTP layers can
//! share them.

pub mod catalog;
pub mod error;
pub mod filter;
pub mod input;
pub mod pagination;
pub mod types;
pub mod validation;
