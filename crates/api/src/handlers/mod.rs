pub mod service;
pub mod service_type;
