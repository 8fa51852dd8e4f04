pub mod client;
pub mod license;
pub mod service_type;
pub mod support;
pub mod task;
pub mod user;
