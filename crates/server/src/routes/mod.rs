pub mod auth;
pub mod clients;
pub mod health;
pub mod licenses;
pub mod reports;
pub mod service_types;
pub mod support;
pub mod tasks;
