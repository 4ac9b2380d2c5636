pub mod auth;
pub mod metrics;
pub mod seed;
pub mod store;
