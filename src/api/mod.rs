//! cert-manager webhook front end

pub mod handlers;
pub mod models;
pub mod server;
