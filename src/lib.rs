pub mod config;
pub mod modules;
pub mod services;

pub use config::Config;
pub use services::forwarder::Forwarder;
