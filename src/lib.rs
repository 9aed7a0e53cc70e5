pub mod config;
pub mod error;
pub mod sandbox;
pub mod server;
pub mod startup;
