pub mod connection_config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod sync_connection;
