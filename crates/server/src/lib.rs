//! Import-path redirect adapter: HTTP surface, configuration and the upstream client.

pub mod config;
pub mod routes;
pub mod upstream;
