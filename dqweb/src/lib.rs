pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod routes;
pub mod server;
pub mod state;
