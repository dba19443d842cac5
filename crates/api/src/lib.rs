//! HTTP API: the marketplace health-check server.

pub mod app;
pub mod config;
pub mod middleware;
