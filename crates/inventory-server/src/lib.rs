//! HTTP server of the inventory reporting API

pub mod api;
pub mod config;
