//! Live user table: a store that publishes full snapshots of its users over
//! server-sent events, and renderers that mirror the latest snapshot onto a
//! table (escaped HTML in the browser page, comfy-table in the terminal).

pub mod config;
pub mod error;
pub mod feed;
pub mod handlers;
pub mod models;
pub mod render;
pub mod routes;
pub mod services;
pub mod templates;
