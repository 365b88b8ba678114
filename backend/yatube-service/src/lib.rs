/// Yatube Service Library
///
/// Serves the blog feeds of the Yatube platform: the global feed, group feeds,
/// author profiles and the personalized "followed authors" feed, plus the
/// post, comment, follow and like mutations behind them.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers (thin adapters over `services`)
/// - `models`: Records stored by the content store and the views built from them
/// - `services`: Visibility resolution, pagination and mutation rules
/// - `db`: The `ContentStore` repository trait and its implementations
/// - `cache`: The global feed cache and its backing stores
/// - `middleware`: Viewer identity extraction and operational guards
/// - `error`: Error types and their HTTP mapping
/// - `config`: Configuration management
/// - `metrics`: Prometheus collectors
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod services;
pub mod validators;

pub use config::Config;
pub use error::{AppError, Result};
