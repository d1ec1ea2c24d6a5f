pub mod app;
pub mod config;
pub mod draft;
pub mod export;
pub mod logging;
