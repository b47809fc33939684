pub mod app;
pub mod config;
pub mod timeline;
pub mod trace;
pub mod util;
