pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod storage;
pub mod ui;

pub use error::{AppError, Result};
