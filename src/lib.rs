pub mod config;
pub mod currency;
pub mod engine;
pub mod error;
pub mod form;
pub mod format;
pub mod input;
pub mod logging;
pub mod report;

pub use error::{Error, Result};
