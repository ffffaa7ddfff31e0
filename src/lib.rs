pub mod combine;
pub mod config;
pub mod deflate;
pub mod error;
pub mod gather;
pub mod run_desc;

pub use error::{OceanError, Result};
