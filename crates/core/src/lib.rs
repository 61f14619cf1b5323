//! Core business logic for DailyFlip.

pub mod services;

pub use services::*;
