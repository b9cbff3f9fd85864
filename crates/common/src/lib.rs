//! Shared configuration and utilities for Ridgeline

pub mod config;
pub mod email;

pub use config::Config;
pub use email::normalize_email;
