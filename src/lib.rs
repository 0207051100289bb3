// src/lib.rs

pub mod config;
pub mod domain;
pub mod error;
pub mod extractor;
pub mod lifecycle;
pub mod service;

pub use config::AuditConfig;
pub use error::{AuditError, Result};
