//! Data models for statement ingestion.

pub mod config;
pub mod expense;
pub mod transaction;
