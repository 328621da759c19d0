//! Route modules.

pub mod upload;
