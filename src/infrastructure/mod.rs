//! Infrastructure layer module
//!
//! Adapters and ambient services behind the domain ports:
//! - Configuration management
//! - Logging infrastructure
//! - Offline studio collaborators with retry
//!
//! Infrastructure implementations satisfy the port traits defined in the domain layer.

pub mod config;
pub mod logging;
pub mod studio;
