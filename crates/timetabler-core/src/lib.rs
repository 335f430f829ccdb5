//! # Timetabler Core
//!
//! Core types, errors, and utilities shared by every Timetabler crate.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`pagination`]: Pagination parameters and metadata for list endpoints
//! - [`serde`]: Custom serde deserialization helpers for query strings
//!
//! # Example
//!
//! ```ignore
//! use timetabler_core::errors::AppError;
//! use timetabler_core::pagination::{paginate, PaginationParams};
//!
//! let error = AppError::not_found(anyhow::anyhow!("Timetable entry not found"));
//!
//! let (page, meta) = paginate(entries, &PaginationParams::default());
//! ```

pub mod errors;
pub mod pagination;
pub mod serde;

// Re-export commonly used types at crate root
pub use errors::AppError;
pub use pagination::{PaginationMeta, PaginationParams, paginate};
