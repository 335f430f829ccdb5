//! # Timetabler Config
//!
//! Configuration types for the Timetabler API, loaded from environment variables:
//!
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`scheduling`]: Generation defaults and the statistics basis
//!
//! # Example
//!
//! ```ignore
//! use timetabler_config::{CorsConfig, SchedulingConfig};
//!
//! let cors_config = CorsConfig::from_env();
//! let scheduling = SchedulingConfig::from_env();
//! ```

pub mod cors;
pub mod scheduling;

pub use cors::CorsConfig;
pub use scheduling::SchedulingConfig;
