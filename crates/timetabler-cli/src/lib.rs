//! # Timetabler CLI
//!
//! Generation, seeding and cleanup utilities used by the `timetabler-cli` binary.
//!
//! ## Usage
//!
//! ```ignore
//! use timetabler_cli::seeder::{SeedConfig, generate_class_requests, seed_timetables};
//!
//! let requests = generate_class_requests(&SeedConfig::new(3, 6), &defaults);
//! let summary = seed_timetables(&store, &requests).await?;
//! ```

pub mod request;
pub mod seeder;
