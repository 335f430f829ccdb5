//! # Timetabler Scheduling
//!
//! The scheduling core of the timetable service.
//!
//! - [`conflicts`]: teacher/room/class double-booking detection
//! - [`slots`]: free-interval discovery within a school day
//! - [`generator`]: greedy, priority-ordered weekly timetable generation
//! - [`statistics`]: utilization and workload aggregates
//! - [`lifecycle`]: status transitions and clock-explicit entry queries
//! - [`store`]: the [`EntryStore`] capability and an in-memory implementation
//! - [`locks`]: per-class serialization of generation runs
//!
//! All I/O goes through [`EntryStore`]; everything else is plain computation.
//!
//! # Example
//!
//! ```ignore
//! use timetabler_scheduling::{InMemoryEntryStore, TimetableGenerator};
//!
//! let store = InMemoryEntryStore::new();
//! let result = TimetableGenerator::new(&store).generate(&request).await?;
//! for shortfall in &result.shortfalls {
//!     println!("{}: {}/{}", shortfall.subject_name, shortfall.scheduled, shortfall.required);
//! }
//! ```

pub mod conflicts;
pub mod error;
pub mod generator;
pub mod lifecycle;
pub mod locks;
pub mod slots;
pub mod statistics;
pub mod store;

pub use conflicts::{ConflictSnapshot, collect_conflicts, detect_conflicts};
pub use error::{SchedulingError, StoreError};
pub use generator::TimetableGenerator;
pub use locks::{GenerationKey, GenerationLocks};
pub use slots::{SlotQuery, find_available_slots};
pub use statistics::aggregate_statistics;
pub use store::{EntryStore, InMemoryEntryStore};
