pub mod controller;
pub mod router;
pub mod service;

pub use router::init_timetable_router;
pub use service::TimetableService;
