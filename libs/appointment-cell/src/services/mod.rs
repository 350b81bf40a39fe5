pub mod calendar;
pub mod lifecycle;
pub mod search;

pub use calendar::{CalendarService, MonthCursor};
pub use lifecycle::AppointmentLifecycleService;
pub use search::AppointmentSearchService;
