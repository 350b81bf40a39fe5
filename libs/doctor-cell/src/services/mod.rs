pub mod availability;

pub use availability::{AvailabilityService, BookedSlots};
