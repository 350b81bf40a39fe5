pub mod datetime;
pub mod error;
pub mod records;

pub use records::{Doctor, Patient, RecordId};
