pub mod enums;
pub mod lab;
pub mod prescription;
pub mod reminder;
pub mod schedule;
pub mod stored_file;

pub use enums::{Regimen, Weekday};
pub use lab::LabStudy;
pub use prescription::{DosingEntry, Prescription, PrescriptionContent};
pub use reminder::{Reminder, ReminderState};
pub use schedule::{TimeOfDay, WeekdaySet};
pub use stored_file::StoredFile;
