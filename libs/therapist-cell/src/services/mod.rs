pub mod interval;
pub mod availability;
pub mod catalog;
pub mod therapist;
pub mod matching;
pub mod assignment;
pub mod recurrence;

pub use availability::AvailabilityIndex;
pub use catalog::{CatalogSchedule, CatalogService};
pub use therapist::{TherapistSchedule, TherapistService};
pub use matching::AvailabilityResolver;
pub use assignment::{AssignmentPolicy, UniformRandomPolicy};
pub use recurrence::{RecurrenceExpander, SlotSchedule};
