pub mod lifecycle;
pub mod booking;

pub use booking::BookingService;
pub use lifecycle::BookingLifecycleService;
