mod attendee;
mod event;
mod registration;

pub use attendee::AttendeeQueryService;
pub use event::EventService;
pub use registration::RegistrationService;
