pub mod attendance;
pub mod attendee;
pub mod event;
pub mod organizer;
pub mod registration;
pub mod stats;
pub mod ticket;

pub use attendance::{AttendanceInsert, AttendanceRecord, AttendanceState, CheckInMethod, NewAttendance};
pub use attendee::{Attendee, AttendeeInfo};
pub use event::{Event, EventStatus, NewEvent};
pub use organizer::{NewOrganizer, Organizer};
pub use registration::{
    AttendeeEntry, NewRegistration, PaymentStatus, Registration, RegistrationStatus,
    RegistrationView,
};
pub use stats::{AttendanceCounts, AttendeeStats};
pub use ticket::{NewTicketType, TicketType, AMOUNT_SCALE, MAX_AMOUNT};
