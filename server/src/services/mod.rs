//! Workflow operations. Handlers stay thin and call into these; every
//! function takes the store as `&dyn Store` so tests can run on `MemoryStore`.

pub mod checkin;
pub mod events;
pub mod qr;
pub mod registration;
pub mod reports;
