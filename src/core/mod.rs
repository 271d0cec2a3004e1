//! Core business logic - framework-agnostic reminder parsing, storage and scheduling.

/// Free-text duration parsing (`1d2h30m`)
pub mod duration;
/// Delivery policy and the chat-platform transport boundary
pub mod notifier;
/// Create, list and cancel operations used by commands
pub mod reminders;
/// Per-reminder delivery timers
pub mod scheduler;
/// JSON-backed persistence of pending reminders
pub mod store;
