//! Discord command implementations organized by category.

/// General utility commands
pub mod general;

/// Reminder commands
pub mod reminder;

// Export commands
pub use general::*;
pub use reminder::*;
