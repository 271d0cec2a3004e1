//! Entity module - Contains the data types persisted by the bot.

pub mod reminder;

pub use reminder::Reminder;
