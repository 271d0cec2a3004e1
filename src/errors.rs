//! Unified error type for the reminder bot.
//!
//! Only creation-time problems (bad durations, empty messages) are ever shown to
//! users. Failures after a reminder has been scheduled are logged where they
//! happen and never bubble up through this type.

use thiserror::Error;

/// All errors produced by the reminder bot.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// Duration text contained no `<number><unit>` token, or was out of range
    #[error("Invalid duration format `{input}`! Use combinations like 1d2h30m")]
    InvalidDuration {
        /// The duration text as the user typed it
        input: String,
    },

    /// Reminder message was empty
    #[error("Please provide a message for the reminder.")]
    EmptyMessage,

    /// No reminder exists at the given list position
    #[error("No reminder at position {index}")]
    ReminderNotFound {
        /// 1-based index the user asked for
        index: usize,
    },

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Reminder document could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Missing or invalid environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Serenity/Poise framework error
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
