//! Non-interactive output: plain event lines and the log file.

pub mod formatter;
pub mod logger;
