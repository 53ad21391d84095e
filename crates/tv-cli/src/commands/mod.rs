//! CLI subcommand implementations.

pub mod events;
pub mod timesheet;
mod util;
pub mod validate;

pub use util::CalendarArgs;
