//! Terminal front end for [`crate::shelf::ShelfApp`].

pub mod cli;

pub use cli::{CliDriver, CliDriverError, DriverResult};
