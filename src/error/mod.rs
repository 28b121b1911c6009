mod types;

pub use types::{Result, ShelfError};
