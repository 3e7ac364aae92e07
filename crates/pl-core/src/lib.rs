pub mod diagnostics;
pub mod error;
pub mod pretty;
pub mod span;
pub mod symbol;
pub mod tree;

pub use error::{Error, Result};
