pub mod error;
pub mod models;
pub mod voter;

pub use error::{IdentityError, Result};
pub use models::*;
pub use voter::*;

#[cfg(test)]
mod tests;
