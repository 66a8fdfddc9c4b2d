//! Identifiers, reference code lists and the error types shared by the
//! rest of the crate.

pub mod countries;
pub mod currencies;
mod error;
mod key;
mod note;

pub use error::*;
pub(crate) use error::join_path;
pub use key::*;
pub use note::Note;
