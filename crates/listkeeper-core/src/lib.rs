pub mod deadline;
pub mod error;
pub mod list;
pub mod validation;

pub use deadline::Deadline;
pub use error::{DeadlineExceeded, ValidationError};
pub use list::{CreateList, List, UpdateList};
