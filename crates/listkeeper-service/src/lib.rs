pub mod attachment;
mod local;
mod traits;

pub use attachment::{AttachmentError, AttachmentResolver, Upload};
pub use local::{LocalService, DEFAULT_TIMEOUT};
pub use traits::{ListService, ServiceError};
