pub mod document;
pub mod endpoint;
pub mod projection;

pub use document::{Document, DocumentId};
pub use endpoint::{Endpoint, EndpointError};
