pub mod index_file;
pub mod store;

mod error;

pub use error::Error;
pub use index_file::{IndexRecord, load_index, save_index};
pub use store::DocumentStore;

pub type Result<T, E = Error> = std::result::Result<T, E>;
