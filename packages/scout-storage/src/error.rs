use std::path::PathBuf;

use scout_domain::DocumentId;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Document {id} has embedding dimension {actual}, store dimension is {expected}.")]
	DimensionMismatch { id: DocumentId, expected: usize, actual: usize },
	#[error("Document {id} has an empty embedding.")]
	EmptyEmbedding { id: DocumentId },
	#[error("Index file {path:?} contains document {id} more than once.")]
	DuplicateDocument { path: PathBuf, id: DocumentId },
	#[error("Index file {path:?} stores id {id} for {endpoint}, expected {expected}.")]
	MismatchedId { path: PathBuf, id: DocumentId, endpoint: String, expected: DocumentId },
	#[error("Failed to access index file at {path:?}.")]
	Io { path: PathBuf, source: std::io::Error },
	#[error("Failed to decode index file at {path:?}.")]
	Decode { path: PathBuf, source: serde_json::Error },
	#[error("Failed to encode index file for {path:?}.")]
	Encode { path: PathBuf, source: serde_json::Error },
}
