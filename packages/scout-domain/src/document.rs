use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::endpoint::Endpoint;

/// Stable document identity derived from the canonical source endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);
impl DocumentId {
	pub fn for_endpoint(endpoint: &Endpoint) -> Self {
		Self(Uuid::new_v5(&Uuid::NAMESPACE_URL, endpoint.as_str().as_bytes()))
	}

	pub fn as_uuid(&self) -> Uuid {
		self.0
	}
}

impl fmt::Display for DocumentId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.0.fmt(f)
	}
}

/// An indexed, embedded document. Nothing mutates a document after the
/// indexer produces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
	pub id: DocumentId,
	pub title: String,
	pub source_content: String,
	pub embedding: Vec<f32>,
	pub source_endpoint: Endpoint,
}
impl Document {
	pub fn new(
		source_endpoint: Endpoint,
		title: impl Into<String>,
		source_content: impl Into<String>,
		embedding: Vec<f32>,
	) -> Self {
		Self {
			id: DocumentId::for_endpoint(&source_endpoint),
			title: title.into(),
			source_content: source_content.into(),
			embedding,
			source_endpoint,
		}
	}

	pub fn dimension(&self) -> usize {
		self.embedding.len()
	}
}
