use std::collections::HashMap;

use scout_domain::{Document, DocumentId};

use crate::{Error, Result};

/// Ordered, in-memory collection of documents.
///
/// Insertion order is preserved and used as the ranking tie-breaker. All
/// embeddings share one dimension, fixed by the first inserted document.
#[derive(Debug, Default, Clone)]
pub struct DocumentStore {
	documents: Vec<Document>,
	positions: HashMap<DocumentId, usize>,
}
impl DocumentStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn from_documents<I>(documents: I) -> Result<Self>
	where
		I: IntoIterator<Item = Document>,
	{
		let mut store = Self::new();

		for doc in documents {
			store.insert(doc)?;
		}

		Ok(store)
	}

	/// Inserts a document. A document with an existing id replaces the old
	/// one in its original position.
	pub fn insert(&mut self, doc: Document) -> Result<()> {
		if doc.embedding.is_empty() {
			return Err(Error::EmptyEmbedding { id: doc.id });
		}
		if let Some(expected) = self.dimension()
			&& expected != doc.dimension()
		{
			return Err(Error::DimensionMismatch { id: doc.id, expected, actual: doc.dimension() });
		}

		match self.positions.get(&doc.id) {
			Some(&pos) => {
				tracing::debug!(id = %doc.id, "Replacing existing document.");

				self.documents[pos] = doc;
			},
			None => {
				self.positions.insert(doc.id, self.documents.len());
				self.documents.push(doc);
			},
		}

		Ok(())
	}

	pub fn get(&self, id: &DocumentId) -> Option<&Document> {
		self.positions.get(id).map(|&pos| &self.documents[pos])
	}

	pub fn contains(&self, id: &DocumentId) -> bool {
		self.positions.contains_key(id)
	}

	/// Embedding dimension shared by every document, `None` when empty.
	pub fn dimension(&self) -> Option<usize> {
		self.documents.first().map(Document::dimension)
	}

	pub fn len(&self) -> usize {
		self.documents.len()
	}

	pub fn is_empty(&self) -> bool {
		self.documents.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Document> {
		self.documents.iter()
	}

	pub fn documents(&self) -> &[Document] {
		&self.documents
	}
}

#[cfg(test)]
mod tests {
	use scout_domain::Endpoint;

	use super::*;

	fn doc(path: &str, embedding: Vec<f32>) -> Document {
		let endpoint = Endpoint::parse(&format!("http://localhost{path}")).expect("bad endpoint");

		Document::new(endpoint, path, "", embedding)
	}

	#[test]
	fn reinserting_an_endpoint_overwrites_in_place() {
		let mut store = DocumentStore::new();

		store.insert(doc("/a", vec![1.0, 0.0])).expect("insert a");
		store.insert(doc("/b", vec![0.0, 1.0])).expect("insert b");
		store.insert(doc("/a", vec![0.5, 0.5])).expect("reinsert a");

		assert_eq!(store.len(), 2);
		assert_eq!(store.documents()[0].embedding, vec![0.5, 0.5]);
		assert_eq!(store.documents()[1].title, "/b");
	}

	#[test]
	fn rejects_mixed_dimensions() {
		let mut store = DocumentStore::new();

		store.insert(doc("/a", vec![1.0, 0.0])).expect("insert a");

		let err = store.insert(doc("/b", vec![1.0, 0.0, 0.0])).expect_err("Expected mismatch.");

		assert!(matches!(err, Error::DimensionMismatch { expected: 2, actual: 3, .. }));
		assert_eq!(store.len(), 1);
	}

	#[test]
	fn rejects_empty_embeddings() {
		let err = DocumentStore::from_documents([doc("/a", Vec::new())])
			.expect_err("Expected empty embedding error.");

		assert!(matches!(err, Error::EmptyEmbedding { .. }));
	}

	#[test]
	fn empty_store_has_no_dimension() {
		assert_eq!(DocumentStore::new().dimension(), None);
	}
}
