//! Persisted index format: a flat JSON array of document records.

use std::{collections::HashSet, fs, path::Path};

use serde::{Deserialize, Serialize};

use scout_domain::{Document, DocumentId, Endpoint, projection};

use crate::{DocumentStore, Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
	pub id: DocumentId,
	pub title: String,
	pub embedding: Vec<f32>,
	pub source_endpoint: Endpoint,
	/// Projected source content, truncated when written.
	pub summary: String,
}
impl IndexRecord {
	pub fn from_document(doc: &Document, summary_chars: usize) -> Self {
		let projected = projection::project_content(&doc.source_content);

		Self {
			id: doc.id,
			title: doc.title.clone(),
			embedding: doc.embedding.clone(),
			source_endpoint: doc.source_endpoint.clone(),
			summary: projection::truncate_chars(&projected, summary_chars),
		}
	}

	pub fn into_document(self) -> Document {
		Document {
			id: self.id,
			title: self.title,
			source_content: self.summary,
			embedding: self.embedding,
			source_endpoint: self.source_endpoint,
		}
	}
}

pub fn save_index(path: &Path, store: &DocumentStore, summary_chars: usize) -> Result<()> {
	let records: Vec<IndexRecord> =
		store.iter().map(|doc| IndexRecord::from_document(doc, summary_chars)).collect();
	let payload = serde_json::to_vec_pretty(&records)
		.map_err(|source| Error::Encode { path: path.to_path_buf(), source })?;
	let mut tmp = path.as_os_str().to_owned();

	tmp.push(".tmp");

	fs::write(&tmp, payload).map_err(|source| Error::Io { path: tmp.clone().into(), source })?;
	fs::rename(&tmp, path).map_err(|source| Error::Io { path: path.to_path_buf(), source })?;

	tracing::info!(path = %path.display(), documents = records.len(), "Wrote index file.");

	Ok(())
}

pub fn load_index(path: &Path) -> Result<DocumentStore> {
	let raw = fs::read(path).map_err(|source| Error::Io { path: path.to_path_buf(), source })?;
	let records: Vec<IndexRecord> = serde_json::from_slice(&raw)
		.map_err(|source| Error::Decode { path: path.to_path_buf(), source })?;
	let mut seen = HashSet::with_capacity(records.len());
	let mut store = DocumentStore::new();

	for record in records {
		let expected = DocumentId::for_endpoint(&record.source_endpoint);

		if record.id != expected {
			return Err(Error::MismatchedId {
				path: path.to_path_buf(),
				id: record.id,
				endpoint: record.source_endpoint.to_string(),
				expected,
			});
		}
		if !seen.insert(record.id) {
			return Err(Error::DuplicateDocument { path: path.to_path_buf(), id: record.id });
		}

		store.insert(record.into_document())?;
	}

	tracing::info!(
		path = %path.display(),
		documents = store.len(),
		dimension = store.dimension().unwrap_or_default(),
		"Loaded index file."
	);

	Ok(store)
}
