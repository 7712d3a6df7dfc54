use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
};

use scout_domain::{Document, DocumentId, Endpoint};
use scout_storage::{DocumentStore, Error, load_index, save_index};

fn temp_path(label: &str) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();

	env::temp_dir().join(format!("scout_index_{label}_{pid}_{ordinal}.json"))
}

fn doc(path: &str, content: &str, embedding: Vec<f32>) -> Document {
	let endpoint =
		Endpoint::parse(&format!("http://api.local{path}")).expect("Failed to parse endpoint.");

	Document::new(endpoint, path.trim_start_matches('/'), content, embedding)
}

/// Index record whose id is derived from `id_path` and whose endpoint is
/// `endpoint_path`.
fn record(id_path: &str, endpoint_path: &str, embedding: Vec<f32>) -> serde_json::Value {
	let id_endpoint =
		Endpoint::parse(&format!("http://api.local{id_path}")).expect("Failed to parse endpoint.");

	serde_json::json!({
		"id": DocumentId::for_endpoint(&id_endpoint),
		"title": id_path,
		"embedding": embedding,
		"source_endpoint": format!("http://api.local{endpoint_path}"),
		"summary": "",
	})
}

#[test]
fn saved_index_loads_in_the_same_order() {
	let path = temp_path("order");
	let store = DocumentStore::from_documents([
		doc("/b", r#"{"summary":"second"}"#, vec![0.0, 1.0]),
		doc("/a", "first", vec![1.0, 0.0]),
	])
	.expect("Failed to build store.");

	save_index(&path, &store, 100).expect("Failed to save index.");

	let loaded = load_index(&path);

	fs::remove_file(&path).expect("Failed to remove index.");

	let loaded = loaded.expect("Failed to load index.");
	let titles: Vec<&str> = loaded.iter().map(|doc| doc.title.as_str()).collect();

	assert_eq!(titles, vec!["b", "a"]);
	assert_eq!(loaded.dimension(), Some(2));
	assert_eq!(loaded.documents()[0].source_content, "summary: second");
	assert_eq!(loaded.documents()[0].id, store.documents()[0].id);
}

#[test]
fn summaries_are_truncated_on_save() {
	let path = temp_path("summary");
	let store = DocumentStore::from_documents([doc("/a", "abcdefghij", vec![1.0])])
		.expect("Failed to build store.");

	save_index(&path, &store, 4).expect("Failed to save index.");

	let loaded = load_index(&path);

	fs::remove_file(&path).expect("Failed to remove index.");

	assert_eq!(loaded.expect("Failed to load index.").documents()[0].source_content, "abcd");
}

#[test]
fn duplicate_records_are_rejected() {
	let path = temp_path("duplicate");
	let record = serde_json::json!({
		"id": scout_domain::DocumentId::for_endpoint(
			&Endpoint::parse("http://api.local/a").expect("Failed to parse endpoint.")
		),
		"title": "a",
		"embedding": [1.0],
		"source_endpoint": "http://api.local/a",
		"summary": "",
	});

	fs::write(&path, serde_json::to_vec(&[record.clone(), record]).expect("encode failed"))
		.expect("Failed to write index.");

	let result = load_index(&path);

	fs::remove_file(&path).expect("Failed to remove index.");

	assert!(matches!(result, Err(Error::DuplicateDocument { .. })));
}

#[test]
fn mixed_dimensions_are_rejected_on_load() {
	let path = temp_path("dims");
	let records =
		serde_json::json!([record("/a", "/a", vec![1.0, 0.0]), record("/b", "/b", vec![1.0])]);

	fs::write(&path, records.to_string()).expect("Failed to write index.");

	let result = load_index(&path);

	fs::remove_file(&path).expect("Failed to remove index.");

	assert!(matches!(result, Err(Error::DimensionMismatch { expected: 2, actual: 1, .. })));
}

#[test]
fn ids_must_derive_from_their_endpoint() {
	let path = temp_path("mismatched");
	let records = serde_json::json!([record("/a", "/a", vec![1.0]), record("/b", "/a", vec![1.0])]);

	fs::write(&path, records.to_string()).expect("Failed to write index.");

	let result = load_index(&path);

	fs::remove_file(&path).expect("Failed to remove index.");

	assert!(matches!(result, Err(Error::MismatchedId { .. })));
}

#[test]
fn missing_file_is_an_io_error() {
	let result = load_index(&temp_path("missing"));

	assert!(matches!(result, Err(Error::Io { .. })));
}
