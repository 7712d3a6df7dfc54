use std::{sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;

use scout_service::{Error, IndexInput, Indexer};
use scout_testkit::{FailingEmbedding, StaticFetcher, TableEmbedding};

fn inputs(paths: &[&str]) -> Vec<IndexInput> {
	paths
		.iter()
		.map(|path| {
			let content = format!("{{\"path\": \"{path}\"}}");

			IndexInput::new(scout_testkit::endpoint(path), *path, content)
		})
		.collect()
}

fn indexer(embedding: Arc<TableEmbedding>, concurrency: usize) -> Indexer {
	Indexer::new(&scout_testkit::test_config(2), embedding).with_concurrency(concurrency)
}

#[tokio::test]
async fn partial_failures_keep_input_order() {
	let embedding = Arc::new(
		TableEmbedding::new(2).with_fallback(vec![1.0, 0.0]).fail_on("/b").fail_on("/d"),
	);
	let report = indexer(embedding, 2)
		.index(inputs(&["/a", "/b", "/c", "/d", "/e"]), &CancellationToken::new())
		.await
		.expect("Indexing failed.");
	let indexed = report.documents.iter().map(|doc| doc.title.as_str()).collect::<Vec<_>>();
	let failed = report.failures.iter().map(|f| f.endpoint.path()).collect::<Vec<_>>();

	assert_eq!(indexed, vec!["/a", "/c", "/e"]);
	assert_eq!(failed, vec!["/b", "/d"]);
	assert!(report.is_partial());
	assert!(report.failures.iter().all(|f| matches!(f.error, Error::Embedding { .. })));
}

#[tokio::test]
async fn total_failure_is_an_error() {
	let cfg = scout_testkit::test_config(2);
	let err = Indexer::new(&cfg, Arc::new(FailingEmbedding::new()))
		.index(inputs(&["/a", "/b"]), &CancellationToken::new())
		.await
		.expect_err("Expected indexing to fail.");

	match err {
		Error::IndexFailed { failures } => assert_eq!(failures.len(), 2),
		other => panic!("Unexpected error: {other}"),
	}
}

#[tokio::test]
async fn empty_input_yields_empty_report() {
	let report = indexer(Arc::new(TableEmbedding::new(2)), 2)
		.index(Vec::new(), &CancellationToken::new())
		.await
		.expect("Indexing failed.");

	assert!(report.documents.is_empty());
	assert!(!report.is_partial());
}

#[tokio::test]
async fn wrong_dimension_is_a_per_item_failure() {
	let embedding = Arc::new(
		TableEmbedding::new(2).with_fallback(vec![1.0, 0.0]).with_rule("/odd", vec![1.0, 0.0, 0.0]),
	);
	let report = indexer(embedding, 2)
		.index(inputs(&["/a", "/odd"]), &CancellationToken::new())
		.await
		.expect("Indexing failed.");

	assert_eq!(report.documents.len(), 1);
	assert!(matches!(
		report.failures[0].error,
		Error::DimensionMismatch { expected: 2, actual: 3 }
	));
}

#[tokio::test]
async fn concurrency_never_exceeds_the_limit() {
	let embedding = Arc::new(
		TableEmbedding::new(2)
			.with_fallback(vec![1.0, 0.0])
			.with_delay(Duration::from_millis(5)),
	);
	let paths = (0..24).map(|i| format!("/item/{i}")).collect::<Vec<_>>();
	let paths = paths.iter().map(String::as_str).collect::<Vec<_>>();
	let indexer = indexer(embedding.clone(), 3);
	let report =
		indexer.index(inputs(&paths), &CancellationToken::new()).await.expect("Indexing failed.");

	assert_eq!(report.documents.len(), 24);
	assert_eq!(embedding.calls(), 24);
	assert!(embedding.peak_in_flight() <= 3);
	assert!(indexer.limiter().peak() <= 3);
}

#[tokio::test]
async fn duplicate_endpoints_collapse_to_one_document() {
	let embedding = Arc::new(TableEmbedding::new(2).with_fallback(vec![1.0, 0.0]));
	let mut batch = inputs(&["/a", "/b"]);

	batch.push(IndexInput::new(scout_testkit::endpoint("/a"), "A again", "{}"));

	let store = indexer(embedding, 2)
		.index(batch, &CancellationToken::new())
		.await
		.expect("Indexing failed.")
		.into_store()
		.expect("Failed to build store.");

	assert_eq!(store.len(), 2);
	assert_eq!(store.documents()[0].title, "A again");
}

#[tokio::test]
async fn duplicate_that_indexes_once_is_not_reported_failed() {
	let embedding =
		Arc::new(TableEmbedding::new(2).with_fallback(vec![1.0, 0.0]).fail_on("broken"));
	let mut batch = inputs(&["/a", "/b"]);

	batch.insert(0, IndexInput::new(scout_testkit::endpoint("/a"), "A first", "broken payload"));

	let report = indexer(embedding, 2)
		.index(batch, &CancellationToken::new())
		.await
		.expect("Indexing failed.");
	let indexed = report.documents.iter().map(|doc| doc.title.as_str()).collect::<Vec<_>>();

	assert_eq!(indexed, vec!["/a", "/b"]);
	assert!(report.failures.is_empty());
	assert!(!report.is_partial());
}

#[tokio::test]
async fn fetch_failures_are_recorded_per_endpoint() {
	let fetcher = StaticFetcher::new().with_page(
		scout_testkit::endpoint("/pets"),
		"List pets",
		r#"{"summary": "List all pets"}"#,
	);
	let embedding = Arc::new(TableEmbedding::new(2).with_fallback(vec![0.0, 1.0]));
	let report = indexer(embedding, 2)
		.index_endpoints(
			&fetcher,
			vec![scout_testkit::endpoint("/pets"), scout_testkit::endpoint("/missing")],
			&CancellationToken::new(),
		)
		.await
		.expect("Indexing failed.");

	assert_eq!(report.documents.len(), 1);
	assert_eq!(report.documents[0].title, "List pets");
	assert_eq!(report.failures.len(), 1);
	assert_eq!(report.failures[0].endpoint.path(), "/missing");
	assert!(matches!(report.failures[0].error, Error::Fetch { .. }));
}

#[tokio::test]
async fn cancelled_batch_returns_cancelled() {
	let embedding = Arc::new(
		TableEmbedding::new(2)
			.with_fallback(vec![1.0, 0.0])
			.with_delay(Duration::from_secs(30)),
	);
	let indexer = indexer(embedding.clone(), 1);
	let cancel = CancellationToken::new();
	let trigger = cancel.clone();

	tokio::spawn(async move {
		tokio::time::sleep(Duration::from_millis(20)).await;
		trigger.cancel();
	});

	let err = indexer
		.index(inputs(&["/a", "/b", "/c"]), &cancel)
		.await
		.expect_err("Expected cancellation.");

	assert!(err.is_cancelled());
	assert_eq!(embedding.calls(), 1);
}
