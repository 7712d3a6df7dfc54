use std::{sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;

use scout_domain::Document;
use scout_service::{Browser, Providers, SearchEngine, SearchOptions};
use scout_storage::DocumentStore;
use scout_testkit::{ScriptedCompletion, TableEmbedding};

fn browser(embedding: Arc<TableEmbedding>, max_concurrency: usize) -> Browser {
	let cfg = scout_testkit::test_config(2);
	let store = DocumentStore::from_documents([
		Document::new(scout_testkit::endpoint("/a"), "A", "alpha", vec![1.0, 0.0]),
		Document::new(scout_testkit::endpoint("/b"), "B", "beta", vec![0.0, 1.0]),
	])
	.expect("Failed to build store.");
	let providers = Providers::new(embedding, Arc::new(ScriptedCompletion::new()));

	Browser::new(Arc::new(SearchEngine::new(&cfg, Arc::new(store), providers)), max_concurrency)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_searches_stay_within_the_bound() {
	let embedding = Arc::new(
		TableEmbedding::new(2)
			.with_fallback(vec![1.0, 0.0])
			.with_delay(Duration::from_millis(10)),
	);
	let browser = browser(embedding.clone(), 3);
	let cancel = CancellationToken::new();
	let tasks = (0..16)
		.map(|i| {
			let browser = browser.clone();
			let cancel = cancel.clone();

			tokio::spawn(async move {
				browser.search(&format!("query {i}"), SearchOptions::default(), &cancel).await
			})
		})
		.collect::<Vec<_>>();

	for task in futures::future::join_all(tasks).await {
		let results = task.expect("Task panicked.").expect("Search failed.");

		assert_eq!(results.len(), 2);
	}

	assert_eq!(embedding.calls(), 16);
	assert!(browser.limiter().peak() <= 3);
	assert!(embedding.peak_in_flight() <= 3);
	assert_eq!(browser.limiter().in_flight(), 0);
}

#[tokio::test]
async fn queued_search_observes_cancellation() {
	let embedding = Arc::new(
		TableEmbedding::new(2)
			.with_fallback(vec![1.0, 0.0])
			.with_delay(Duration::from_secs(30)),
	);
	let browser = browser(embedding.clone(), 1);
	let cancel = CancellationToken::new();
	let busy = {
		let browser = browser.clone();
		let cancel = cancel.clone();

		tokio::spawn(async move { browser.search("first", SearchOptions::default(), &cancel).await })
	};

	tokio::time::sleep(Duration::from_millis(20)).await;

	let queued = {
		let browser = browser.clone();
		let cancel = cancel.clone();

		tokio::spawn(async move { browser.search("second", SearchOptions::default(), &cancel).await })
	};

	tokio::time::sleep(Duration::from_millis(20)).await;
	cancel.cancel();

	let busy_err = busy.await.expect("Task panicked.").expect_err("Expected cancellation.");
	let queued_err = queued.await.expect("Task panicked.").expect_err("Expected cancellation.");

	assert!(busy_err.is_cancelled());
	assert!(queued_err.is_cancelled());
	assert_eq!(embedding.calls(), 1);
}

#[tokio::test]
async fn opens_documents_by_id() {
	let browser = browser(Arc::new(TableEmbedding::new(2)), 2);
	let id = browser.engine().store().documents()[1].id;

	assert_eq!(browser.open(&id).map(|doc| doc.title.as_str()), Some("B"));
}
