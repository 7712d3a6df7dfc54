use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use scout_domain::{Document, DocumentId};

use crate::{Limiter, Result, SearchEngine, SearchOptions, SearchResult};

/// Shared handle that runs searches for the agent under a concurrency cap.
///
/// Clones share the engine and the cap, so concurrent agent steps never put
/// more than `browser.max_concurrency` searches in flight.
#[derive(Clone)]
pub struct Browser {
	engine: Arc<SearchEngine>,
	limiter: Limiter,
}
impl Browser {
	pub fn new(engine: Arc<SearchEngine>, max_concurrency: usize) -> Self {
		Self { engine, limiter: Limiter::new(max_concurrency) }
	}

	pub fn engine(&self) -> &SearchEngine {
		&self.engine
	}

	pub fn limiter(&self) -> &Limiter {
		&self.limiter
	}

	pub async fn search(
		&self,
		query: &str,
		options: SearchOptions,
		cancel: &CancellationToken,
	) -> Result<Vec<SearchResult>> {
		tracing::debug!(query, in_flight = self.limiter.in_flight(), "Browser search requested.");

		self.limiter.run(cancel, self.engine.search(query, options, cancel)).await
	}

	/// Opens an indexed document by id.
	pub fn open(&self, id: &DocumentId) -> Option<&Document> {
		self.engine.document(id)
	}
}
