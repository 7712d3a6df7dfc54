pub mod ranking;

mod verify;

use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use scout_config::{Config, EmbeddingProviderConfig, LlmProviderConfig, VerifyFailurePolicy};
use scout_domain::{Document, DocumentId};
use scout_storage::DocumentStore;

use crate::{Error, Limiter, Providers, Result};

/// Per-call search knobs. Defaults come from the `[search]` config section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
	pub max_num_results: i64,
	pub verify: bool,
}
impl SearchOptions {
	pub fn from_config(cfg: &scout_config::Search) -> Self {
		Self { max_num_results: cfg.max_num_results, verify: cfg.verify }
	}

	pub fn with_max_num_results(mut self, max_num_results: i64) -> Self {
		self.max_num_results = max_num_results;

		self
	}

	pub fn with_verify(mut self, verify: bool) -> Self {
		self.verify = verify;

		self
	}
}

impl Default for SearchOptions {
	fn default() -> Self {
		Self::from_config(&scout_config::Search::default())
	}
}

/// A query with its embedding, produced once per search.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
	pub text: String,
	pub embedding: Vec<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
	Relevant,
	/// The judgment could not be obtained and the candidate was kept anyway.
	FailOpen,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
	pub status: VerdictStatus,
	pub rationale: String,
}

/// A ranked hit. Refers to its document by id; the store owns the document.
/// `title` is copied for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
	pub document_id: DocumentId,
	pub title: String,
	pub score: f32,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub verdict: Option<Verdict>,
}

/// Read-only semantic search over a document store.
pub struct SearchEngine {
	store: Arc<DocumentStore>,
	providers: Providers,
	embedding_cfg: EmbeddingProviderConfig,
	llm_cfg: LlmProviderConfig,
	defaults: SearchOptions,
	verify_limiter: Limiter,
	failure_policy: VerifyFailurePolicy,
}
impl SearchEngine {
	pub fn new(cfg: &Config, store: Arc<DocumentStore>, providers: Providers) -> Self {
		Self {
			store,
			providers,
			embedding_cfg: cfg.providers.embedding.clone(),
			llm_cfg: cfg.providers.llm.clone(),
			defaults: SearchOptions::from_config(&cfg.search),
			verify_limiter: Limiter::new(cfg.search.verify_concurrency as usize),
			failure_policy: cfg.search.verify_failure_policy,
		}
	}

	pub fn store(&self) -> &DocumentStore {
		&self.store
	}

	pub fn document(&self, id: &DocumentId) -> Option<&Document> {
		self.store.get(id)
	}

	pub fn default_options(&self) -> SearchOptions {
		self.defaults
	}

	pub fn verify_limiter(&self) -> &Limiter {
		&self.verify_limiter
	}

	/// Ranks the store against `query` and returns at most
	/// `options.max_num_results` hits, best first.
	///
	/// A non-positive limit or an empty store returns no hits without calling
	/// any provider. With `verify`, the top hits are judged by the completion
	/// model and irrelevant ones are removed. Removed hits are not replaced.
	pub async fn search(
		&self,
		query: &str,
		options: SearchOptions,
		cancel: &CancellationToken,
	) -> Result<Vec<SearchResult>> {
		if options.max_num_results <= 0 || self.store.is_empty() {
			return Ok(Vec::new());
		}
		if cancel.is_cancelled() {
			return Err(Error::Cancelled);
		}

		let query = self.embed_query(query, cancel).await?;
		let ranked = ranking::rank(self.store.documents(), &query.embedding)?;
		let limit = usize::try_from(options.max_num_results).unwrap_or(usize::MAX);
		let top = ranked
			.into_iter()
			.take(limit)
			.map(|r| {
				let doc = &self.store.documents()[r.position];

				let result = SearchResult {
					document_id: doc.id,
					title: doc.title.clone(),
					score: r.score,
					verdict: None,
				};

				(result, doc)
			})
			.collect::<Vec<_>>();
		let results = if options.verify {
			verify::verify_candidates(self, &query.text, top, cancel).await?
		} else {
			top.into_iter().map(|(result, _)| result).collect()
		};

		tracing::debug!(
			query = %query.text,
			returned = results.len(),
			verify = options.verify,
			"Search finished."
		);

		Ok(results)
	}

	pub async fn embed_query(&self, text: &str, cancel: &CancellationToken) -> Result<Query> {
		let texts = [text.to_string()];
		let vectors = tokio::select! {
			biased;
			_ = cancel.cancelled() => return Err(Error::Cancelled),
			res = self.providers.embedding.embed(&self.embedding_cfg, &texts) => {
				res.map_err(Error::embedding)?
			},
		};
		let embedding = vectors.into_iter().next().ok_or_else(|| Error::Embedding {
			message: "Embedding provider returned no vectors.".to_string(),
		})?;

		if let Some(expected) = self.store.dimension()
			&& expected != embedding.len()
		{
			return Err(Error::DimensionMismatch { expected, actual: embedding.len() });
		}

		let [text] = texts;

		Ok(Query { text, embedding })
	}
}
