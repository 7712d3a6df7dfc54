//! Turns raw endpoint content into embedded documents.

use std::{collections::HashMap, sync::Arc};

use tokio_util::sync::CancellationToken;

use scout_config::{Config, EmbeddingProviderConfig};
use scout_domain::{Document, DocumentId, Endpoint, projection};
use scout_storage::DocumentStore;

use crate::{BoxFuture, EmbeddingProvider, Error, Limiter, Result};

/// Retrieves the raw content behind an endpoint.
pub trait EndpointFetcher
where
	Self: Send + Sync,
{
	fn fetch<'a>(&'a self, endpoint: &'a Endpoint) -> BoxFuture<'a, Result<FetchedPage>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
	pub title: String,
	pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexInput {
	pub endpoint: Endpoint,
	pub title: String,
	pub raw_content: String,
}
impl IndexInput {
	pub fn new(endpoint: Endpoint, title: impl Into<String>, raw_content: impl Into<String>) -> Self {
		Self { endpoint, title: title.into(), raw_content: raw_content.into() }
	}
}

#[derive(Debug)]
pub struct IndexFailure {
	pub endpoint: Endpoint,
	pub error: Error,
}

/// Outcome of one indexing batch. Documents keep the order of their inputs.
#[derive(Debug, Default)]
pub struct IndexReport {
	pub documents: Vec<Document>,
	pub failures: Vec<IndexFailure>,
}
impl IndexReport {
	pub fn is_partial(&self) -> bool {
		!self.failures.is_empty()
	}

	/// Accepts a partial report with a warning. Fails only when nothing was
	/// indexed and something failed.
	pub fn into_result(self) -> Result<Vec<Document>> {
		if self.documents.is_empty() && !self.failures.is_empty() {
			return Err(Error::IndexFailed { failures: self.failures });
		}
		if self.is_partial() {
			tracing::warn!(
				indexed = self.documents.len(),
				failed = self.failures.len(),
				"Index is partial."
			);
		}

		Ok(self.documents)
	}

	pub fn into_store(self) -> Result<DocumentStore> {
		Ok(DocumentStore::from_documents(self.into_result()?)?)
	}
}

pub struct Indexer {
	cfg: EmbeddingProviderConfig,
	embedding: Arc<dyn EmbeddingProvider>,
	limiter: Limiter,
	max_input_chars: usize,
}
impl Indexer {
	pub fn new(cfg: &Config, embedding: Arc<dyn EmbeddingProvider>) -> Self {
		Self {
			cfg: cfg.providers.embedding.clone(),
			embedding,
			limiter: Limiter::new(cfg.indexer.concurrency as usize),
			max_input_chars: cfg.indexer.max_input_chars as usize,
		}
	}

	pub fn with_concurrency(mut self, concurrency: usize) -> Self {
		self.limiter = Limiter::new(concurrency);

		self
	}

	pub fn limiter(&self) -> &Limiter {
		&self.limiter
	}

	/// Embeds every input with at most `indexer.concurrency` requests in
	/// flight.
	///
	/// Individual failures are collected in the report. The batch only fails
	/// when nothing was indexed and at least one input failed, or when
	/// `cancel` fires.
	pub async fn index(
		&self,
		inputs: Vec<IndexInput>,
		cancel: &CancellationToken,
	) -> Result<IndexReport> {
		let tasks = inputs.into_iter().map(|input| async move {
			let outcome = self.limiter.run(cancel, self.embed_input(&input)).await;

			(input.endpoint, outcome)
		});
		let outcomes = futures::future::join_all(tasks).await;

		self.collect(outcomes, cancel)
	}

	/// Fetches and embeds each endpoint. Fetch failures are per-endpoint
	/// failures.
	pub async fn index_endpoints(
		&self,
		fetcher: &dyn EndpointFetcher,
		endpoints: Vec<Endpoint>,
		cancel: &CancellationToken,
	) -> Result<IndexReport> {
		let tasks = endpoints.into_iter().map(|endpoint| async move {
			let outcome = self
				.limiter
				.run(cancel, async {
					let page = fetcher.fetch(&endpoint).await?;
					let input = IndexInput::new(endpoint.clone(), page.title, page.content);

					self.embed_input(&input).await
				})
				.await;

			(endpoint, outcome)
		});
		let outcomes = futures::future::join_all(tasks).await;

		self.collect(outcomes, cancel)
	}

	async fn embed_input(&self, input: &IndexInput) -> Result<Document> {
		let text =
			projection::embedding_text(&input.title, &input.raw_content, self.max_input_chars);

		if text.trim().is_empty() {
			return Err(Error::InvalidRequest {
				message: "Endpoint has no indexable content.".to_string(),
			});
		}

		let texts = [text];
		let vector = self
			.embedding
			.embed(&self.cfg, &texts)
			.await
			.map_err(Error::embedding)?
			.into_iter()
			.next()
			.ok_or_else(|| Error::Embedding {
				message: "Embedding provider returned no vectors.".to_string(),
			})?;
		let expected = self.cfg.dimensions as usize;

		if vector.len() != expected {
			return Err(Error::DimensionMismatch { expected, actual: vector.len() });
		}

		tracing::debug!(endpoint = %input.endpoint, dimension = vector.len(), "Embedded endpoint.");

		Ok(Document::new(
			input.endpoint.clone(),
			input.title.clone(),
			input.raw_content.clone(),
			vector,
		))
	}

	fn collect(
		&self,
		outcomes: Vec<(Endpoint, Result<Document>)>,
		cancel: &CancellationToken,
	) -> Result<IndexReport> {
		let cancelled = cancel.is_cancelled()
			|| outcomes.iter().any(|(_, outcome)| matches!(outcome, Err(Error::Cancelled)));

		if cancelled {
			return Err(Error::Cancelled);
		}

		let total = outcomes.len();
		let mut report = IndexReport::default();
		let mut positions = HashMap::<DocumentId, usize>::new();

		for (endpoint, outcome) in outcomes {
			match outcome {
				Ok(doc) => match positions.get(&doc.id) {
					Some(&pos) => report.documents[pos] = doc,
					None => {
						positions.insert(doc.id, report.documents.len());
						report.documents.push(doc);
					},
				},
				Err(error) => {
					tracing::warn!(endpoint = %endpoint, error = %error, "Failed to index endpoint.");

					report.failures.push(IndexFailure { endpoint, error });
				},
			}
		}

		// A duplicate endpoint that indexed once is not reported as failed.
		report.failures.retain(|failure| {
			!positions.contains_key(&DocumentId::for_endpoint(&failure.endpoint))
		});

		if report.documents.is_empty() && !report.failures.is_empty() {
			return Err(Error::IndexFailed { failures: report.failures });
		}

		tracing::info!(
			indexed = report.documents.len(),
			failed = report.failures.len(),
			total,
			"Indexing finished."
		);

		Ok(report)
	}
}
