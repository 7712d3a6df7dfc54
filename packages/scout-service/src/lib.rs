pub mod agent;
pub mod browser;
pub mod indexer;
pub mod limiter;
pub mod search;

mod error;

use std::{future::Future, pin::Pin, sync::Arc};

pub use agent::{Agent, AgentOptions, AgentState, Answer, Decision, Observation};
pub use browser::Browser;
pub use error::{AgentPhase, Error, Result};
pub use indexer::{EndpointFetcher, FetchedPage, IndexFailure, IndexInput, IndexReport, Indexer};
pub use limiter::{Limiter, LimiterPermit};
pub use search::{Query, SearchEngine, SearchOptions, SearchResult, Verdict, VerdictStatus};

use scout_config::{Config, EmbeddingProviderConfig, LlmProviderConfig};
use scout_providers::{ChatMessage, completion, embedding};
use scout_storage::DocumentStore;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, scout_providers::Result<Vec<Vec<f32>>>>;
}

pub trait CompletionProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [ChatMessage],
	) -> BoxFuture<'a, scout_providers::Result<String>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub completion: Arc<dyn CompletionProvider>,
}
impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		completion: Arc<dyn CompletionProvider>,
	) -> Self {
		Self { embedding, completion }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), completion: provider }
	}
}

/// Wires configuration and providers into the indexing, search and agent
/// components.
pub struct ScoutService {
	pub cfg: Config,
	pub providers: Providers,
}
impl ScoutService {
	pub fn new(cfg: Config) -> Self {
		Self { cfg, providers: Providers::default() }
	}

	pub fn with_providers(cfg: Config, providers: Providers) -> Self {
		Self { cfg, providers }
	}

	pub fn indexer(&self) -> Indexer {
		Indexer::new(&self.cfg, self.providers.embedding.clone())
	}

	pub fn search_engine(&self, store: DocumentStore) -> SearchEngine {
		SearchEngine::new(&self.cfg, Arc::new(store), self.providers.clone())
	}

	pub fn browser(&self, store: DocumentStore) -> Browser {
		Browser::new(Arc::new(self.search_engine(store)), self.cfg.browser.max_concurrency as usize)
	}

	pub fn agent(&self, browser: Browser) -> Agent {
		Agent::new(&self.cfg, browser, self.providers.completion.clone())
	}
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, scout_providers::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}

impl CompletionProvider for DefaultProviders {
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [ChatMessage],
	) -> BoxFuture<'a, scout_providers::Result<String>> {
		Box::pin(completion::complete(cfg, messages))
	}
}
