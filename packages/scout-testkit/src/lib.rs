//! Deterministic providers and fixtures for exercising Scout without network
//! access.

mod stubs;

pub use stubs::{FailingEmbedding, ScriptedCompletion, StaticFetcher, TableEmbedding};

use std::path::PathBuf;

use serde_json::Map;

use scout_config::{
	Agent, Browser, Config, EmbeddingProviderConfig, Indexer, LlmProviderConfig, Providers,
	Search, Service, Storage, VerifyFailurePolicy,
};
use scout_domain::Endpoint;

pub fn test_config(dimensions: u32) -> Config {
	Config {
		service: Service { log_level: "info".to_string() },
		providers: Providers {
			embedding: dummy_embedding_provider(dimensions),
			llm: dummy_llm_provider(),
		},
		indexer: Indexer { concurrency: 4, max_input_chars: 8_000, fetch_timeout_ms: 1_000 },
		search: Search {
			max_num_results: 5,
			verify: false,
			verify_concurrency: 4,
			verify_failure_policy: VerifyFailurePolicy::FailOpen,
		},
		browser: Browser { max_concurrency: 4 },
		agent: Agent { max_steps: 6, max_retries: 2 },
		storage: Storage { index_path: PathBuf::from("index.json"), summary_chars: 2_000 },
	}
}

pub fn dummy_embedding_provider(dimensions: u32) -> EmbeddingProviderConfig {
	EmbeddingProviderConfig {
		provider_id: "test".to_string(),
		api_base: "http://127.0.0.1:1".to_string(),
		api_key: "test-key".to_string(),
		path: "/embeddings".to_string(),
		model: "test".to_string(),
		dimensions,
		timeout_ms: 1_000,
		default_headers: Map::new(),
	}
}

pub fn dummy_llm_provider() -> LlmProviderConfig {
	LlmProviderConfig {
		provider_id: "test".to_string(),
		api_base: "http://127.0.0.1:1".to_string(),
		api_key: "test-key".to_string(),
		path: "/chat/completions".to_string(),
		model: "test".to_string(),
		temperature: 0.0,
		timeout_ms: 1_000,
		default_headers: Map::new(),
	}
}

/// Parses `https://api.example.com{path}`; panics on malformed test input.
pub fn endpoint(path: &str) -> Endpoint {
	Endpoint::parse(&format!("https://api.example.com{path}"))
		.unwrap_or_else(|err| panic!("Invalid test endpoint {path}: {err}"))
}
