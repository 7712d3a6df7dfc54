use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

pub const DEFAULT_INDEX_PATH: &str = "index.json";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub providers: Providers,
	#[serde(default)]
	pub indexer: Indexer,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub browser: Browser,
	#[serde(default)]
	pub agent: Agent,
	#[serde(default)]
	pub storage: Storage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub llm: LlmProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Indexer {
	/// Upper bound on embedding requests in flight for one batch.
	pub concurrency: u32,
	/// Embedding input is truncated to this many characters.
	pub max_input_chars: u32,
	pub fetch_timeout_ms: u64,
}
impl Default for Indexer {
	fn default() -> Self {
		Self { concurrency: 8, max_input_chars: 8_000, fetch_timeout_ms: 30_000 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Search {
	pub max_num_results: i64,
	pub verify: bool,
	pub verify_concurrency: u32,
	pub verify_failure_policy: VerifyFailurePolicy,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			max_num_results: 5,
			verify: false,
			verify_concurrency: 4,
			verify_failure_policy: VerifyFailurePolicy::FailOpen,
		}
	}
}

/// What happens to a candidate whose relevance judgment could not be obtained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyFailurePolicy {
	/// Keep the candidate with its original score.
	#[default]
	FailOpen,
	/// Drop the candidate.
	FailClosed,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Browser {
	pub max_concurrency: u32,
}
impl Default for Browser {
	fn default() -> Self {
		Self { max_concurrency: 4 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Agent {
	pub max_steps: u32,
	/// Retries per Decide, Search and Conclude step before the loop fails.
	pub max_retries: u32,
}
impl Default for Agent {
	fn default() -> Self {
		Self { max_steps: 6, max_retries: 2 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Storage {
	pub index_path: PathBuf,
	pub summary_chars: u32,
}
impl Default for Storage {
	fn default() -> Self {
		Self { index_path: PathBuf::from(DEFAULT_INDEX_PATH), summary_chars: 2_000 }
	}
}
