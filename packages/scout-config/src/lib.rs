mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Agent, Browser, Config, DEFAULT_INDEX_PATH, EmbeddingProviderConfig, Indexer,
	LlmProviderConfig, Providers, Search, Service, Storage, VerifyFailurePolicy,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	parse(path, &raw)
}

pub fn parse(path: &Path, raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if !cfg.providers.llm.temperature.is_finite() {
		return Err(Error::Validation {
			message: "providers.llm.temperature must be a finite number.".to_string(),
		});
	}
	if cfg.providers.llm.temperature < 0.0 {
		return Err(Error::Validation {
			message: "providers.llm.temperature must be zero or greater.".to_string(),
		});
	}

	for (label, timeout_ms) in [
		("embedding", cfg.providers.embedding.timeout_ms),
		("llm", cfg.providers.llm.timeout_ms),
	] {
		if timeout_ms == 0 {
			return Err(Error::Validation {
				message: format!("Provider {label} timeout_ms must be greater than zero."),
			});
		}
	}
	for (label, key) in
		[("embedding", &cfg.providers.embedding.api_key), ("llm", &cfg.providers.llm.api_key)]
	{
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}
	for (label, value) in [
		("indexer.concurrency", cfg.indexer.concurrency),
		("indexer.max_input_chars", cfg.indexer.max_input_chars),
		("search.verify_concurrency", cfg.search.verify_concurrency),
		("browser.max_concurrency", cfg.browser.max_concurrency),
		("agent.max_steps", cfg.agent.max_steps),
	] {
		if value == 0 {
			return Err(Error::Validation { message: format!("{label} must be greater than zero.") });
		}
	}
	if cfg.indexer.fetch_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "indexer.fetch_timeout_ms must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.storage.index_path.as_os_str().is_empty() {
		cfg.storage.index_path = DEFAULT_INDEX_PATH.into();
	}

	let level = cfg.service.log_level.trim().to_string();

	cfg.service.log_level = level;
}
