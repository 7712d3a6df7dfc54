//! Decide, search and conclude loop driven by the completion model.

mod prompt;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use scout_config::{Config, LlmProviderConfig};
use scout_providers::{ChatMessage, completion};

use crate::{AgentPhase, Browser, CompletionProvider, Error, Result, SearchOptions, SearchResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentOptions {
	/// Decide steps allowed before the loop gives up.
	pub max_steps: u32,
	/// Extra attempts for each failed Decide, Search or Conclude call.
	pub max_retries: u32,
	pub search: SearchOptions,
}
impl AgentOptions {
	pub fn from_config(cfg: &Config) -> Self {
		Self {
			max_steps: cfg.agent.max_steps,
			max_retries: cfg.agent.max_retries,
			search: SearchOptions::from_config(&cfg.search),
		}
	}
}

/// What the model chose to do next.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Decision {
	Search {
		query: String,
	},
	Conclude {
		#[serde(default)]
		directive: String,
	},
}
impl Decision {
	/// Parses model output, tolerating prose and code fences around the JSON
	/// object.
	pub fn parse(content: &str) -> Result<Self> {
		let value = completion::json_from_content(content).map_err(Error::completion)?;
		let decision: Self = serde_json::from_value(value).map_err(|err| Error::Completion {
			message: format!("Agent decision has an unexpected shape: {err}."),
		})?;

		match decision {
			Self::Search { query } if query.trim().is_empty() => Err(Error::Completion {
				message: "Agent search decision has an empty query.".to_string(),
			}),
			Self::Search { query } => Ok(Self::Search { query: query.trim().to_string() }),
			conclude => Ok(conclude),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Observation {
	Search { query: String, results: Vec<SearchResult> },
	SearchFailed { query: String, error: String },
}

/// Working memory of one solve call. Owned by that call alone.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentState {
	pub query: String,
	pub steps: u32,
	pub observations: Vec<Observation>,
	pub finished: bool,
}
impl AgentState {
	pub fn new(query: impl Into<String>) -> Self {
		Self { query: query.into(), steps: 0, observations: Vec::new(), finished: false }
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
	pub text: String,
	pub steps: u32,
	pub observations: Vec<Observation>,
}

pub struct Agent {
	browser: Browser,
	completion: Arc<dyn CompletionProvider>,
	llm_cfg: LlmProviderConfig,
	options: AgentOptions,
}
impl Agent {
	pub fn new(cfg: &Config, browser: Browser, completion: Arc<dyn CompletionProvider>) -> Self {
		Self {
			browser,
			completion,
			llm_cfg: cfg.providers.llm.clone(),
			options: AgentOptions::from_config(cfg),
		}
	}

	pub fn with_options(mut self, options: AgentOptions) -> Self {
		self.options = options;

		self
	}

	pub fn options(&self) -> AgentOptions {
		self.options
	}

	pub fn browser(&self) -> &Browser {
		&self.browser
	}

	/// Runs the loop until the model concludes, the step budget runs out, or
	/// `cancel` fires.
	///
	/// Every call builds its own [`AgentState`], so concurrent solves on one
	/// agent never share observations.
	pub async fn solve(&self, query: &str, cancel: &CancellationToken) -> Result<Answer> {
		if query.trim().is_empty() {
			return Err(Error::InvalidRequest { message: "Query must be non-empty.".to_string() });
		}

		let mut state = AgentState::new(query.trim());

		loop {
			if cancel.is_cancelled() {
				return Err(Error::Cancelled);
			}
			if state.steps >= self.options.max_steps {
				tracing::warn!(
					query = %state.query,
					steps = state.steps,
					"Agent reached its step budget without concluding."
				);

				return Err(Error::StepBudgetExceeded { steps: state.steps });
			}

			let decision = self.decide(&state, cancel).await?;

			state.steps += 1;

			match decision {
				Decision::Search { query } => {
					let observation = self.search(query, cancel).await?;

					state.observations.push(observation);
				},
				Decision::Conclude { directive } => {
					state.finished = true;

					let text = self.conclude(&state, &directive, cancel).await?;

					tracing::info!(
						query = %state.query,
						steps = state.steps,
						observations = state.observations.len(),
						"Agent concluded."
					);

					return Ok(Answer { text, steps: state.steps, observations: state.observations });
				},
			}
		}
	}

	async fn decide(&self, state: &AgentState, cancel: &CancellationToken) -> Result<Decision> {
		let messages = prompt::decide_messages(state, &self.browser, self.options.max_steps);
		let mut last_error = None;

		for attempt in 0..=self.options.max_retries {
			let outcome = match self.complete(&messages, cancel).await {
				Ok(content) => Decision::parse(&content),
				Err(err) => Err(err),
			};

			match outcome {
				Ok(decision) => {
					tracing::debug!(step = state.steps + 1, ?decision, "Agent decided.");

					return Ok(decision);
				},
				Err(Error::Cancelled) => return Err(Error::Cancelled),
				Err(err) => {
					tracing::warn!(attempt, error = %err, "Agent decide attempt failed.");

					last_error = Some(err);
				},
			}
		}

		Err(Error::Agent { phase: AgentPhase::Decide, message: describe(last_error) })
	}

	async fn search(&self, query: String, cancel: &CancellationToken) -> Result<Observation> {
		let mut last_error = None;

		for attempt in 0..=self.options.max_retries {
			match self.browser.search(&query, self.options.search, cancel).await {
				Ok(results) => return Ok(Observation::Search { query, results }),
				Err(Error::Cancelled) => return Err(Error::Cancelled),
				Err(err @ Error::DimensionMismatch { .. }) => return Err(err),
				Err(err) => {
					tracing::warn!(
						attempt,
						query = %query,
						error = %err,
						"Agent search attempt failed."
					);

					last_error = Some(err);
				},
			}
		}

		Ok(Observation::SearchFailed { query, error: describe(last_error) })
	}

	async fn conclude(
		&self,
		state: &AgentState,
		directive: &str,
		cancel: &CancellationToken,
	) -> Result<String> {
		let messages = prompt::conclude_messages(state, directive, &self.browser);
		let mut last_error = None;

		for attempt in 0..=self.options.max_retries {
			match self.complete(&messages, cancel).await {
				Ok(text) => return Ok(text.trim().to_string()),
				Err(Error::Cancelled) => return Err(Error::Cancelled),
				Err(err) => {
					tracing::warn!(attempt, error = %err, "Agent conclude attempt failed.");

					last_error = Some(err);
				},
			}
		}

		Err(Error::Agent { phase: AgentPhase::Conclude, message: describe(last_error) })
	}

	async fn complete(
		&self,
		messages: &[ChatMessage],
		cancel: &CancellationToken,
	) -> Result<String> {
		tokio::select! {
			biased;
			_ = cancel.cancelled() => Err(Error::Cancelled),
			res = self.completion.complete(&self.llm_cfg, messages) => res.map_err(Error::completion),
		}
	}
}

fn describe(err: Option<Error>) -> String {
	err.map(|err| err.to_string()).unwrap_or_else(|| "No attempts were made.".to_string())
}
