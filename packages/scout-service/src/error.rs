use std::fmt;

use crate::indexer::IndexFailure;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Loop phase that produced an unrecoverable agent failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentPhase {
	Decide,
	Conclude,
}

impl fmt::Display for AgentPhase {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let label = match self {
			Self::Decide => "decide",
			Self::Conclude => "conclude",
		};

		f.write_str(label)
	}
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Embedding error: {message}")]
	Embedding { message: String },
	#[error("Completion error: {message}")]
	Completion { message: String },
	#[error("Fetch error: {message}")]
	Fetch { message: String },
	#[error("Embedding dimension mismatch: expected {expected}, got {actual}.")]
	DimensionMismatch { expected: usize, actual: usize },
	#[error("Operation cancelled.")]
	Cancelled,
	#[error("Agent used all {steps} steps without concluding.")]
	StepBudgetExceeded { steps: u32 },
	#[error("Agent {phase} step failed: {message}")]
	Agent { phase: AgentPhase, message: String },
	#[error("Indexing produced no documents; {} inputs failed.", .failures.len())]
	IndexFailed { failures: Vec<IndexFailure> },
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error(transparent)]
	Storage(#[from] scout_storage::Error),
}
impl Error {
	pub fn is_cancelled(&self) -> bool {
		matches!(self, Self::Cancelled)
	}

	pub(crate) fn embedding(err: scout_providers::Error) -> Self {
		Self::Embedding { message: err.to_string() }
	}

	pub(crate) fn completion(err: scout_providers::Error) -> Self {
		Self::Completion { message: err.to_string() }
	}
}
