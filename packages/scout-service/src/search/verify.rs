//! Model-judged relevance filtering for ranked candidates.

use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use scout_config::VerifyFailurePolicy;
use scout_domain::{Document, projection};
use scout_providers::{ChatMessage, completion};

use crate::{
	Error, Result,
	search::{SearchEngine, SearchResult, Verdict, VerdictStatus},
};

const JUDGE_CONTENT_CHARS: usize = 4_000;
const JUDGE_SYSTEM_PROMPT: &str = "You decide whether an API endpoint document can answer a user's query. \
Reply with a single JSON object: {\"relevant\": true or false, \"rationale\": \"one short sentence\"}.";

#[derive(Debug, Deserialize)]
struct Judgment {
	relevant: bool,
	#[serde(default)]
	rationale: String,
}

pub(crate) async fn verify_candidates(
	engine: &SearchEngine,
	query: &str,
	candidates: Vec<(SearchResult, &Document)>,
	cancel: &CancellationToken,
) -> Result<Vec<SearchResult>> {
	let tasks = candidates.into_iter().map(|(candidate, doc)| async move {
		let outcome = engine.verify_limiter.run(cancel, judge(engine, query, doc)).await;

		(candidate, outcome)
	});
	let outcomes = futures::future::join_all(tasks).await;
	let mut kept = Vec::with_capacity(outcomes.len());

	for (mut candidate, outcome) in outcomes {
		match outcome {
			Ok(judgment) if judgment.relevant => {
				candidate.verdict =
					Some(Verdict { status: VerdictStatus::Relevant, rationale: judgment.rationale });

				kept.push(candidate);
			},
			Ok(judgment) => {
				tracing::debug!(
					document_id = %candidate.document_id,
					rationale = %judgment.rationale,
					"Dropped candidate judged irrelevant."
				);
			},
			Err(Error::Cancelled) => return Err(Error::Cancelled),
			Err(err) => match engine.failure_policy {
				VerifyFailurePolicy::FailOpen => {
					tracing::warn!(
						document_id = %candidate.document_id,
						error = %err,
						"Relevance check failed. Keeping candidate."
					);

					candidate.verdict =
						Some(Verdict { status: VerdictStatus::FailOpen, rationale: err.to_string() });

					kept.push(candidate);
				},
				VerifyFailurePolicy::FailClosed => {
					tracing::warn!(
						document_id = %candidate.document_id,
						error = %err,
						"Relevance check failed. Dropping candidate."
					);
				},
			},
		}
	}

	Ok(kept)
}

async fn judge(engine: &SearchEngine, query: &str, doc: &Document) -> Result<Judgment> {
	let messages = judge_messages(query, doc);
	let content = engine
		.providers
		.completion
		.complete(&engine.llm_cfg, &messages)
		.await
		.map_err(Error::completion)?;

	parse_judgment(&content)
}

fn judge_messages(query: &str, doc: &Document) -> Vec<ChatMessage> {
	let content = projection::truncate_chars(
		&projection::project_content(&doc.source_content),
		JUDGE_CONTENT_CHARS,
	);
	let user = format!(
		"Query: {query}\n\nEndpoint: {}\nTitle: {}\nContent:\n{content}",
		doc.source_endpoint, doc.title
	);

	vec![ChatMessage::system(JUDGE_SYSTEM_PROMPT), ChatMessage::user(user)]
}

fn parse_judgment(content: &str) -> Result<Judgment> {
	let value = completion::json_from_content(content).map_err(Error::completion)?;

	serde_json::from_value(value).map_err(|err| Error::Completion {
		message: format!("Relevance judgment has an unexpected shape: {err}."),
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_fenced_judgment() {
		let content = "```json\n{\"relevant\": true, \"rationale\": \"Lists pets.\"}\n```";
		let judgment = parse_judgment(content).expect("Failed to parse judgment.");

		assert!(judgment.relevant);
		assert_eq!(judgment.rationale, "Lists pets.");
	}

	#[test]
	fn rationale_is_optional() {
		let judgment = parse_judgment("{\"relevant\": false}").expect("Failed to parse judgment.");

		assert!(!judgment.relevant);
		assert!(judgment.rationale.is_empty());
	}

	#[test]
	fn missing_verdict_is_an_error() {
		let err = parse_judgment("{\"rationale\": \"unsure\"}").expect_err("Expected shape error.");

		assert!(matches!(err, Error::Completion { .. }));
	}
}
