use std::fmt::Write as _;

use scout_domain::projection;
use scout_providers::ChatMessage;

use crate::{AgentState, Browser, Observation};

const SNIPPET_CHARS: usize = 300;
const DECIDE_SYSTEM_PROMPT: &str = "You answer questions about an HTTP API by searching an index of its endpoints.
Each turn, reply with exactly one JSON object and nothing else:
- {\"action\": \"search\", \"query\": \"<what to look for>\"} to search the index.
- {\"action\": \"conclude\", \"directive\": \"<how the answer should be written>\"} once the observations are enough to answer.
Do not repeat a search that already has observations.";
const CONCLUDE_SYSTEM_PROMPT: &str = "You answer questions about an HTTP API. Use only the observations provided. \
Name the endpoints you rely on. If the observations do not answer the question, say what is missing.";

pub(crate) fn decide_messages(
	state: &AgentState,
	browser: &Browser,
	max_steps: u32,
) -> Vec<ChatMessage> {
	let mut user = format!("Question: {}\n\n", state.query);

	render_observations(&mut user, &state.observations, browser);

	let _ = write!(user, "\nSteps used: {} of {max_steps}.", state.steps);

	vec![ChatMessage::system(DECIDE_SYSTEM_PROMPT), ChatMessage::user(user)]
}

pub(crate) fn conclude_messages(
	state: &AgentState,
	directive: &str,
	browser: &Browser,
) -> Vec<ChatMessage> {
	let mut user = format!("Question: {}\n\n", state.query);

	render_observations(&mut user, &state.observations, browser);

	if !directive.trim().is_empty() {
		let _ = write!(user, "\nInstructions: {}", directive.trim());
	}

	vec![ChatMessage::system(CONCLUDE_SYSTEM_PROMPT), ChatMessage::user(user)]
}

fn render_observations(out: &mut String, observations: &[Observation], browser: &Browser) {
	if observations.is_empty() {
		out.push_str("Observations: none yet.\n");

		return;
	}

	out.push_str("Observations:\n");

	for (idx, observation) in observations.iter().enumerate() {
		match observation {
			Observation::Search { query, results } if results.is_empty() => {
				let _ = writeln!(out, "[{}] search {query:?}: no matching endpoints.", idx + 1);
			},
			Observation::Search { query, results } => {
				let _ = writeln!(out, "[{}] search {query:?}:", idx + 1);

				for result in results {
					let Some(doc) = browser.open(&result.document_id) else {
						continue;
					};
					let snippet = projection::truncate_chars(
						&projection::project_content(&doc.source_content),
						SNIPPET_CHARS,
					);

					let _ = writeln!(
						out,
						"  - {} ({}) score={:.3}: {}",
						doc.title,
						doc.source_endpoint,
						result.score,
						snippet.replace('\n', "; ")
					);
				}
			},
			Observation::SearchFailed { query, error } => {
				let _ = writeln!(out, "[{}] search {query:?} failed: {error}", idx + 1);
			},
		}
	}
}
