//! Text projections of raw endpoint payloads.
//!
//! Structured payloads (OpenAPI documents, JSON responses) are flattened into
//! `path: value` lines so the embedding model sees field names next to their
//! values. Anything else is treated as text and only whitespace-normalized.

use serde_json::Value;
use unicode_normalization::UnicodeNormalization;

const MAX_FLATTEN_DEPTH: usize = 32;

/// Builds the embedding input for one document.
pub fn embedding_text(title: &str, raw_content: &str, max_chars: usize) -> String {
	let body = project_content(raw_content);
	let title = normalize_whitespace(title);
	let joined = match (title.is_empty(), body.is_empty()) {
		(true, _) => body,
		(false, true) => title,
		(false, false) => format!("{title}\n{body}"),
	};
	let normalized: String = joined.nfkc().collect();

	truncate_chars(&normalized, max_chars)
}

pub fn project_content(raw_content: &str) -> String {
	let trimmed = raw_content.trim();

	if (trimmed.starts_with('{') || trimmed.starts_with('['))
		&& let Ok(value) = serde_json::from_str::<Value>(trimmed)
	{
		let mut lines = Vec::new();

		flatten(&value, "", 0, &mut lines);

		return lines.join("\n");
	}

	trimmed
		.lines()
		.map(normalize_whitespace)
		.filter(|line| !line.is_empty())
		.collect::<Vec<_>>()
		.join("\n")
}

/// Truncates on a character boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
	match text.char_indices().nth(max_chars) {
		Some((byte_idx, _)) => text[..byte_idx].to_string(),
		None => text.to_string(),
	}
}

fn flatten(value: &Value, path: &str, depth: usize, out: &mut Vec<String>) {
	if depth > MAX_FLATTEN_DEPTH {
		return;
	}

	match value {
		Value::Null => {},
		Value::Bool(flag) => out.push(leaf(path, &flag.to_string())),
		Value::Number(number) => out.push(leaf(path, &number.to_string())),
		Value::String(text) => {
			let text = normalize_whitespace(text);

			if !text.is_empty() {
				out.push(leaf(path, &text));
			}
		},
		Value::Array(items) =>
			for (idx, item) in items.iter().enumerate() {
				flatten(item, &format!("{path}[{idx}]"), depth + 1, out);
			},
		Value::Object(map) =>
			for (key, item) in map {
				let child = if path.is_empty() { key.clone() } else { format!("{path}.{key}") };

				flatten(item, &child, depth + 1, out);
			},
	}
}

fn leaf(path: &str, value: &str) -> String {
	if path.is_empty() { value.to_string() } else { format!("{path}: {value}") }
}

fn normalize_whitespace(text: &str) -> String {
	text.split_whitespace().collect::<Vec<_>>().join(" ")
}
