use serde::Deserialize;

use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
	data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
	index: Option<usize>,
	embedding: Vec<f32>,
}

/// Embeds `texts` in one request. Vectors come back in input order.
pub async fn embed(
	cfg: &scout_config::EmbeddingProviderConfig,
	texts: &[String],
) -> Result<Vec<Vec<f32>>> {
	if texts.is_empty() {
		return Ok(Vec::new());
	}

	let body = serde_json::json!({
		"model": cfg.model,
		"input": texts,
		"dimensions": cfg.dimensions,
	});
	let res = crate::http_client(cfg.timeout_ms)?
		.post(crate::endpoint_url(&cfg.api_base, &cfg.path))
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?
		.error_for_status()?;
	let vectors = order_vectors(res.json().await?, texts.len())?;

	tracing::debug!(count = vectors.len(), model = %cfg.model, "Embedded texts.");

	Ok(vectors)
}

/// Places each item at its `index` (position in the array when absent) and
/// checks that every input got exactly one vector.
fn order_vectors(response: EmbeddingResponse, expected: usize) -> Result<Vec<Vec<f32>>> {
	if response.data.len() != expected {
		return Err(Error::InvalidResponse {
			message: format!(
				"Embedding provider returned {} vectors for {expected} inputs.",
				response.data.len()
			),
		});
	}

	let mut slots: Vec<Option<Vec<f32>>> = vec![None; expected];

	for (position, item) in response.data.into_iter().enumerate() {
		let index = item.index.unwrap_or(position);
		let Some(slot) = slots.get_mut(index) else {
			return Err(Error::InvalidResponse {
				message: format!("Embedding index {index} is out of range."),
			});
		};

		if slot.replace(item.embedding).is_some() {
			return Err(Error::InvalidResponse {
				message: format!("Embedding index {index} appears more than once."),
			});
		}
	}

	Ok(slots.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn response(json: serde_json::Value) -> EmbeddingResponse {
		serde_json::from_value(json).expect("Failed to decode embedding response.")
	}

	#[test]
	fn orders_vectors_by_index() {
		let json = serde_json::json!({
			"data": [
				{ "index": 1, "embedding": [2.0, 3.0] },
				{ "index": 0, "embedding": [0.5, 1.5] }
			]
		});
		let vectors = order_vectors(response(json), 2).expect("Failed to order vectors.");

		assert_eq!(vectors, vec![vec![0.5, 1.5], vec![2.0, 3.0]]);
	}

	#[test]
	fn missing_index_falls_back_to_position() {
		let json = serde_json::json!({ "data": [{ "embedding": [1.0] }, { "embedding": [2.0] }] });
		let vectors = order_vectors(response(json), 2).expect("Failed to order vectors.");

		assert_eq!(vectors, vec![vec![1.0], vec![2.0]]);
	}

	#[test]
	fn rejects_count_mismatch_and_duplicates() {
		let short = serde_json::json!({ "data": [{ "index": 0, "embedding": [1.0] }] });
		let duplicated = serde_json::json!({
			"data": [
				{ "index": 0, "embedding": [1.0] },
				{ "index": 0, "embedding": [2.0] }
			]
		});

		assert!(order_vectors(response(short), 2).is_err());
		assert!(order_vectors(response(duplicated), 2).is_err());
	}

	#[test]
	fn non_numeric_values_fail_to_decode() {
		let json = serde_json::json!({ "data": [{ "embedding": ["x"] }] });

		assert!(serde_json::from_value::<EmbeddingResponse>(json).is_err());
	}
}
