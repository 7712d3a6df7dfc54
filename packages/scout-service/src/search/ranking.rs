use scout_domain::Document;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Ranked {
	/// Position of the document in store order.
	pub position: usize,
	pub score: f32,
}

/// Cosine similarity of two equal-length vectors. A zero-norm side scores 0.0.
///
/// Accumulates in `f64` so very small or very large components neither vanish
/// nor overflow.
pub fn cosine_similarity(lhs: &[f32], rhs: &[f32]) -> f32 {
	let mut dot = 0.0_f64;
	let mut lhs_norm = 0.0_f64;
	let mut rhs_norm = 0.0_f64;

	for (&l, &r) in lhs.iter().zip(rhs.iter()) {
		let (l, r) = (f64::from(l), f64::from(r));

		dot += l * r;
		lhs_norm += l * l;
		rhs_norm += r * r;
	}

	if lhs_norm == 0.0 || rhs_norm == 0.0 {
		return 0.0;
	}

	let score = dot / (lhs_norm.sqrt() * rhs_norm.sqrt());

	if !score.is_finite() {
		return 0.0;
	}

	score.clamp(-1.0, 1.0) as f32
}

/// Scores every document against `query`, best first. Ties keep store order.
pub(crate) fn rank(documents: &[Document], query: &[f32]) -> Result<Vec<Ranked>> {
	let mut ranked = Vec::with_capacity(documents.len());

	for (position, doc) in documents.iter().enumerate() {
		if doc.dimension() != query.len() {
			return Err(Error::DimensionMismatch { expected: doc.dimension(), actual: query.len() });
		}

		ranked.push(Ranked { position, score: cosine_similarity(&doc.embedding, query) });
	}

	ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

	Ok(ranked)
}
