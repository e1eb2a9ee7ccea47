use std::collections::HashMap;

/// Weight of the Stage-1 tag-space similarity in the combined score.
pub const TAGS_WEIGHT: f32 = 0.3;
/// Weight of the Stage-2 description-space similarity in the combined score.
/// Descriptive content is the stronger relevance signal, hence the skew.
pub const DESC_WEIGHT: f32 = 0.7;

/// A Stage-1 hit. Carries only the tag-space similarity and the payload the
/// tag collection stored for the book.
#[derive(Debug, Clone)]
pub struct Candidate {
	pub book_id: String,
	pub tags_score: f32,
	pub payload: serde_json::Value,
}

/// A candidate after Stage 2, with both scores and their weighted merge.
#[derive(Debug, Clone)]
pub struct RankedBook {
	pub book_id: String,
	pub tags_score: f32,
	pub desc_score: f32,
	pub final_score: f32,
	pub payload: serde_json::Value,
}

pub fn combine_scores(tags_score: f32, desc_score: f32) -> f32 {
	tags_score * TAGS_WEIGHT + desc_score * DESC_WEIGHT
}

/// Merges Stage-2 scores into the candidate set and selects the final list.
///
/// Every Stage-1 candidate survives; ones the rerank search did not return
/// score zero in description space. Ordering is final score descending with
/// `book_id` ascending as the tie-break, truncated to `top_k`.
pub fn rank_candidates(
	candidates: Vec<Candidate>,
	desc_scores: &HashMap<String, f32>,
	top_k: usize,
) -> Vec<RankedBook> {
	let mut ranked: Vec<RankedBook> = candidates
		.into_iter()
		.map(|candidate| {
			let desc_score = desc_scores.get(&candidate.book_id).copied().unwrap_or(0.0);
			let final_score = combine_scores(candidate.tags_score, desc_score);

			RankedBook {
				book_id: candidate.book_id,
				tags_score: candidate.tags_score,
				desc_score,
				final_score,
				payload: candidate.payload,
			}
		})
		.collect();

	ranked.sort_by(|a, b| {
		b.final_score
			.partial_cmp(&a.final_score)
			.unwrap_or(std::cmp::Ordering::Equal)
			.then_with(|| a.book_id.cmp(&b.book_id))
	});
	ranked.truncate(top_k);

	ranked
}
