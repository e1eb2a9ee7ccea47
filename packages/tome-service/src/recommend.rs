use std::{
	collections::{HashMap, HashSet},
	time::Instant,
};

use tracing::{debug, warn};

use crate::{
	MatchValue, RecommendService, ScoredHit, SearchFilter, ServiceError, ServiceResult,
};
use tome_domain::scoring::{self, Candidate, RankedBook};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RecommendRequest {
	pub query_text: String,
	#[serde(default)]
	pub filters: QueryFilters,
	/// Accepted for contract compatibility with upstream query parsers;
	/// unused by the baseline pipeline.
	#[serde(default)]
	pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct QueryFilters {
	pub language: Option<String>,
	pub tags: Option<Vec<String>>,
}
impl QueryFilters {
	pub fn is_empty(&self) -> bool {
		self.language.as_deref().map(|value| value.trim().is_empty()).unwrap_or(true)
			&& self.tags.as_deref().map(|tags| tags.is_empty()).unwrap_or(true)
	}
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RecommendResponse {
	pub query: String,
	pub results: Vec<Recommendation>,
	pub total_candidates: u32,
	pub search_strategy: SearchStrategy,
	pub processing_time_ms: u64,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Recommendation {
	pub title: String,
	pub author: String,
	pub description: String,
	pub cover_url: String,
	pub tags: Vec<String>,
	pub relevance_score: f32,
}

/// Which Stage-1 path produced the candidate set. `Hybrid` means the
/// metadata-filtered search was kept; `SemanticOnly` means the unfiltered
/// search ran, either as a fallback or because no filters were supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchStrategy {
	Hybrid,
	SemanticOnly,
}

impl RecommendService {
	pub async fn recommend(&self, req: RecommendRequest) -> ServiceResult<RecommendResponse> {
		let started = Instant::now();
		let query = req.query_text.trim();

		if query.is_empty() {
			return Err(ServiceError::InvalidRequest {
				message: "query_text is required.".to_string(),
			});
		}

		let vector = self.embed_text(query).await?;
		let (candidates, strategy) = self.retrieve_candidates(&vector, &req.filters).await?;
		let total_candidates = candidates.len() as u32;
		let ranked = if candidates.is_empty() {
			Vec::new()
		} else {
			self.rerank(&vector, candidates).await?
		};
		let results = ranked.into_iter().map(project_recommendation).collect();

		debug!(
			query,
			total_candidates,
			strategy = ?strategy,
			"Recommendation pipeline finished."
		);

		Ok(RecommendResponse {
			query: query.to_string(),
			results,
			total_candidates,
			search_strategy: strategy,
			processing_time_ms: started.elapsed().as_millis() as u64,
		})
	}

	/// Stage 1. Filtered search first when the query carries filters; a
	/// single lower-threshold unfiltered search replaces it when it
	/// under-returns. The two result sets are never merged.
	async fn retrieve_candidates(
		&self,
		vector: &[f32],
		filters: &QueryFilters,
	) -> ServiceResult<(Vec<Candidate>, SearchStrategy)> {
		let retrieval = &self.cfg.retrieval;
		let tags_collection = self.cfg.storage.qdrant.tags_collection.as_str();
		let limit = retrieval.candidate_limit as u64;

		if let Some(filter) = build_metadata_filter(filters) {
			let hits = self
				.index
				.search(
					tags_collection,
					vector,
					limit,
					Some(retrieval.filtered_score_threshold),
					Some(filter),
				)
				.await
				.map_err(vector_store_error)?;

			if hits.len() >= retrieval.min_filtered_results as usize {
				return Ok((
					collect_candidates(hits, retrieval.candidate_limit as usize),
					SearchStrategy::Hybrid,
				));
			}

			debug!(
				filtered_hits = hits.len(),
				min_filtered_results = retrieval.min_filtered_results,
				"Filtered search under-returned; falling back to unfiltered search."
			);
		}

		let hits = self
			.index
			.search(
				tags_collection,
				vector,
				limit,
				Some(retrieval.fallback_score_threshold),
				None,
			)
			.await
			.map_err(vector_store_error)?;

		Ok((collect_candidates(hits, retrieval.candidate_limit as usize), SearchStrategy::SemanticOnly))
	}

	/// Stage 2. Re-scores the candidate set in description space. Candidates
	/// the search does not return keep their Stage-1 membership with a zero
	/// description score.
	async fn rerank(
		&self,
		vector: &[f32],
		candidates: Vec<Candidate>,
	) -> ServiceResult<Vec<RankedBook>> {
		let desc_collection = self.cfg.storage.qdrant.desc_collection.as_str();
		let candidate_ids: Vec<String> =
			candidates.iter().map(|candidate| candidate.book_id.clone()).collect();
		let filter =
			SearchFilter::default().matches("book_id", MatchValue::AnyOf(candidate_ids));
		let hits = self
			.index
			.search(desc_collection, vector, candidates.len() as u64, None, Some(filter))
			.await
			.map_err(vector_store_error)?;
		let mut desc_scores: HashMap<String, f32> = HashMap::with_capacity(hits.len());

		for hit in hits {
			let Some(book_id) = payload_str(&hit.payload, "book_id") else {
				warn!(hit_id = %hit.id, "Rerank hit missing book_id payload field.");
				continue;
			};
			let entry = desc_scores.entry(book_id.to_string()).or_insert(hit.score);

			if hit.score > *entry {
				*entry = hit.score;
			}
		}

		Ok(scoring::rank_candidates(candidates, &desc_scores, self.cfg.retrieval.top_k as usize))
	}
}

fn build_metadata_filter(filters: &QueryFilters) -> Option<SearchFilter> {
	if filters.is_empty() {
		return None;
	}

	let mut filter = SearchFilter::default();

	if let Some(language) = filters.language.as_deref().filter(|value| !value.trim().is_empty()) {
		filter = filter.matches("language", MatchValue::Keyword(language.to_string()));
	}
	if let Some(tags) = filters.tags.as_deref().filter(|tags| !tags.is_empty()) {
		filter = filter.matches("tags", MatchValue::AnyOf(tags.to_vec()));
	}

	Some(filter)
}

/// Turns Stage-1 hits into the candidate set: deduplicated by book id with
/// the first (highest-scoring) occurrence kept, capped at the limit.
fn collect_candidates(hits: Vec<ScoredHit>, limit: usize) -> Vec<Candidate> {
	let mut out = Vec::new();
	let mut seen = HashSet::new();

	for hit in hits {
		if out.len() >= limit {
			break;
		}

		let Some(book_id) = payload_str(&hit.payload, "book_id") else {
			warn!(hit_id = %hit.id, "Candidate missing book_id payload field.");
			continue;
		};

		if !seen.insert(book_id.to_string()) {
			continue;
		}

		out.push(Candidate {
			book_id: book_id.to_string(),
			tags_score: hit.score,
			payload: hit.payload,
		});
	}

	out
}

fn project_recommendation(book: RankedBook) -> Recommendation {
	Recommendation {
		title: payload_str(&book.payload, "title").unwrap_or_default().to_string(),
		author: payload_str(&book.payload, "author").unwrap_or_default().to_string(),
		description: payload_str(&book.payload, "description").unwrap_or_default().to_string(),
		cover_url: payload_str(&book.payload, "cover_url").unwrap_or_default().to_string(),
		tags: payload_str_list(&book.payload, "tags"),
		relevance_score: book.final_score,
	}
}

fn vector_store_error(err: color_eyre::Report) -> ServiceError {
	ServiceError::VectorStore { message: err.to_string() }
}

fn payload_str<'a>(payload: &'a serde_json::Value, key: &str) -> Option<&'a str> {
	payload.get(key).and_then(|value| value.as_str())
}

fn payload_str_list(payload: &serde_json::Value, key: &str) -> Vec<String> {
	payload
		.get(key)
		.and_then(|value| value.as_array())
		.map(|values| {
			values
				.iter()
				.filter_map(|value| value.as_str())
				.map(|value| value.to_string())
				.collect()
		})
		.unwrap_or_default()
}
