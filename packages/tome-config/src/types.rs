use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	pub retrieval: Retrieval,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub qdrant: Qdrant,
}

#[derive(Debug, Deserialize)]
pub struct Qdrant {
	pub url: String,
	pub tags_collection: String,
	pub desc_collection: String,
	pub vector_dim: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub api_base: String,
	pub path: String,
	pub model: String,
	pub timeout_ms: u64,
}

/// Knobs for the two-stage retrieval pipeline. The score weights themselves
/// are fixed constants in `tome-domain`; only the search envelope is
/// configurable.
#[derive(Debug, Deserialize)]
pub struct Retrieval {
	#[serde(default = "default_candidate_limit")]
	pub candidate_limit: u32,
	#[serde(default = "default_filtered_score_threshold")]
	pub filtered_score_threshold: f32,
	#[serde(default = "default_fallback_score_threshold")]
	pub fallback_score_threshold: f32,
	#[serde(default = "default_min_filtered_results")]
	pub min_filtered_results: u32,
	#[serde(default = "default_top_k")]
	pub top_k: u32,
}

fn default_candidate_limit() -> u32 {
	50
}

fn default_filtered_score_threshold() -> f32 {
	0.3
}

fn default_fallback_score_threshold() -> f32 {
	0.2
}

fn default_min_filtered_results() -> u32 {
	10
}

fn default_top_k() -> u32 {
	5
}
