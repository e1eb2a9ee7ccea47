pub mod ingest;
pub mod recommend;

mod qdrant_index;

use std::{future::Future, pin::Pin, sync::Arc};

use uuid::Uuid;

pub use ingest::ImportReport;
pub use recommend::{
	QueryFilters, Recommendation, RecommendRequest, RecommendResponse, SearchStrategy,
};

use tome_config::{Config, EmbeddingProviderConfig};
use tome_providers::embedding;
use tome_storage::qdrant::QdrantStore;

pub type ServiceResult<T> = Result<T, ServiceError>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Text to fixed-length vector, bounded by the configured timeout.
pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>>;
}

/// Exact-match test on one payload field.
#[derive(Debug, Clone)]
pub struct FieldMatch {
	pub field: String,
	pub matches: MatchValue,
}

#[derive(Debug, Clone)]
pub enum MatchValue {
	Keyword(String),
	AnyOf(Vec<String>),
}

/// Conjunction of exact-match clauses; every clause must hold.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
	pub must: Vec<FieldMatch>,
}
impl SearchFilter {
	pub fn matches(mut self, field: &str, value: MatchValue) -> Self {
		self.must.push(FieldMatch { field: field.to_string(), matches: value });
		self
	}
}

#[derive(Debug, Clone)]
pub struct ScoredHit {
	pub id: String,
	pub score: f32,
	pub payload: serde_json::Value,
}

/// The vector-store capability the pipeline consumes. The service never
/// talks to a concrete HTTP client directly; the Qdrant-backed
/// implementation lives behind this seam, as do the in-memory fakes the
/// acceptance tests run against.
pub trait VectorIndex
where
	Self: Send + Sync,
{
	/// Nearest-neighbor search, hits ordered score descending.
	fn search<'a>(
		&'a self,
		collection: &'a str,
		vector: &'a [f32],
		limit: u64,
		score_threshold: Option<f32>,
		filter: Option<SearchFilter>,
	) -> BoxFuture<'a, color_eyre::Result<Vec<ScoredHit>>>;

	/// Overwrites on a reused id.
	fn upsert<'a>(
		&'a self,
		collection: &'a str,
		id: Uuid,
		vector: Vec<f32>,
		payload: serde_json::Value,
	) -> BoxFuture<'a, color_eyre::Result<()>>;

	/// Drops the collection if present and creates it fresh with cosine
	/// distance.
	fn recreate_collection<'a>(
		&'a self,
		collection: &'a str,
		vector_dim: u32,
	) -> BoxFuture<'a, color_eyre::Result<()>>;
}

#[derive(Debug)]
pub enum ServiceError {
	InvalidRequest { message: String },
	Provider { message: String },
	VectorStore { message: String },
}

impl std::fmt::Display for ServiceError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::InvalidRequest { message } => write!(f, "Invalid request: {message}"),
			Self::Provider { message } => write!(f, "Provider error: {message}"),
			Self::VectorStore { message } => write!(f, "Vector store error: {message}"),
		}
	}
}

impl std::error::Error for ServiceError {}

impl From<color_eyre::Report> for ServiceError {
	fn from(err: color_eyre::Report) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

struct DefaultEmbedding;

impl EmbeddingProvider for DefaultEmbedding {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>> {
		Box::pin(embedding::embed(cfg, text))
	}
}

pub struct RecommendService {
	pub cfg: Config,
	pub index: Arc<dyn VectorIndex>,
	pub embedding: Arc<dyn EmbeddingProvider>,
}

impl RecommendService {
	pub fn new(cfg: Config, store: QdrantStore) -> Self {
		Self { cfg, index: Arc::new(store), embedding: Arc::new(DefaultEmbedding) }
	}

	pub fn with_parts(
		cfg: Config,
		index: Arc<dyn VectorIndex>,
		embedding: Arc<dyn EmbeddingProvider>,
	) -> Self {
		Self { cfg, index, embedding }
	}

	pub(crate) async fn embed_text(&self, text: &str) -> ServiceResult<Vec<f32>> {
		let vector = self.embedding.embed(&self.cfg.providers.embedding, text).await?;

		if vector.len() != self.cfg.storage.qdrant.vector_dim as usize {
			return Err(ServiceError::Provider {
				message: "Embedding vector dimension mismatch.".to_string(),
			});
		}

		Ok(vector)
	}
}
