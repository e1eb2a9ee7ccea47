use qdrant_client::qdrant::Distance;

use crate::Result;

/// Both collections use cosine distance; scores arrive as similarities.
pub const DISTANCE_METRIC: Distance = Distance::Cosine;

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub tags_collection: String,
	pub desc_collection: String,
	pub vector_dim: u32,
}
impl QdrantStore {
	pub fn new(cfg: &tome_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url).build()?;

		Ok(Self {
			client,
			tags_collection: cfg.tags_collection.clone(),
			desc_collection: cfg.desc_collection.clone(),
			vector_dim: cfg.vector_dim,
		})
	}
}
