use std::sync::Arc;

use tome_service::RecommendService;
use tome_storage::qdrant::QdrantStore;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<RecommendService>,
}
impl AppState {
	pub fn new(config: tome_config::Config) -> color_eyre::Result<Self> {
		let qdrant = QdrantStore::new(&config.storage.qdrant)?;
		let service = RecommendService::new(config, qdrant);

		Ok(Self { service: Arc::new(service) })
	}

	pub fn with_service(service: Arc<RecommendService>) -> Self {
		Self { service }
	}
}
