use tracing::{info, warn};

use crate::{RecommendService, ServiceError, ServiceResult};
use tome_domain::{
	catalog::BookRecord,
	point_id::{PointRole, point_id},
};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ImportReport {
	pub total: u32,
	pub success_count: u32,
	pub error_count: u32,
	pub errors: Vec<String>,
}

impl RecommendService {
	/// Rebuilds both collections from a source catalog.
	///
	/// Setup is destructive: existing collections are dropped and recreated
	/// before any record is processed, so a partially failed prior run leaves
	/// no stale points behind. A setup failure aborts the import; a
	/// per-record failure is recorded and the batch continues.
	pub async fn import_catalog(&self, records: &[BookRecord]) -> ServiceResult<ImportReport> {
		let qdrant = &self.cfg.storage.qdrant;

		for collection in [qdrant.tags_collection.as_str(), qdrant.desc_collection.as_str()] {
			self.index
				.recreate_collection(collection, qdrant.vector_dim)
				.await
				.map_err(|err| ServiceError::VectorStore { message: err.to_string() })?;
		}

		let mut report = ImportReport {
			total: records.len() as u32,
			success_count: 0,
			error_count: 0,
			errors: Vec::new(),
		};

		for record in records {
			match self.import_record(record).await {
				Ok(()) => {
					report.success_count += 1;
				},
				Err(err) => {
					warn!(
						book_id = %record.book_id,
						title = %record.title,
						error = %err,
						"Catalog record import failed; continuing."
					);
					report.error_count += 1;
					report.errors.push(format!("{} ({}): {err}", record.title, record.book_id));
				},
			}
		}

		info!(
			total = report.total,
			success_count = report.success_count,
			error_count = report.error_count,
			"Catalog import finished."
		);

		Ok(report)
	}

	async fn import_record(&self, record: &BookRecord) -> ServiceResult<()> {
		let qdrant = &self.cfg.storage.qdrant;
		let tags_id = point_id(&record.book_id, PointRole::Tags);
		let desc_id = point_id(&record.book_id, PointRole::Desc);
		let tags_vector = self.embed_text(&record.tags_text()).await?;
		let desc_vector = self.embed_text(&record.description).await?;
		let tags_payload = serde_json::json!({
			"book_id": record.book_id,
			"title": record.title,
			"author": record.author,
			"description": record.description,
			"tags": record.tags,
			"language": record.language,
			"cover_url": record.cover_url,
			"type": "book",
		});
		// Linkage only; the full record lives on the tag-collection point.
		let desc_payload = serde_json::json!({
			"book_id": record.book_id,
			"tags_point_id": tags_id.to_string(),
			"type": "book_desc",
		});

		self.index
			.upsert(&qdrant.tags_collection, tags_id, tags_vector, tags_payload)
			.await
			.map_err(|err| ServiceError::VectorStore { message: err.to_string() })?;
		self.index
			.upsert(&qdrant.desc_collection, desc_id, desc_vector, desc_payload)
			.await
			.map_err(|err| ServiceError::VectorStore { message: err.to_string() })?;

		Ok(())
	}
}
