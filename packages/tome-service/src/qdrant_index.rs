use std::collections::HashMap;

use color_eyre::eyre;
use qdrant_client::{
	Payload,
	qdrant::{
		Condition, CreateCollectionBuilder, Filter, PointStruct, SearchPointsBuilder,
		UpsertPointsBuilder, Value, VectorParamsBuilder, point_id::PointIdOptions, value::Kind,
	},
};
use uuid::Uuid;

use crate::{BoxFuture, MatchValue, ScoredHit, SearchFilter, VectorIndex};
use tome_storage::qdrant::{DISTANCE_METRIC, QdrantStore};

impl VectorIndex for QdrantStore {
	fn search<'a>(
		&'a self,
		collection: &'a str,
		vector: &'a [f32],
		limit: u64,
		score_threshold: Option<f32>,
		filter: Option<SearchFilter>,
	) -> BoxFuture<'a, color_eyre::Result<Vec<ScoredHit>>> {
		Box::pin(async move {
			let mut search =
				SearchPointsBuilder::new(collection, vector.to_vec(), limit).with_payload(true);

			if let Some(threshold) = score_threshold {
				search = search.score_threshold(threshold);
			}
			if let Some(filter) = filter {
				search = search.filter(qdrant_filter(filter));
			}

			let response = self.client.search_points(search).await?;
			let hits = response
				.result
				.into_iter()
				.map(|point| ScoredHit {
					id: point.id.as_ref().map(point_id_string).unwrap_or_default(),
					score: point.score,
					payload: json_from_payload(point.payload),
				})
				.collect();

			Ok(hits)
		})
	}

	fn upsert<'a>(
		&'a self,
		collection: &'a str,
		id: Uuid,
		vector: Vec<f32>,
		payload: serde_json::Value,
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async move {
			let payload = Payload::try_from(payload)
				.map_err(|err| eyre::eyre!("Point payload must be a JSON object: {err}."))?;
			let point = PointStruct::new(id.to_string(), vector, payload);

			self.client
				.upsert_points(UpsertPointsBuilder::new(collection, vec![point]).wait(true))
				.await?;

			Ok(())
		})
	}

	fn recreate_collection<'a>(
		&'a self,
		collection: &'a str,
		vector_dim: u32,
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		Box::pin(async move {
			if self.client.collection_exists(collection).await? {
				self.client.delete_collection(collection).await?;
			}

			self.client
				.create_collection(
					CreateCollectionBuilder::new(collection).vectors_config(
						VectorParamsBuilder::new(u64::from(vector_dim), DISTANCE_METRIC),
					),
				)
				.await?;

			Ok(())
		})
	}
}

fn qdrant_filter(filter: SearchFilter) -> Filter {
	Filter::all(filter.must.into_iter().map(|clause| match clause.matches {
		MatchValue::Keyword(value) => Condition::matches(clause.field, value),
		MatchValue::AnyOf(values) => Condition::matches(clause.field, values),
	}))
}

fn point_id_string(point_id: &qdrant_client::qdrant::PointId) -> String {
	match &point_id.point_id_options {
		Some(PointIdOptions::Uuid(id)) => id.clone(),
		Some(PointIdOptions::Num(id)) => id.to_string(),
		None => String::new(),
	}
}

fn json_from_payload(payload: HashMap<String, Value>) -> serde_json::Value {
	let mut map = serde_json::Map::with_capacity(payload.len());

	for (key, value) in payload {
		map.insert(key, json_from_value(value));
	}

	serde_json::Value::Object(map)
}

fn json_from_value(value: Value) -> serde_json::Value {
	match value.kind {
		Some(Kind::StringValue(text)) => serde_json::Value::String(text),
		Some(Kind::BoolValue(flag)) => serde_json::Value::Bool(flag),
		Some(Kind::IntegerValue(number)) => serde_json::Value::from(number),
		Some(Kind::DoubleValue(number)) => serde_json::Value::from(number),
		Some(Kind::ListValue(list)) =>
			serde_json::Value::Array(list.values.into_iter().map(json_from_value).collect()),
		Some(Kind::StructValue(fields)) => json_from_payload(fields.fields),
		Some(Kind::NullValue(_)) | None => serde_json::Value::Null,
	}
}
