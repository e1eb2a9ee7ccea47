use std::sync::Arc;

use tome_domain::{
	catalog::BookRecord,
	point_id::{PointRole, point_id},
};
use tome_service::ServiceError;

use super::{DESC_COLLECTION, FakeIndex, StubEmbedding, TAGS_COLLECTION, VECTOR_DIM, build_service};

fn record(book_id: &str, description: &str) -> BookRecord {
	BookRecord {
		book_id: book_id.to_string(),
		title: format!("Title {book_id}"),
		author: format!("Author {book_id}"),
		description: description.to_string(),
		tags: vec!["fiction".to_string(), "classic".to_string()],
		language: "English".to_string(),
		cover_url: format!("https://covers.test/{book_id}.jpg"),
	}
}

#[tokio::test]
async fn one_bad_record_does_not_stop_the_batch() {
	let index = Arc::new(FakeIndex::default());
	let embedding = Arc::new(StubEmbedding::failing_on(VECTOR_DIM, "unembeddable"));
	let service = build_service(index.clone(), embedding);
	let records = vec![
		record("bk_1", "A quiet coastal mystery."),
		record("bk_2", "A study of memory."),
		record("bk_3", "unembeddable text"),
		record("bk_4", "A generational saga."),
		record("bk_5", "An essay collection."),
	];
	let report = service.import_catalog(&records).await.expect("import report");

	assert_eq!(report.total, 5);
	assert_eq!(report.success_count, 4);
	assert_eq!(report.error_count, 1);
	assert_eq!(report.errors.len(), 1);
	assert!(report.errors[0].contains("Title bk_3"));
	assert!(report.errors[0].contains("bk_3"));

	// Records after the failed one were still processed, two points each.
	let upserts = index.upserts.lock().unwrap();

	assert_eq!(upserts.len(), 8);
	assert!(upserts.iter().any(|call| call.id == point_id("bk_5", PointRole::Tags)));
}

#[tokio::test]
async fn import_writes_deterministic_linked_points() {
	let index = Arc::new(FakeIndex::default());
	let service = build_service(index.clone(), Arc::new(StubEmbedding::new(VECTOR_DIM)));
	let records = vec![record("bk_9", "A short description.")];

	service.import_catalog(&records).await.expect("first import");
	service.import_catalog(&records).await.expect("second import");

	let upserts = index.upserts.lock().unwrap();

	assert_eq!(upserts.len(), 4);
	// Same record, same point ids on every run.
	assert_eq!(upserts[0].id, upserts[2].id);
	assert_eq!(upserts[1].id, upserts[3].id);

	let tags_call = &upserts[0];
	let desc_call = &upserts[1];

	assert_eq!(tags_call.collection, TAGS_COLLECTION);
	assert_eq!(tags_call.id, point_id("bk_9", PointRole::Tags));
	assert_eq!(tags_call.vector_len, VECTOR_DIM as usize);
	assert_eq!(tags_call.payload["book_id"], "bk_9");
	assert_eq!(tags_call.payload["title"], "Title bk_9");
	assert_eq!(tags_call.payload["type"], "book");

	assert_eq!(desc_call.collection, DESC_COLLECTION);
	assert_eq!(desc_call.id, point_id("bk_9", PointRole::Desc));
	assert_eq!(desc_call.payload["book_id"], "bk_9");
	assert_eq!(desc_call.payload["type"], "book_desc");
	assert_eq!(desc_call.payload["tags_point_id"], tags_call.id.to_string());
	// The description point carries linkage only.
	assert!(desc_call.payload.get("title").is_none());
}

#[tokio::test]
async fn collections_are_recreated_before_any_upsert() {
	let index = Arc::new(FakeIndex::default());
	let service = build_service(index.clone(), Arc::new(StubEmbedding::new(VECTOR_DIM)));

	service.import_catalog(&[record("bk_1", "Some text.")]).await.expect("import report");

	let recreated = index.recreated.lock().unwrap();

	assert_eq!(*recreated, vec![TAGS_COLLECTION.to_string(), DESC_COLLECTION.to_string()]);
}

#[tokio::test]
async fn collection_setup_failure_aborts_the_import() {
	let index = Arc::new(FakeIndex { fail_recreate: true, ..FakeIndex::default() });
	let service = build_service(index.clone(), Arc::new(StubEmbedding::new(VECTOR_DIM)));
	let err = service
		.import_catalog(&[record("bk_1", "Some text.")])
		.await
		.expect_err("setup failure must abort");

	assert!(matches!(err, ServiceError::VectorStore { .. }));
	assert!(index.upserts.lock().unwrap().is_empty());
}
