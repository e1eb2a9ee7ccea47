use std::sync::Arc;

use tome_domain::scoring;
use tome_service::{QueryFilters, RecommendRequest, SearchStrategy, ServiceError};

use super::{
	DESC_COLLECTION, FakeIndex, StubEmbedding, TAGS_COLLECTION, VECTOR_DIM, build_service,
	desc_hit, tags_hit,
};

fn psychology_request() -> RecommendRequest {
	RecommendRequest {
		query_text: "books about psychology and the mind".to_string(),
		filters: QueryFilters {
			language: Some("Chinese".to_string()),
			tags: Some(vec!["psychology".to_string()]),
		},
		summary: None,
	}
}

#[tokio::test]
async fn filtered_search_is_kept_when_it_returns_enough() {
	let index = Arc::new(FakeIndex {
		tags_filtered: (0..12).map(|i| tags_hit(&format!("bk_{i:02}"), 0.95 - i as f32 * 0.02)).collect(),
		desc_hits: (0..12).map(|i| desc_hit(&format!("bk_{i:02}"), 0.90 - i as f32 * 0.02)).collect(),
		..FakeIndex::default()
	});
	let service = build_service(index.clone(), Arc::new(StubEmbedding::new(VECTOR_DIM)));
	let response = service.recommend(psychology_request()).await.expect("recommendation");

	assert_eq!(response.search_strategy, SearchStrategy::Hybrid);
	assert_eq!(response.total_candidates, 12);
	assert_eq!(response.results.len(), 5);

	for pair in response.results.windows(2) {
		assert!(pair[0].relevance_score >= pair[1].relevance_score);
	}

	// One tag-space search, one description-space rerank, nothing else.
	let calls = index.search_calls.lock().unwrap().clone();

	assert_eq!(calls.len(), 2);
	assert_eq!(calls[0].collection, TAGS_COLLECTION);
	assert!(calls[0].filtered);
	assert_eq!(calls[0].score_threshold, Some(0.3));
	assert_eq!(calls[1].collection, DESC_COLLECTION);
	assert!(calls[1].filtered);
	assert_eq!(calls[1].limit, 12);
}

#[tokio::test]
async fn fallback_replaces_the_filtered_result_set() {
	let index = Arc::new(FakeIndex {
		tags_filtered: (0..3).map(|i| tags_hit(&format!("filtered_{i}"), 0.8)).collect(),
		tags_unfiltered: (0..20).map(|i| tags_hit(&format!("open_{i:02}"), 0.7 - i as f32 * 0.01)).collect(),
		..FakeIndex::default()
	});
	let service = build_service(index.clone(), Arc::new(StubEmbedding::new(VECTOR_DIM)));
	let response = service.recommend(psychology_request()).await.expect("recommendation");

	assert_eq!(response.search_strategy, SearchStrategy::SemanticOnly);
	assert_eq!(response.total_candidates, 20);

	for result in &response.results {
		assert!(result.title.starts_with("Book open_"), "filtered hits must not leak through");
	}

	let calls = index.search_calls.lock().unwrap().clone();

	assert_eq!(calls.len(), 3);
	assert!(calls[0].filtered);
	assert_eq!(calls[0].score_threshold, Some(0.3));
	assert!(!calls[1].filtered);
	assert_eq!(calls[1].collection, TAGS_COLLECTION);
	assert_eq!(calls[1].score_threshold, Some(0.2));
}

#[tokio::test]
async fn unfiltered_queries_skip_the_filtered_search() {
	let index = Arc::new(FakeIndex {
		tags_unfiltered: vec![tags_hit("a", 0.9), tags_hit("b", 0.8)],
		..FakeIndex::default()
	});
	let service = build_service(index.clone(), Arc::new(StubEmbedding::new(VECTOR_DIM)));
	let response = service
		.recommend(RecommendRequest {
			query_text: "space opera".to_string(),
			filters: QueryFilters::default(),
			summary: None,
		})
		.await
		.expect("recommendation");

	assert_eq!(response.search_strategy, SearchStrategy::SemanticOnly);

	let calls = index.search_calls.lock().unwrap().clone();

	assert_eq!(calls[0].collection, TAGS_COLLECTION);
	assert!(!calls[0].filtered);
	assert_eq!(calls[0].score_threshold, Some(0.2));
}

#[tokio::test]
async fn final_score_is_the_weighted_combination() {
	let index = Arc::new(FakeIndex {
		tags_unfiltered: vec![tags_hit("a", 0.5), tags_hit("b", 0.8)],
		// Only `a` is found in description space; `b` keeps a zero.
		desc_hits: vec![desc_hit("a", 0.9)],
		..FakeIndex::default()
	});
	let service = build_service(index, Arc::new(StubEmbedding::new(VECTOR_DIM)));
	let response = service
		.recommend(RecommendRequest {
			query_text: "anything".to_string(),
			filters: QueryFilters::default(),
			summary: None,
		})
		.await
		.expect("recommendation");

	assert_eq!(response.results.len(), 2);
	assert_eq!(response.results[0].title, "Book a");
	assert_eq!(response.results[0].relevance_score, scoring::combine_scores(0.5, 0.9));
	assert_eq!(response.results[1].title, "Book b");
	assert_eq!(response.results[1].relevance_score, scoring::combine_scores(0.8, 0.0));
}

#[tokio::test]
async fn equal_scores_order_by_book_id() {
	let ids = ["delta", "alpha", "echo", "charlie", "bravo", "foxtrot"];
	let index = Arc::new(FakeIndex {
		tags_unfiltered: ids.iter().map(|id| tags_hit(id, 0.6)).collect(),
		..FakeIndex::default()
	});
	let service = build_service(index, Arc::new(StubEmbedding::new(VECTOR_DIM)));
	let response = service
		.recommend(RecommendRequest {
			query_text: "anything".to_string(),
			filters: QueryFilters::default(),
			summary: None,
		})
		.await
		.expect("recommendation");
	let titles: Vec<&str> = response.results.iter().map(|result| result.title.as_str()).collect();

	assert_eq!(titles, vec!["Book alpha", "Book bravo", "Book charlie", "Book delta", "Book echo"]);
}

#[tokio::test]
async fn empty_candidate_set_is_a_valid_empty_response() {
	let index = Arc::new(FakeIndex::default());
	let service = build_service(index.clone(), Arc::new(StubEmbedding::new(VECTOR_DIM)));
	let response = service
		.recommend(RecommendRequest {
			query_text: "a query matching nothing".to_string(),
			filters: QueryFilters::default(),
			summary: None,
		})
		.await
		.expect("recommendation");

	assert!(response.results.is_empty());
	assert_eq!(response.total_candidates, 0);
	assert_eq!(response.search_strategy, SearchStrategy::SemanticOnly);
	// No rerank search when Stage 1 came back empty.
	assert_eq!(index.search_calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn blank_query_is_rejected() {
	let service =
		build_service(Arc::new(FakeIndex::default()), Arc::new(StubEmbedding::new(VECTOR_DIM)));
	let err = service
		.recommend(RecommendRequest {
			query_text: "   ".to_string(),
			filters: QueryFilters::default(),
			summary: None,
		})
		.await
		.expect_err("blank query must fail");

	assert!(matches!(err, ServiceError::InvalidRequest { .. }));
}

#[tokio::test]
async fn wrong_embedding_dimension_is_a_provider_error() {
	let service =
		build_service(Arc::new(FakeIndex::default()), Arc::new(StubEmbedding::new(VECTOR_DIM + 1)));
	let err = service
		.recommend(RecommendRequest {
			query_text: "anything".to_string(),
			filters: QueryFilters::default(),
			summary: None,
		})
		.await
		.expect_err("dimension mismatch must fail");

	assert!(matches!(err, ServiceError::Provider { .. }));
}
