//! Property tests for context retrieval ordering.

use std::collections::HashMap;
use std::sync::Arc;

use agrisense::embeddings::HashEmbedder;
use agrisense::models::Document;
use agrisense::rag::ContextRetriever;
use agrisense::store::DistanceMetric;
use agrisense::store::InMemoryVectorStore;
use agrisense::store::VectorStore;
use proptest::prelude::*;

const DIM: usize = 16;

fn arb_document() -> impl Strategy<Value = (String, String)> {
    ("[a-z]{3,8}", "[a-z]{3,9}( [a-z]{3,9}){0,6}")
}

/// *For any* stored collection, `retrieve(query, n)` returns at most `n`
/// contexts, never more than are stored, in non-decreasing distance order.
mod prop_retrieve_ordering {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn bounded_and_ordered(
            docs in proptest::collection::vec(arb_document(), 0..20),
            query in "[a-z]{3,9}( [a-z]{3,9}){0,4}",
            limit in 0usize..12,
            cosine in any::<bool>(),
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let (retrieval, stored) = rt.block_on(async {
                let embedder = Arc::new(HashEmbedder::new(DIM).unwrap());
                let metric = if cosine { DistanceMetric::Cosine } else { DistanceMetric::L2 };
                let store = Arc::new(InMemoryVectorStore::with_metric(metric));

                let unique: HashMap<String, String> = docs.into_iter().collect();
                for (id, text) in &unique {
                    let vector = embedder.embed_sync(text);
                    store.upsert(Document::new(id.clone(), text.clone(), vector)).await.unwrap();
                }
                let stored = store.count().await.unwrap();

                let retriever = ContextRetriever::new(embedder, store);
                (retriever.retrieve(&query, limit).await, stored)
            });

            prop_assert!(!retrieval.is_degraded());
            prop_assert!(retrieval.len() <= limit);
            prop_assert_eq!(retrieval.len(), limit.min(stored));

            for window in retrieval.contexts().windows(2) {
                prop_assert!(
                    window[0].distance <= window[1].distance,
                    "results not in ascending order: {} > {}",
                    window[0].distance,
                    window[1].distance,
                );
            }
        }
    }
}
