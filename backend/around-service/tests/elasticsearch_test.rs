//! Tests against a live cluster.
//!
//! Run with `ELASTICSEARCH_URL=http://localhost:9200 cargo test -- --ignored`.

use around_service::{ElasticsearchClient, GeoQuery, Location, Post, PostIndex, Radius};
use uuid::Uuid;

fn client() -> ElasticsearchClient {
    let url =
        std::env::var("ELASTICSEARCH_URL").unwrap_or_else(|_| "http://localhost:9200".to_string());
    let index = format!("around-test-{}", Uuid::new_v4().simple());
    ElasticsearchClient::new(&url, &index).expect("Failed to create Elasticsearch client")
}

#[tokio::test]
#[ignore = "requires a running Elasticsearch"]
async fn ensure_index_is_idempotent() {
    let client = client();
    client.ensure_index().await.expect("first ensure_index");
    client.ensure_index().await.expect("second ensure_index");
}

#[tokio::test]
#[ignore = "requires a running Elasticsearch"]
async fn indexed_post_is_immediately_searchable() {
    let client = client();
    client.ensure_index().await.unwrap();

    let near = Post {
        user: "1111".to_string(),
        message: "visible right away".to_string(),
        location: Location::new(40.0, -70.0),
    };
    let far = Post {
        user: "2222".to_string(),
        message: "about 490 km north".to_string(),
        location: Location::new(44.4, -70.0),
    };

    client
        .index_post(&Uuid::new_v4().to_string(), &near)
        .await
        .unwrap();
    client
        .index_post(&Uuid::new_v4().to_string(), &far)
        .await
        .unwrap();

    let center = Location::new(40.0, -70.0);

    let posts = client
        .search_nearby(&GeoQuery {
            center,
            radius: Radius::default(),
        })
        .await
        .unwrap();
    assert_eq!(posts, vec![near.clone()]);

    let posts = client
        .search_nearby(&GeoQuery {
            center,
            radius: Radius::parse("500").unwrap(),
        })
        .await
        .unwrap();
    assert_eq!(posts.len(), 2);
    assert!(posts.contains(&far));
}
