//! Run against a live Redis with `REDIS_URI` set:
//! `cargo test -p tiercache-remote --test redis_tests -- --ignored`
#[cfg(feature = "redis")]
#[cfg(test)]
mod tests {
    use dotenvy::dotenv;
    use serial_test::serial;
    use std::collections::BTreeSet;
    use tiercache_remote::{
        AtomicOp, ConnectOptions, RemoteCacheClient, RemoteError, RemoteStore,
        TagExpression,
    };

    async fn get_redis_client() -> RemoteCacheClient {
        dotenv().ok();
        let uri = std::env::var("REDIS_URI").expect("Set REDIS_URI env variable");
        RemoteCacheClient::connect(&uri)
            .await
            .expect("Error while establishing redis connection")
    }

    async fn cleanup(client: &RemoteCacheClient, prefix: &str) {
        let keys = client
            .keys(&format!("{}*", prefix))
            .await
            .expect("Failed to list keys");
        if !keys.is_empty() {
            client
                .execute_atomic(AtomicOp::Delete, &keys)
                .await
                .expect("Failed to clean up Redis keys");
        }
    }

    #[tokio::test]
    #[ignore]
    #[serial]
    async fn test_get_set_roundtrip() {
        let client = get_redis_client().await;
        cleanup(&client, "tiercache-test-kv").await;

        assert_eq!(client.get("tiercache-test-kv:missing").await.unwrap(), None);
        client.set("tiercache-test-kv:a", "body").await.unwrap();
        client
            .set_with_expiry("tiercache-test-kv:b", 60, "body")
            .await
            .unwrap();
        assert_eq!(
            client.get("tiercache-test-kv:a").await.unwrap().as_deref(),
            Some("body")
        );
        let ttl = client.ttl("tiercache-test-kv:b").await.unwrap();
        assert!(ttl > 0 && ttl <= 60);

        cleanup(&client, "tiercache-test-kv").await;
    }

    #[tokio::test]
    #[ignore]
    #[serial]
    async fn test_tag_invalidation_workflow() {
        let client = get_redis_client().await;
        cleanup(&client, "tiercache-test-tag").await;

        let (t1, t2, t3) = (
            "tiercache-test-tag:t1",
            "tiercache-test-tag:t2",
            "tiercache-test-tag:t3",
        );
        let k1 = "tiercache-test-tag:k1";
        let k2 = "tiercache-test-tag:k2";
        client.set(k1, "one").await.unwrap();
        client.set(k2, "two").await.unwrap();
        assert_eq!(client.add_tags_to_key(k1, &[t1, t2]).await.unwrap(), 2);
        assert_eq!(client.add_tags_to_key(k1, &[t1]).await.unwrap(), 0);
        client.add_tags_to_key(k2, &[t1, t3]).await.unwrap();

        let result = client
            .remove_keys_from_tags(TagExpression::grouped([[t1, t2], [t3, t3]]))
            .await
            .unwrap();
        assert_eq!(
            result.attempted,
            BTreeSet::from([k1.to_string(), k2.to_string()])
        );
        assert_eq!(result.really_deleted, 2);
        assert_eq!(client.get(k1).await.unwrap(), None);
        assert!(client.store().smembers(t1).await.unwrap().is_empty());

        cleanup(&client, "tiercache-test-tag").await;
    }

    #[tokio::test]
    #[ignore]
    #[serial]
    async fn test_invalidate_ten_thousand_keys() {
        let client = get_redis_client().await;
        cleanup(&client, "tiercache-test-bulk").await;

        let tag = "tiercache-test-bulk:catalog";
        for i in 0..10_000 {
            let key = format!("tiercache-test-bulk:k{}", i);
            client.set(&key, "body").await.unwrap();
            client.add_tags_to_key(&key, &[tag]).await.unwrap();
        }

        let result = client
            .remove_keys_from_tags(TagExpression::flat([tag]))
            .await
            .unwrap();
        assert_eq!(result.attempted.len(), 10_000);
        assert_eq!(result.really_deleted, 10_000);
        assert!(client.store().smembers(tag).await.unwrap().is_empty());

        cleanup(&client, "tiercache-test-bulk").await;
    }

    #[tokio::test]
    #[ignore]
    #[serial]
    async fn test_connect_with_timeouts() {
        dotenv().ok();
        let uri = std::env::var("REDIS_URI").expect("Set REDIS_URI env variable");
        let options = ConnectOptions::from_millis(Some(2000), Some(500));
        let client = RemoteCacheClient::connect_with(&uri, options)
            .await
            .expect("Error while establishing redis connection");
        assert_eq!(client.get("tiercache-test-timeout:missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_connection_failure_is_fatal() {
        let result = RemoteCacheClient::connect("redis://127.0.0.1:1").await;
        assert!(matches!(result, Err(RemoteError::Connection { .. })));
    }

    #[tokio::test]
    async fn test_invalid_descriptor_rejected_before_connecting() {
        let result = RemoteCacheClient::connect("[ ]").await;
        assert!(matches!(result, Err(RemoteError::InvalidDsn(_))));
    }
}
