use std::sync::Arc;

use jiff::Timestamp;
use pinhole_core::{ShortCode, UrlRecord};
use pinhole_storage::{ReadRepository, Repository, SqliteRepository};

async fn repository() -> SqliteRepository {
    SqliteRepository::connect("sqlite::memory:")
        .await
        .expect("open in-memory sqlite")
}

fn code(value: &str) -> ShortCode {
    ShortCode::new_unchecked(value)
}

fn record(url: &str) -> UrlRecord {
    UrlRecord {
        original_url: url.to_string(),
        created_at: Timestamp::from_second(1_700_000_000).unwrap(),
        hit_count: 0,
    }
}

#[tokio::test]
async fn put_and_get_record() {
    let repo = repository().await;
    let short_code = code("aZ3dK9");

    assert!(repo
        .put_if_absent(&short_code, record("https://example.com/a/very/long/path"))
        .await
        .unwrap());

    let got = repo.get(&short_code).await.unwrap().unwrap();
    assert_eq!(got, record("https://example.com/a/very/long/path"));
}

#[tokio::test]
async fn get_missing_code_returns_none() {
    let repo = repository().await;

    assert!(repo.get(&code("doesnotexist")).await.unwrap().is_none());
    assert!(!repo.exists(&code("doesnotexist")).await.unwrap());
}

#[tokio::test]
async fn put_if_absent_rejects_taken_code() {
    let repo = repository().await;
    let short_code = code("taken1");

    assert!(repo
        .put_if_absent(&short_code, record("https://first.example"))
        .await
        .unwrap());
    assert!(!repo
        .put_if_absent(&short_code, record("https://second.example"))
        .await
        .unwrap());

    let got = repo.get(&short_code).await.unwrap().unwrap();
    assert_eq!(got.original_url, "https://first.example");
    assert!(repo.exists(&short_code).await.unwrap());
}

#[tokio::test]
async fn find_by_url_returns_oldest_mapping() {
    let repo = repository().await;

    assert!(repo.find_by_url("https://example.com").await.unwrap().is_none());

    repo.put_if_absent(&code("first1"), record("https://example.com"))
        .await
        .unwrap();
    repo.put_if_absent(&code("second"), record("https://example.com"))
        .await
        .unwrap();

    assert_eq!(
        repo.find_by_url("https://example.com").await.unwrap(),
        Some(code("first1"))
    );
}

#[tokio::test]
async fn increment_hits_updates_counter() {
    let repo = repository().await;
    let short_code = code("hits01");
    repo.put_if_absent(&short_code, record("https://example.com"))
        .await
        .unwrap();

    for _ in 0..3 {
        repo.increment_hits(&short_code).await.unwrap();
    }
    repo.increment_hits(&code("nohits")).await.unwrap();

    let got = repo.get(&short_code).await.unwrap().unwrap();
    assert_eq!(got.hit_count, 3);
}

#[tokio::test]
async fn concurrent_puts_on_same_code_have_one_winner() {
    let repo = Arc::new(repository().await);

    let handles: Vec<_> = (0..32)
        .map(|i| {
            let repo = Arc::clone(&repo);
            tokio::spawn(async move {
                repo.put_if_absent(&code("contested"), record(&format!("https://e{i}.example")))
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        if handle.await.unwrap() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn file_database_survives_reconnect() {
    let dir = std::env::temp_dir().join(format!(
        "pinhole-sqlite-{}-{}",
        std::process::id(),
        Timestamp::now().as_nanosecond()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    let url = format!("sqlite://{}", dir.join("pinhole.db").display());

    {
        let repo = SqliteRepository::connect(&url).await.unwrap();
        repo.put_if_absent(&code("durable"), record("https://example.com"))
            .await
            .unwrap();
        repo.pool().close().await;
    }

    let reopened = SqliteRepository::connect(&url).await.unwrap();
    let got = reopened.get(&code("durable")).await.unwrap().unwrap();
    assert_eq!(got.original_url, "https://example.com");

    reopened.pool().close().await;
    let _ = std::fs::remove_dir_all(&dir);
}
