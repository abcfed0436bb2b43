use std::collections::HashSet;
use std::sync::Arc;

use pinhole_core::{ReadRepository, ShortCode};
use pinhole_generator::{Generator, RandomGenerator};
use pinhole_shortener::{Shortener, ShortenerService, ShortenerSettings};
use pinhole_storage::InMemoryRepository;
use rand::Rng;

const CONCURRENT_CREATES: usize = 1_000;

/// Draws from a deliberately tiny code space so that concurrent creates
/// collide constantly.
struct NarrowGenerator {
    space: u32,
}

impl Generator for NarrowGenerator {
    type Output = ShortCode;

    fn generate(&self, _original_url: &str) -> ShortCode {
        let n = rand::rng().random_range(0..self.space);
        ShortCode::new_unchecked(format!("c{:05}", n))
    }
}

async fn create_all<G: Generator>(
    service: Arc<ShortenerService<InMemoryRepository, G>>,
) -> Vec<(ShortCode, String)> {
    let handles: Vec<_> = (0..CONCURRENT_CREATES)
        .map(|i| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                let url = format!("https://example.com/page/{i}");
                let shortened = service.shorten(&url).await.unwrap();
                (shortened.code, url)
            })
        })
        .collect();

    let mut created = Vec::with_capacity(CONCURRENT_CREATES);
    for handle in handles {
        created.push(handle.await.unwrap());
    }
    created
}

async fn assert_unique_and_resolvable(
    repository: &InMemoryRepository,
    created: &[(ShortCode, String)],
) {
    let codes: HashSet<_> = created.iter().map(|(code, _)| code.clone()).collect();
    assert_eq!(codes.len(), CONCURRENT_CREATES, "duplicate codes handed out");
    assert_eq!(repository.len(), CONCURRENT_CREATES);

    for (code, url) in created {
        let record = repository.get(code).await.unwrap().unwrap();
        assert_eq!(&record.original_url, url);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_creates_never_share_a_code() {
    let repository = Arc::new(InMemoryRepository::new());
    let service = Arc::new(ShortenerService::new(
        Arc::clone(&repository),
        RandomGenerator::new(6).unwrap(),
    ));

    let created = create_all(service).await;

    assert_unique_and_resolvable(&repository, &created).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_creates_stay_unique_under_heavy_collisions() {
    let repository = Arc::new(InMemoryRepository::new());
    let service = Arc::new(ShortenerService::with_settings(
        Arc::clone(&repository),
        NarrowGenerator { space: 4_000 },
        ShortenerSettings::builder().max_attempts(200).build(),
    ));

    let created = create_all(service).await;

    assert_unique_and_resolvable(&repository, &created).await;
}
