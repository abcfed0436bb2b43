use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use pinhole_cache::MokaUrlCache;
use pinhole_generator::{RandomGenerator, SeqGenerator};
use pinhole_redirector::{CachedRepository, RedirectorService, RedirectorSettings};
use pinhole_shortener::{Shortener, ShortenerService, ShortenerSettings};
use pinhole_storage::{InMemoryRepository, Repository, SqliteRepository};
use tracing::info;

use crate::cli::{GeneratorArg, StorageBackendArg, CLI};
use crate::error::StartupError;
use crate::state::AppState;

/// Opens the configured store and wires both services on top of it.
pub async fn build_state(config: &CLI) -> Result<AppState, StartupError> {
    match config.storage {
        StorageBackendArg::InMemory => with_cache(config, InMemoryRepository::new()),
        StorageBackendArg::Sqlite => {
            let sqlite_url = config
                .sqlite_url
                .as_deref()
                .ok_or(StartupError::MissingSqliteUrl)?;
            let repository = SqliteRepository::connect(sqlite_url).await?;
            info!(sqlite_url = %sqlite_url, "sqlite store ready");
            with_cache(config, repository)
        }
    }
}

fn with_cache<R: Repository>(config: &CLI, repository: R) -> Result<AppState, StartupError> {
    if config.cache_capacity == 0 {
        info!("resolve cache disabled");
        return with_repository(config, Arc::new(repository));
    }

    info!(capacity = config.cache_capacity, "resolve cache enabled");
    let cache = MokaUrlCache::with_capacity(config.cache_capacity);
    with_repository(config, Arc::new(CachedRepository::new(repository, cache)))
}

/// Both services share one repository so that creates warm the resolve cache.
pub fn with_repository<R: Repository>(
    config: &CLI,
    repository: Arc<R>,
) -> Result<AppState, StartupError> {
    let length = usize::from(config.code_length);
    let shortener_settings = ShortenerSettings::builder()
        .max_attempts(config.max_attempts)
        .deadline(config.request_timeout())
        .build();

    let shortener: Arc<dyn Shortener> = match config.generator {
        GeneratorArg::Random => Arc::new(ShortenerService::with_settings(
            Arc::clone(&repository),
            RandomGenerator::new(length)?,
            shortener_settings,
        )),
        GeneratorArg::Seq => Arc::new(ShortenerService::with_settings(
            Arc::clone(&repository),
            SeqGenerator::with_offset(length, config.seq_offset)?,
            shortener_settings,
        )),
    };

    let redirector = Arc::new(RedirectorService::with_settings(
        repository,
        RedirectorSettings::builder()
            .deadline(config.request_timeout())
            .build(),
    ));

    Ok(AppState::new(shortener, redirector, config.base_url.as_str()))
}

pub async fn start_server(
    router: Router,
    addr: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(listen_addr = %listener.local_addr()?, "starting gateway server");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}
