use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use tower_http::cors::{Any, CorsLayer};

use crate::browser::BrowserBridge;
use crate::config::QuickmarkConfig;
use crate::error::{CoreError, CoreResult};
use crate::folders::FolderCache;
use crate::popup::Popup;
use crate::store::{detect_store, ActiveTab, ProfileStore, SharedStore, StoreKind};

pub mod browser;
pub mod error;
pub mod folders;
pub mod popup;

pub struct Server {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Server {
    /// Binds `config.listen_addr` and serves in a background task.
    pub async fn new(config: QuickmarkConfig) -> CoreResult<Self> {
        let listener = TcpListener::bind(config.listen_addr).await.map_err(|error| {
            CoreError::Internal(format!("failed to bind {}: {error}", config.listen_addr))
        })?;
        let addr = listener
            .local_addr()
            .map_err(|error| CoreError::Internal(error.to_string()))?;

        let state = Arc::new(ServerState::new(config));
        let app = router(state);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(error) = result {
                tracing::error!("server stopped: {error}");
            }
        });

        tracing::info!("quickmark listening on http://{addr}");
        Ok(Server {
            addr,
            shutdown: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn shutdown(&mut self) -> Result<(), String> {
        if let Some(sender) = self.shutdown.take() {
            sender
                .send(())
                .map_err(|_| "failed to send server shutdown signal".to_string())
        } else {
            Ok(())
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

fn router(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    Router::new()
        .route("/health", get(health))
        .route("/browser/ws", get(browser::ws_handler))
        .route("/browser/status", get(browser::status))
        .route("/tab", get(folders::active_tab))
        .route("/folders", get(folders::search).post(folders::create))
        .route("/folders/refresh", post(folders::refresh))
        .route("/bookmarks", post(folders::save))
        .route("/popup", get(popup::view).post(popup::open))
        .route("/popup/title", post(popup::set_title))
        .route("/popup/picker/input", post(popup::input))
        .route("/popup/picker/key", post(popup::key))
        .route("/popup/picker/select", post(popup::select))
        .route("/popup/picker/focus", post(popup::focus))
        .route("/popup/picker/blur", post(popup::blur))
        .route("/popup/folders/refresh", post(popup::refresh_folders))
        .route("/popup/confirm", post(popup::confirm))
        .route("/popup/cancel", post(popup::cancel))
        .with_state(state)
        .layer(cors)
}

async fn health() -> &'static str {
    "ok"
}

pub(crate) struct ServerState {
    pub(crate) config: QuickmarkConfig,
    pub(crate) bridge: Arc<BrowserBridge>,
    pub(crate) popup: Mutex<Option<Popup>>,
    /// Every request writing the bookmarks file goes through this store's lock.
    profile: Option<ProfileStore>,
    folders: Mutex<Option<CachedFolders>>,
}

struct CachedFolders {
    kind: StoreKind,
    store: SharedStore,
    cache: FolderCache,
}

impl ServerState {
    fn new(config: QuickmarkConfig) -> Self {
        let bridge = Arc::new(BrowserBridge::new(config.bridge_timeout()));
        let profile = config.bookmarks_file.clone().map(ProfileStore::new);
        Self {
            config,
            bridge,
            popup: Mutex::new(None),
            profile,
            folders: Mutex::new(None),
        }
    }

    /// The store for one request. `tab` only matters for the profile store.
    pub(crate) async fn store(&self, tab: Option<ActiveTab>) -> CoreResult<SharedStore> {
        detect_store(&self.bridge, self.profile.as_ref(), tab).await
    }

    /// The folder index shared by the stateless endpoints, built on first use
    /// and rebuilt when the store kind changes.
    pub(crate) async fn folders(&self) -> CoreResult<(SharedStore, FolderCache)> {
        let store = self.store(None).await?;
        let mut cached = self.folders.lock().await;
        if let Some(entry) = cached.as_ref().filter(|entry| entry.kind == store.kind()) {
            return Ok((entry.store.clone(), entry.cache.clone()));
        }

        let cache = FolderCache::new(store.clone());
        cache.refresh().await?;
        *cached = Some(CachedFolders {
            kind: store.kind(),
            store: store.clone(),
            cache: cache.clone(),
        });
        Ok((store, cache))
    }

    pub(crate) async fn forget_folders(&self) {
        self.folders.lock().await.take();
    }
}
