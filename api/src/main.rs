use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::extract::MatchedPath;
use dotenvy::dotenv;
use http::HeaderValue;
use tokio::task::JoinHandle;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use docstore::application::ports::document_cache::DocumentCache;
use docstore::bootstrap::app_context::{AppContext, AppServices};
use docstore::bootstrap::config::Config;
use docstore::infrastructure::cache::memory_cache::MemoryDocumentCache;
use docstore::infrastructure::cache::sweeper::spawn_sweeper;
use docstore::infrastructure::db::repositories::document_repository_sqlx::SqlxDocumentRepository;
use docstore::infrastructure::db::repositories::session_repository_sqlx::SqlxSessionRepository;
use docstore::infrastructure::db::repositories::user_repository_sqlx::SqlxUserRepository;
use docstore::infrastructure::storage::FsBlobStore;
use docstore::presentation::http::{api_routes, health};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
        paths(
            docstore::presentation::http::auth::register,
            docstore::presentation::http::auth::login,
            docstore::presentation::http::auth::logout,
            docstore::presentation::http::documents::upload_document,
            docstore::presentation::http::documents::list_documents,
            docstore::presentation::http::documents::get_document,
            docstore::presentation::http::documents::delete_document,
            docstore::presentation::http::health::health,
        ),
        components(schemas(
            docstore::presentation::http::envelope::ApiErrorBody,
            docstore::presentation::http::auth::RegisterRequest,
            docstore::presentation::http::auth::RegisterResponse,
            docstore::presentation::http::auth::LoginRequest,
            docstore::presentation::http::auth::LoginResponse,
            docstore::presentation::http::documents::DocumentItem,
            docstore::presentation::http::documents::DocumentListResponse,
            docstore::presentation::http::documents::UploadResponse,
            docstore::presentation::http::documents::UploadMeta,
            docstore::presentation::http::documents::UploadDocumentMultipart,
            docstore::presentation::http::health::HealthResp,
        )),
        tags(
            (name = "Auth", description = "Registration and sessions"),
            (name = "Documents", description = "Document upload, listing and retrieval"),
            (name = "Health", description = "System health checks")
        )
    )]
struct ApiDoc;

fn cors_layer(cfg: &Config) -> CorsLayer {
    let methods = [
        http::Method::GET,
        http::Method::POST,
        http::Method::DELETE,
        http::Method::HEAD,
        http::Method::OPTIONS,
    ];
    let headers = [http::header::CONTENT_TYPE, http::header::AUTHORIZATION];
    match cfg.frontend_url.as_deref().map(HeaderValue::from_str) {
        Some(Ok(origin)) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(methods)
            .allow_headers(headers)
            .allow_credentials(true),
        // production refuses to start without FRONTEND_URL; deny everything if it is unusable
        _ if cfg.is_production => CorsLayer::new()
            .allow_origin(AllowOrigin::exact(HeaderValue::from_static(
                "http://invalid",
            )))
            .allow_methods(methods)
            .allow_headers(headers),
        _ => CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(methods)
            .allow_headers(headers)
            .allow_credentials(true),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "docstore=debug,axum=info,tower_http=info".into()),
        )
        .init();

    let cfg = Config::from_env()?;
    info!(
        port = cfg.api_port,
        production = cfg.is_production,
        uploads_dir = %cfg.uploads_dir,
        "Starting docstore"
    );

    // Database
    let pool =
        docstore::infrastructure::db::connect_pool(&cfg.database_url, cfg.db_max_connections)
            .await?;
    docstore::infrastructure::db::migrate(&pool).await?;

    let document_repo = Arc::new(SqlxDocumentRepository::new(pool.clone()));
    let user_repo = Arc::new(SqlxUserRepository::new(pool.clone()));
    let session_repo = Arc::new(SqlxSessionRepository::new(pool.clone()));

    let blob_store = Arc::new(FsBlobStore::new(&cfg.uploads_dir));
    if let Err(e) = blob_store.ensure_root().await {
        warn!(error = ?e, dir = %cfg.uploads_dir, "Failed to create uploads dir");
    }
    let cache: Arc<dyn DocumentCache> = Arc::new(MemoryDocumentCache::new());

    let services = AppServices::new(
        document_repo,
        user_repo.clone(),
        user_repo,
        session_repo,
        blob_store,
        cache.clone(),
    );
    let ctx = AppContext::new(cfg.clone(), services);

    let app = Router::new()
        .nest("/api", health::routes(pool.clone(), cache.clone()))
        .merge(api_routes(ctx))
        .merge(SwaggerUi::new("/api/swagger").url("/api/openapi.json", ApiDoc::openapi()))
        .layer(cors_layer(&cfg))
        // Global body size limit for uploads (configurable)
        .layer(DefaultBodyLimit::max(cfg.upload_max_bytes))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                let matched = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                tracing::info_span!("http", %method, %uri, matched_path = %matched)
            }),
        );

    let api_addr = SocketAddr::from(([0, 0, 0, 0], cfg.api_port));
    info!(%api_addr, "HTTP API listening");
    let listener = tokio::net::TcpListener::bind(api_addr).await?;

    let api_handle: JoinHandle<anyhow::Result<()>> = tokio::spawn(async move {
        axum::serve(listener, app).await?;
        Ok(())
    });

    // Background cache eviction
    let sweep_handle = spawn_sweeper(cache, cfg.cache_sweep_interval());

    match api_handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(?e, "API server task failed"),
        Err(e) => error!(?e, "API server task panicked"),
    }

    sweep_handle.abort();
    if let Err(e) = sweep_handle.await {
        if !e.is_cancelled() {
            error!(?e, "Cache sweeper task panicked");
        }
    }
    Ok(())
}
