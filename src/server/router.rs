use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::{
    Json, Router,
    routing::{delete, get, patch, post},
};

use super::response::ApiResponse;
use super::{catalog, lists, session, sharing};
use crate::auth::{GoogleVerifier, IdTokenVerifier, PasswordHasher, SessionManager};
use crate::config::ServerConfig;
use crate::store::Store;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub sessions: SessionManager,
    pub passwords: PasswordHasher,
    /// Google ID token verifier; `None` when Google sign-in is not configured.
    pub oauth: Option<Arc<dyn IdTokenVerifier>>,
    /// Public URL of the web app, used to render share links.
    pub app_base_url: String,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: &ServerConfig) -> Self {
        let oauth = config
            .google_client_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .map(|id| Arc::new(GoogleVerifier::new(id)) as Arc<dyn IdTokenVerifier>);

        Self {
            store,
            sessions: SessionManager::new(config.session.clone()),
            passwords: PasswordHasher::new(),
            oauth,
            app_base_url: config.app_base_url.clone(),
        }
    }

    #[must_use]
    pub fn with_verifier(mut self, verifier: Arc<dyn IdTokenVerifier>) -> Self {
        self.oauth = Some(verifier);
        self
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn fallback() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error("Route not found")),
    )
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Session
        .route("/auth/register", post(session::register))
        .route("/auth/login", post(session::login))
        .route("/auth/google", post(session::google_login))
        .route("/auth/logout", post(session::logout))
        .route("/me", get(session::me))
        // Catalog
        .route("/products", get(catalog::search_products))
        .route("/units", get(catalog::search_units))
        // Lists
        .route("/lists", get(lists::list_lists).post(lists::create_list))
        .route(
            "/lists/{id}",
            get(lists::get_list).delete(lists::delete_list),
        )
        // Items
        .route("/lists/{id}/items", post(lists::add_item))
        .route(
            "/lists/{id}/items/{item_id}",
            patch(lists::patch_item).delete(lists::delete_item),
        )
        // Sharing
        .route(
            "/lists/{id}/links",
            get(sharing::list_links).post(sharing::create_link),
        )
        .route(
            "/lists/{id}/links/{link_id}",
            delete(sharing::deactivate_link),
        )
        .route("/lists/{id}/members", get(sharing::list_members))
        .route(
            "/lists/{id}/members/{user_id}",
            delete(sharing::remove_member),
        )
        .route("/links/{token}/redeem", post(sharing::redeem_link))
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_router())
        .fallback(fallback)
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
