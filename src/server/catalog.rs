use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};

use crate::auth::RequireUser;
use crate::catalog;
use crate::server::AppState;
use crate::server::dto::SearchParams;
use crate::server::response::{ApiError, ApiResponse};

pub async fn search_products(
    _auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let products = catalog::search_products(state.store.as_ref(), &params.q)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(products)))
}

pub async fn search_units(
    _auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let units = catalog::search_units(state.store.as_ref(), &params.q)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(units)))
}
