use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::RequireUser;
use crate::lists::{self, items};
use crate::server::AppState;
use crate::server::dto::{AddItemRequest, CreateListRequest};
use crate::server::extract::ApiJson;
use crate::server::response::{ApiError, ApiResponse};
use crate::types::{ItemPatch, ListOverview, ListSummary, Role};

pub async fn list_lists(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let lists = lists::lists_for_user(state.store.as_ref(), &auth.user.id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(lists)))
}

pub async fn create_list(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateListRequest>,
) -> impl IntoResponse {
    let list = lists::create_list(
        state.store.as_ref(),
        &auth.user.id,
        &req.name,
        req.photo.as_deref(),
    )?;

    let overview = ListOverview {
        list,
        is_owner: true,
        role: Role::Owner,
        summary: ListSummary::default(),
    };

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(overview))))
}

pub async fn get_list(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let detail = lists::list_detail(state.store.as_ref(), &id, &auth.user.id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(detail)))
}

pub async fn delete_list(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    lists::delete_list(state.store.as_ref(), &id, &auth.user.id)?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

pub async fn add_item(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<AddItemRequest>,
) -> impl IntoResponse {
    let item = items::add_item(
        state.store.as_ref(),
        &id,
        &auth.user.id,
        &req.product,
        req.quantity,
        req.unit_id,
        req.price,
    )?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(item))))
}

pub async fn patch_item(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path((id, item_id)): Path<(String, String)>,
    ApiJson(patch): ApiJson<ItemPatch>,
) -> impl IntoResponse {
    let item = items::patch_item(state.store.as_ref(), &id, &item_id, &auth.user.id, &patch)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(item)))
}

pub async fn delete_item(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path((id, item_id)): Path<(String, String)>,
) -> impl IntoResponse {
    items::delete_item(state.store.as_ref(), &id, &item_id, &auth.user.id)?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
