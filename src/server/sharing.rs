use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::RequireUser;
use crate::lists::sharing;
use crate::server::AppState;
use crate::server::dto::{CreateLinkRequest, LinkResponse, RedeemResponse};
use crate::server::extract::ApiJson;
use crate::server::response::{ApiError, ApiResponse};
use crate::types::{Role, ShareLink};

fn link_response(state: &AppState, link: ShareLink) -> LinkResponse {
    LinkResponse {
        role: sharing::role_from_token(&link.token),
        url: sharing::share_url(&state.app_base_url, &link.token),
        link,
    }
}

pub async fn list_links(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let links: Vec<LinkResponse> = sharing::list_links(state.store.as_ref(), &id, &auth.user.id)?
        .into_iter()
        .map(|link| link_response(&state, link))
        .collect();

    Ok::<_, ApiError>(Json(ApiResponse::success(links)))
}

pub async fn create_link(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<CreateLinkRequest>,
) -> impl IntoResponse {
    let role = match req.role.as_deref() {
        Some(role) => Role::parse_grantable(role)
            .ok_or_else(|| ApiError::bad_request("Role must be 'editor' or 'reader'"))?,
        None => Role::Editor,
    };

    let link = sharing::create_link(state.store.as_ref(), &id, &auth.user.id, role)?;

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(ApiResponse::success(link_response(&state, link))),
    ))
}

pub async fn deactivate_link(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path((id, link_id)): Path<(String, String)>,
) -> impl IntoResponse {
    sharing::deactivate_link(state.store.as_ref(), &id, &link_id, &auth.user.id)?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

pub async fn list_members(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let members = sharing::list_members(state.store.as_ref(), &id, &auth.user.id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(members)))
}

pub async fn remove_member(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path((id, user_id)): Path<(String, String)>,
) -> impl IntoResponse {
    sharing::remove_member(state.store.as_ref(), &id, &user_id, &auth.user.id)?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

pub async fn redeem_link(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> impl IntoResponse {
    let (list, role) = sharing::redeem_link(state.store.as_ref(), &token, &auth.user.id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(RedeemResponse {
        list_id: list.id,
        list_name: list.name,
        role,
    })))
}
