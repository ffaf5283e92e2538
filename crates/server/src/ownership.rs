//! `/my/*` endpoints: the caller's working set of catalog entries.
//!
//! POST is get-or-create plus claim; DELETE drops the claim and reclaims the
//! catalog row when nobody else (ledger included) depends on it.

use api_types::catalog::{
    CategoryNew, CategoryView, StatusNew, StatusView, SubcategoryNew, SubcategoryQuery,
    SubcategoryView, TypeNew, TypeView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::CatalogScope;

use crate::{
    ServerError,
    catalog::{category_view, status_view, subcategory_view, type_view},
    server::ServerState,
    user,
};

pub async fn my_statuses(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<StatusView>>, ServerError> {
    let rows = state
        .engine
        .list_statuses(CatalogScope::Owned(&user.username))
        .await?;
    Ok(Json(rows.into_iter().map(status_view).collect()))
}

pub async fn add_status(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<StatusNew>,
) -> Result<(StatusCode, Json<StatusView>), ServerError> {
    let model = state
        .engine
        .add_status(
            &user.username,
            &payload.name,
            payload.description.as_deref().unwrap_or(""),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(status_view(model))))
}

pub async fn remove_status(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.detach_status(&user.username, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn my_types(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<TypeView>>, ServerError> {
    let rows = state
        .engine
        .list_types(CatalogScope::Owned(&user.username))
        .await?;
    Ok(Json(rows.into_iter().map(type_view).collect()))
}

pub async fn add_type(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TypeNew>,
) -> Result<(StatusCode, Json<TypeView>), ServerError> {
    let model = state.engine.add_type(&user.username, &payload.name).await?;
    Ok((StatusCode::CREATED, Json(type_view(model))))
}

pub async fn remove_type(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.detach_type(&user.username, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn my_categories(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let rows = state
        .engine
        .list_categories(CatalogScope::Owned(&user.username))
        .await?;
    Ok(Json(rows.into_iter().map(category_view).collect()))
}

pub async fn add_category(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let entry = state
        .engine
        .add_category(&user.username, &payload.name, payload.type_id)
        .await?;
    Ok((StatusCode::CREATED, Json(category_view(entry))))
}

pub async fn remove_category(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.detach_category(&user.username, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn my_subcategories(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<SubcategoryQuery>,
) -> Result<Json<Vec<SubcategoryView>>, ServerError> {
    let rows = state
        .engine
        .list_subcategories(CatalogScope::Owned(&user.username), query.category)
        .await?;
    Ok(Json(rows.into_iter().map(subcategory_view).collect()))
}

pub async fn add_subcategory(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<SubcategoryNew>,
) -> Result<(StatusCode, Json<SubcategoryView>), ServerError> {
    let entry = state
        .engine
        .add_subcategory(&user.username, &payload.name, payload.category_id)
        .await?;
    Ok((StatusCode::CREATED, Json(subcategory_view(entry))))
}

pub async fn remove_subcategory(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.detach_subcategory(&user.username, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
