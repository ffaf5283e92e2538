//! Global catalog endpoints: the whole taxonomy, readable by anyone.

use api_types::catalog::{CategoryView, StatusView, SubcategoryQuery, SubcategoryView, TypeView};
use axum::{
    Json,
    extract::{Query, State},
};
use engine::{CatalogScope, CategoryEntry, SubcategoryEntry};

use crate::{ServerError, server::ServerState};

pub(crate) fn status_view(model: engine::statuses::Model) -> StatusView {
    StatusView {
        id: model.id,
        name: model.name,
        description: model.description,
    }
}

pub(crate) fn type_view(model: engine::types::Model) -> TypeView {
    TypeView {
        id: model.id,
        name: model.name,
    }
}

pub(crate) fn category_view(entry: CategoryEntry) -> CategoryView {
    CategoryView {
        id: entry.id,
        name: entry.name,
        type_id: entry.type_id,
        type_name: entry.type_name,
    }
}

pub(crate) fn subcategory_view(entry: SubcategoryEntry) -> SubcategoryView {
    SubcategoryView {
        id: entry.id,
        name: entry.name,
        category_id: entry.category_id,
        category_name: entry.category_name,
    }
}

pub async fn statuses(State(state): State<ServerState>) -> Result<Json<Vec<StatusView>>, ServerError> {
    let rows = state.engine.list_statuses(CatalogScope::Global).await?;
    Ok(Json(rows.into_iter().map(status_view).collect()))
}

pub async fn types(State(state): State<ServerState>) -> Result<Json<Vec<TypeView>>, ServerError> {
    let rows = state.engine.list_types(CatalogScope::Global).await?;
    Ok(Json(rows.into_iter().map(type_view).collect()))
}

pub async fn categories(
    State(state): State<ServerState>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let rows = state.engine.list_categories(CatalogScope::Global).await?;
    Ok(Json(rows.into_iter().map(category_view).collect()))
}

pub async fn subcategories(
    State(state): State<ServerState>,
    Query(query): Query<SubcategoryQuery>,
) -> Result<Json<Vec<SubcategoryView>>, ServerError> {
    let rows = state
        .engine
        .list_subcategories(CatalogScope::Global, query.category)
        .await?;
    Ok(Json(rows.into_iter().map(subcategory_view).collect()))
}
