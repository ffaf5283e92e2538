//! Money-flow API endpoints.

use api_types::money_flow::{
    MoneyFlowNew, MoneyFlowQuery, MoneyFlowUpdate, MoneyFlowView, NamedRef,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{MoneyCents, MoneyFlowDraft, MoneyFlowListFilter, MoneyFlowPatch, MoneyFlowRecord};

use crate::{ServerError, server::ServerState, user};

fn view(record: MoneyFlowRecord) -> MoneyFlowView {
    MoneyFlowView {
        id: record.id,
        created_at: record.created_at,
        status: NamedRef {
            id: record.status_id,
            name: record.status_name,
        },
        flow_type: NamedRef {
            id: record.type_id,
            name: record.type_name,
        },
        category: NamedRef {
            id: record.category_id,
            name: record.category_name,
        },
        subcategory: NamedRef {
            id: record.subcategory_id,
            name: record.subcategory_name,
        },
        amount: MoneyCents::new(record.amount_cents).to_string(),
        comment: record.comment,
    }
}

fn draft(payload: MoneyFlowNew) -> Result<MoneyFlowDraft, ServerError> {
    Ok(MoneyFlowDraft {
        created_at: payload.created_at,
        status_id: payload.status_id,
        type_id: payload.type_id,
        category_id: payload.category_id,
        subcategory_id: payload.subcategory_id,
        amount: payload.amount.parse::<MoneyCents>()?,
        comment: payload.comment.unwrap_or_default(),
    })
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<MoneyFlowQuery>,
) -> Result<Json<Vec<MoneyFlowView>>, ServerError> {
    let filter = MoneyFlowListFilter {
        start_date: query.start_date,
        end_date: query.end_date,
        status_contains: query.status,
        type_contains: query.type_name,
        category_contains: query.category,
        subcategory_contains: query.subcategory,
    };

    let records = state
        .engine
        .list_money_flows(&user.username, &filter)
        .await?;
    Ok(Json(records.into_iter().map(view).collect()))
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<MoneyFlowNew>,
) -> Result<(StatusCode, Json<MoneyFlowView>), ServerError> {
    let record = state
        .engine
        .new_money_flow(&user.username, draft(payload)?)
        .await?;
    Ok((StatusCode::CREATED, Json(view(record))))
}

pub async fn bulk_create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<Vec<MoneyFlowNew>>,
) -> Result<(StatusCode, Json<Vec<MoneyFlowView>>), ServerError> {
    // Parse every amount up front so one bad item rejects the whole batch
    // before the engine sees it.
    let drafts = payload
        .into_iter()
        .map(draft)
        .collect::<Result<Vec<_>, _>>()?;

    let records = state
        .engine
        .bulk_new_money_flows(&user.username, drafts)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(records.into_iter().map(view).collect()),
    ))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<MoneyFlowUpdate>,
) -> Result<Json<MoneyFlowView>, ServerError> {
    let patch = MoneyFlowPatch {
        created_at: payload.created_at,
        status_id: payload.status_id,
        type_id: payload.type_id,
        category_id: payload.category_id,
        subcategory_id: payload.subcategory_id,
        amount: payload
            .amount
            .as_deref()
            .map(str::parse::<MoneyCents>)
            .transpose()?,
        comment: payload.comment,
    };

    let record = state
        .engine
        .update_money_flow(id, &user.username, patch)
        .await?;
    Ok(Json(view(record)))
}

pub async fn remove(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_money_flow(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
