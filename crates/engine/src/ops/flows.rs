//! The money-flow ledger: user-scoped create/update/delete and queries.

use sea_orm::{
    ActiveValue, DatabaseTransaction, FromQueryResult, JoinType, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait, prelude::*, sea_query::SimpleExpr,
};

use crate::{
    EngineError, MoneyCents, ResultEngine, categories, money_flows, statuses, subcategories, types,
};

use super::{Engine, with_tx};

/// Fields for a new ledger entry. The owner is never part of the draft: the
/// engine stamps the authenticated caller on every create.
#[derive(Clone, Debug)]
pub struct MoneyFlowDraft {
    pub created_at: Date,
    pub status_id: i32,
    pub type_id: i32,
    pub category_id: i32,
    pub subcategory_id: i32,
    pub amount: MoneyCents,
    pub comment: String,
}

/// Explicit patch for an existing entry: only these fields are mutable, a
/// `None` keeps the stored value. There is deliberately no way to move an
/// entry to another user.
#[derive(Clone, Debug, Default)]
pub struct MoneyFlowPatch {
    pub created_at: Option<Date>,
    pub status_id: Option<i32>,
    pub type_id: Option<i32>,
    pub category_id: Option<i32>,
    pub subcategory_id: Option<i32>,
    pub amount: Option<MoneyCents>,
    pub comment: Option<String>,
}

/// A ledger row with its four taxonomy names resolved.
#[derive(Clone, Debug, PartialEq, Eq, FromQueryResult)]
pub struct MoneyFlowRecord {
    pub id: i32,
    pub user_id: Option<String>,
    pub created_at: Date,
    pub status_id: i32,
    pub status_name: String,
    pub type_id: i32,
    pub type_name: String,
    pub category_id: i32,
    pub category_name: String,
    pub subcategory_id: i32,
    pub subcategory_name: String,
    pub amount_cents: i64,
    pub comment: String,
}

/// Filters for listing ledger entries. Date bounds are inclusive; name
/// filters are case-insensitive substring matches.
#[derive(Clone, Debug, Default)]
pub struct MoneyFlowListFilter {
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub status_contains: Option<String>,
    pub type_contains: Option<String>,
    pub category_contains: Option<String>,
    pub subcategory_contains: Option<String>,
}

struct FlowRefs {
    status: statuses::Model,
    flow_type: types::Model,
    category: categories::Model,
    subcategory: subcategories::Model,
}

// Case folding happens on both sides in SQL so the comparison stays
// consistent across the backend's folding rules.
fn name_contains(table: &str, needle: &str) -> SimpleExpr {
    Expr::cust_with_values(
        format!("LOWER({table}.name) LIKE '%' || LOWER(?) || '%'"),
        [needle],
    )
    .into()
}

impl Engine {
    async fn load_flow_refs(
        db: &DatabaseTransaction,
        status_id: i32,
        type_id: i32,
        category_id: i32,
        subcategory_id: i32,
    ) -> ResultEngine<FlowRefs> {
        let status = statuses::Entity::find_by_id(status_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("status not exists".to_string()))?;
        let flow_type = types::Entity::find_by_id(type_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("type not exists".to_string()))?;
        let category = categories::Entity::find_by_id(category_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?;
        let subcategory = subcategories::Entity::find_by_id(subcategory_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("subcategory not exists".to_string()))?;

        Ok(FlowRefs {
            status,
            flow_type,
            category,
            subcategory,
        })
    }

    /// Runs the full rule set for a draft: strictly positive amount, the
    /// subcategory belongs to the named category, and every reference sits in
    /// the caller's working set (a row outside it reads like a missing one).
    async fn validate_draft(
        db: &DatabaseTransaction,
        user_id: &str,
        draft: &MoneyFlowDraft,
    ) -> ResultEngine<FlowRefs> {
        if !draft.amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "amount must be > 0".to_string(),
            ));
        }

        let refs = Self::load_flow_refs(
            db,
            draft.status_id,
            draft.type_id,
            draft.category_id,
            draft.subcategory_id,
        )
        .await?;
        if refs.subcategory.category_id != draft.category_id {
            return Err(EngineError::HierarchyMismatch(format!(
                "subcategory '{}' does not belong to category '{}'",
                refs.subcategory.name, refs.category.name
            )));
        }

        if !Self::status_owned(db, user_id, draft.status_id).await? {
            return Err(EngineError::KeyNotFound("status not exists".to_string()));
        }
        if !Self::type_owned(db, user_id, draft.type_id).await? {
            return Err(EngineError::KeyNotFound("type not exists".to_string()));
        }
        if !Self::category_owned(db, user_id, draft.category_id).await? {
            return Err(EngineError::KeyNotFound("category not exists".to_string()));
        }
        if !Self::subcategory_owned(db, user_id, draft.subcategory_id).await? {
            return Err(EngineError::KeyNotFound(
                "subcategory not exists".to_string(),
            ));
        }

        Ok(refs)
    }

    async fn insert_flow(
        db: &DatabaseTransaction,
        user_id: &str,
        draft: &MoneyFlowDraft,
    ) -> ResultEngine<money_flows::Model> {
        let active = money_flows::ActiveModel {
            user_id: ActiveValue::Set(Some(user_id.to_string())),
            created_at: ActiveValue::Set(draft.created_at),
            status_id: ActiveValue::Set(draft.status_id),
            type_id: ActiveValue::Set(draft.type_id),
            category_id: ActiveValue::Set(draft.category_id),
            subcategory_id: ActiveValue::Set(draft.subcategory_id),
            amount_cents: ActiveValue::Set(draft.amount.cents()),
            comment: ActiveValue::Set(draft.comment.clone()),
            ..Default::default()
        };
        active.insert(db).await.map_err(Into::into)
    }

    fn record(model: money_flows::Model, refs: &FlowRefs) -> MoneyFlowRecord {
        MoneyFlowRecord {
            id: model.id,
            user_id: model.user_id,
            created_at: model.created_at,
            status_id: model.status_id,
            status_name: refs.status.name.clone(),
            type_id: model.type_id,
            type_name: refs.flow_type.name.clone(),
            category_id: model.category_id,
            category_name: refs.category.name.clone(),
            subcategory_id: model.subcategory_id,
            subcategory_name: refs.subcategory.name.clone(),
            amount_cents: model.amount_cents,
            comment: model.comment,
        }
    }

    /// Creates a ledger entry for the caller.
    pub async fn new_money_flow(
        &self,
        user_id: &str,
        draft: MoneyFlowDraft,
    ) -> ResultEngine<MoneyFlowRecord> {
        with_tx!(self, |db_tx| {
            let refs = Self::validate_draft(&db_tx, user_id, &draft).await?;
            let model = Self::insert_flow(&db_tx, user_id, &draft).await?;
            Ok(Self::record(model, &refs))
        })
    }

    /// Creates several ledger entries, all-or-nothing: every draft is
    /// validated before the first insert, and the transaction covers the
    /// whole batch.
    pub async fn bulk_new_money_flows(
        &self,
        user_id: &str,
        drafts: Vec<MoneyFlowDraft>,
    ) -> ResultEngine<Vec<MoneyFlowRecord>> {
        with_tx!(self, |db_tx| {
            let mut refs = Vec::with_capacity(drafts.len());
            for draft in &drafts {
                refs.push(Self::validate_draft(&db_tx, user_id, draft).await?);
            }

            let mut records = Vec::with_capacity(drafts.len());
            for (draft, refs) in drafts.iter().zip(&refs) {
                let model = Self::insert_flow(&db_tx, user_id, draft).await?;
                records.push(Self::record(model, refs));
            }
            Ok(records)
        })
    }

    /// Updates a ledger entry owned by the caller.
    ///
    /// The merged field set is re-validated as a whole; ownership of a
    /// taxonomy reference is only re-checked when the patch names it, so
    /// entries keep working after their references were detached.
    pub async fn update_money_flow(
        &self,
        id: i32,
        user_id: &str,
        patch: MoneyFlowPatch,
    ) -> ResultEngine<MoneyFlowRecord> {
        with_tx!(self, |db_tx| {
            let existing = money_flows::Entity::find_by_id(id)
                .filter(money_flows::Column::UserId.eq(user_id))
                .one(&db_tx)
                .await?
                // Missing and not-yours read the same on purpose.
                .ok_or_else(|| EngineError::KeyNotFound("money_flow not exists".to_string()))?;

            let merged = MoneyFlowDraft {
                created_at: patch.created_at.unwrap_or(existing.created_at),
                status_id: patch.status_id.unwrap_or(existing.status_id),
                type_id: patch.type_id.unwrap_or(existing.type_id),
                category_id: patch.category_id.unwrap_or(existing.category_id),
                subcategory_id: patch.subcategory_id.unwrap_or(existing.subcategory_id),
                amount: patch
                    .amount
                    .unwrap_or_else(|| MoneyCents::new(existing.amount_cents)),
                comment: patch
                    .comment
                    .clone()
                    .unwrap_or_else(|| existing.comment.clone()),
            };

            if !merged.amount.is_positive() {
                return Err(EngineError::InvalidAmount(
                    "amount must be > 0".to_string(),
                ));
            }
            let refs = Self::load_flow_refs(
                &db_tx,
                merged.status_id,
                merged.type_id,
                merged.category_id,
                merged.subcategory_id,
            )
            .await?;
            if refs.subcategory.category_id != merged.category_id {
                return Err(EngineError::HierarchyMismatch(format!(
                    "subcategory '{}' does not belong to category '{}'",
                    refs.subcategory.name, refs.category.name
                )));
            }

            if patch.status_id.is_some()
                && !Self::status_owned(&db_tx, user_id, merged.status_id).await?
            {
                return Err(EngineError::KeyNotFound("status not exists".to_string()));
            }
            if patch.type_id.is_some() && !Self::type_owned(&db_tx, user_id, merged.type_id).await?
            {
                return Err(EngineError::KeyNotFound("type not exists".to_string()));
            }
            if patch.category_id.is_some()
                && !Self::category_owned(&db_tx, user_id, merged.category_id).await?
            {
                return Err(EngineError::KeyNotFound("category not exists".to_string()));
            }
            if patch.subcategory_id.is_some()
                && !Self::subcategory_owned(&db_tx, user_id, merged.subcategory_id).await?
            {
                return Err(EngineError::KeyNotFound(
                    "subcategory not exists".to_string(),
                ));
            }

            let mut active: money_flows::ActiveModel = existing.into();
            active.created_at = ActiveValue::Set(merged.created_at);
            active.status_id = ActiveValue::Set(merged.status_id);
            active.type_id = ActiveValue::Set(merged.type_id);
            active.category_id = ActiveValue::Set(merged.category_id);
            active.subcategory_id = ActiveValue::Set(merged.subcategory_id);
            active.amount_cents = ActiveValue::Set(merged.amount.cents());
            active.comment = ActiveValue::Set(merged.comment);
            let model = active.update(&db_tx).await?;

            Ok(Self::record(model, &refs))
        })
    }

    /// Deletes a ledger entry owned by the caller.
    pub async fn delete_money_flow(&self, id: i32, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let res = money_flows::Entity::delete_many()
                .filter(money_flows::Column::Id.eq(id))
                .filter(money_flows::Column::UserId.eq(user_id))
                .exec(&db_tx)
                .await?;
            if res.rows_affected == 0 {
                return Err(EngineError::KeyNotFound("money_flow not exists".to_string()));
            }
            Ok(())
        })
    }

    /// Lists the caller's ledger entries, newest first, with the four
    /// taxonomy names resolved.
    pub async fn list_money_flows(
        &self,
        user_id: &str,
        filter: &MoneyFlowListFilter,
    ) -> ResultEngine<Vec<MoneyFlowRecord>> {
        let mut query = money_flows::Entity::find()
            .filter(money_flows::Column::UserId.eq(user_id))
            .join(JoinType::InnerJoin, money_flows::Relation::Statuses.def())
            .join(JoinType::InnerJoin, money_flows::Relation::Types.def())
            .join(JoinType::InnerJoin, money_flows::Relation::Categories.def())
            .join(
                JoinType::InnerJoin,
                money_flows::Relation::Subcategories.def(),
            )
            .select_only()
            .columns([
                money_flows::Column::Id,
                money_flows::Column::UserId,
                money_flows::Column::CreatedAt,
                money_flows::Column::StatusId,
                money_flows::Column::TypeId,
                money_flows::Column::CategoryId,
                money_flows::Column::SubcategoryId,
                money_flows::Column::AmountCents,
                money_flows::Column::Comment,
            ])
            .column_as(statuses::Column::Name, "status_name")
            .column_as(types::Column::Name, "type_name")
            .column_as(categories::Column::Name, "category_name")
            .column_as(subcategories::Column::Name, "subcategory_name")
            .order_by_desc(money_flows::Column::CreatedAt)
            .order_by_desc(money_flows::Column::Id);

        if let Some(start) = filter.start_date {
            query = query.filter(money_flows::Column::CreatedAt.gte(start));
        }
        if let Some(end) = filter.end_date {
            query = query.filter(money_flows::Column::CreatedAt.lte(end));
        }
        if let Some(needle) = &filter.status_contains {
            query = query.filter(name_contains("statuses", needle));
        }
        if let Some(needle) = &filter.type_contains {
            query = query.filter(name_contains("types", needle));
        }
        if let Some(needle) = &filter.category_contains {
            query = query.filter(name_contains("categories", needle));
        }
        if let Some(needle) = &filter.subcategory_contains {
            query = query.filter(name_contains("subcategories", needle));
        }

        query
            .into_model::<MoneyFlowRecord>()
            .all(&self.database)
            .await
            .map_err(Into::into)
    }
}
