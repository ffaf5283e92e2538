//! Per-user claims on catalog rows.
//!
//! Attaching is idempotent; detaching reclaims the catalog row once the last
//! owner is gone, unless the ledger still references it — the ledger counts
//! as an implicit extra owner for deletion purposes.

use sea_orm::{
    ActiveValue, ConnectionTrait, PaginatorTrait, QueryFilter, TransactionTrait, prelude::*,
};

use crate::{
    EngineError, ResultEngine, categories, category_ownerships, money_flows, status_ownerships,
    statuses, subcategories, subcategory_ownerships, type_ownerships, types,
};

use super::{
    CategoryEntry, Engine, SubcategoryEntry, is_unique_violation, normalize_required_name, with_tx,
};

/// Generates the per-level ownership plumbing: the in-transaction owned
/// predicate, its public wrapper, the idempotent attach row insert, and the
/// detach operation with the reference-counted catalog reclaim.
macro_rules! impl_ownership_level {
    (
        $owned_in_tx:ident, $owns_fn:ident, $attach_row_fn:ident, $detach_fn:ident,
        $own_mod:ident, $own_id_field:ident, $OwnIdCol:ident,
        $cat_mod:ident, $FlowRefCol:ident, $label:literal
    ) => {
        impl Engine {
            pub(super) async fn $owned_in_tx<C: ConnectionTrait>(
                db: &C,
                user_id: &str,
                id: i32,
            ) -> ResultEngine<bool> {
                $own_mod::Entity::find_by_id((user_id.to_string(), id))
                    .one(db)
                    .await
                    .map(|model| model.is_some())
                    .map_err(Into::into)
            }

            /// Returns whether the caller has this entry in their working set.
            pub async fn $owns_fn(&self, user_id: &str, id: i32) -> ResultEngine<bool> {
                Self::$owned_in_tx(&self.database, user_id, id).await
            }

            pub(super) async fn $attach_row_fn<C: ConnectionTrait>(
                db: &C,
                user_id: &str,
                id: i32,
            ) -> ResultEngine<()> {
                let active = $own_mod::ActiveModel {
                    user_id: ActiveValue::Set(user_id.to_string()),
                    $own_id_field: ActiveValue::Set(id),
                };
                match active.insert(db).await {
                    Ok(_) => Ok(()),
                    // Already attached: a no-op success, not an error.
                    Err(err) if is_unique_violation(&err) => Ok(()),
                    Err(err) => Err(err.into()),
                }
            }

            /// Drops the caller's claim on an entry.
            ///
            /// The ownership removal always commits. When the last owner goes
            /// away the catalog row is deleted too, unless money flows still
            /// reference it; in that case the row survives and the call
            /// surfaces [`EngineError::ReferencedByLedger`].
            pub async fn $detach_fn(&self, user_id: &str, id: i32) -> ResultEngine<()> {
                let blocked = with_tx!(self, |db_tx| {
                    let res = $own_mod::Entity::delete_by_id((user_id.to_string(), id))
                        .exec(&db_tx)
                        .await?;
                    if res.rows_affected == 0 {
                        return Err(EngineError::KeyNotFound(
                            concat!($label, " not exists").to_string(),
                        ));
                    }

                    let owners = $own_mod::Entity::find()
                        .filter($own_mod::Column::$OwnIdCol.eq(id))
                        .count(&db_tx)
                        .await?;
                    if owners > 0 {
                        Ok::<bool, EngineError>(false)
                    } else {
                        let referenced = money_flows::Entity::find()
                            .filter(money_flows::Column::$FlowRefCol.eq(id))
                            .count(&db_tx)
                            .await?;
                        if referenced > 0 {
                            Ok(true)
                        } else {
                            $cat_mod::Entity::delete_by_id(id).exec(&db_tx).await?;
                            Ok(false)
                        }
                    }
                })?;

                if blocked {
                    return Err(EngineError::ReferencedByLedger(
                        concat!($label, " is still referenced by money flows").to_string(),
                    ));
                }
                Ok(())
            }
        }
    };
}

impl_ownership_level!(
    status_owned,
    owns_status,
    attach_status_row,
    detach_status,
    status_ownerships,
    status_id,
    StatusId,
    statuses,
    StatusId,
    "status"
);

impl_ownership_level!(
    type_owned,
    owns_type,
    attach_type_row,
    detach_type,
    type_ownerships,
    type_id,
    TypeId,
    types,
    TypeId,
    "type"
);

impl_ownership_level!(
    category_owned,
    owns_category,
    attach_category_row,
    detach_category,
    category_ownerships,
    category_id,
    CategoryId,
    categories,
    CategoryId,
    "category"
);

impl_ownership_level!(
    subcategory_owned,
    owns_subcategory,
    attach_subcategory_row,
    detach_subcategory,
    subcategory_ownerships,
    subcategory_id,
    SubcategoryId,
    subcategories,
    SubcategoryId,
    "subcategory"
);

impl Engine {
    /// Claims an existing status into the caller's working set. Idempotent.
    pub async fn attach_status(&self, user_id: &str, status_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            statuses::Entity::find_by_id(status_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("status not exists".to_string()))?;
            Self::attach_status_row(&db_tx, user_id, status_id).await
        })
    }

    /// Claims an existing type into the caller's working set. Idempotent.
    pub async fn attach_type(&self, user_id: &str, type_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            types::Entity::find_by_id(type_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("type not exists".to_string()))?;
            Self::attach_type_row(&db_tx, user_id, type_id).await
        })
    }

    /// Claims an existing category. Requires owning its parent type.
    pub async fn attach_category(&self, user_id: &str, category_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let category = categories::Entity::find_by_id(category_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?;
            if !Self::type_owned(&db_tx, user_id, category.type_id).await? {
                return Err(EngineError::UnauthorizedParent("type not owned".to_string()));
            }
            Self::attach_category_row(&db_tx, user_id, category_id).await
        })
    }

    /// Claims an existing subcategory. Requires owning its parent category.
    pub async fn attach_subcategory(&self, user_id: &str, subcategory_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let subcategory = subcategories::Entity::find_by_id(subcategory_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("subcategory not exists".to_string()))?;
            if !Self::category_owned(&db_tx, user_id, subcategory.category_id).await? {
                return Err(EngineError::UnauthorizedParent(
                    "category not owned".to_string(),
                ));
            }
            Self::attach_subcategory_row(&db_tx, user_id, subcategory_id).await
        })
    }

    /// Creates or claims a status by name in one transaction.
    ///
    /// Two users adding the same name end up sharing one catalog row with an
    /// ownership row each.
    pub async fn add_status(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
    ) -> ResultEngine<statuses::Model> {
        let name = normalize_required_name(name, "status")?;
        with_tx!(self, |db_tx| {
            let status = Self::find_or_create_status(&db_tx, &name, description).await?;
            Self::attach_status_row(&db_tx, user_id, status.id).await?;
            Ok(status)
        })
    }

    /// Creates or claims a type by name in one transaction.
    pub async fn add_type(&self, user_id: &str, name: &str) -> ResultEngine<types::Model> {
        let name = normalize_required_name(name, "type")?;
        with_tx!(self, |db_tx| {
            let flow_type = Self::find_or_create_type(&db_tx, &name).await?;
            Self::attach_type_row(&db_tx, user_id, flow_type.id).await?;
            Ok(flow_type)
        })
    }

    /// Creates or claims a category by `(name, type)` in one transaction.
    ///
    /// The parent type must already be in the caller's working set.
    pub async fn add_category(
        &self,
        user_id: &str,
        name: &str,
        type_id: i32,
    ) -> ResultEngine<CategoryEntry> {
        let name = normalize_required_name(name, "category")?;
        with_tx!(self, |db_tx| {
            let flow_type = types::Entity::find_by_id(type_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("type not exists".to_string()))?;
            if !Self::type_owned(&db_tx, user_id, type_id).await? {
                return Err(EngineError::UnauthorizedParent("type not owned".to_string()));
            }

            let category = Self::find_or_create_category(&db_tx, &name, type_id).await?;
            Self::attach_category_row(&db_tx, user_id, category.id).await?;
            Ok(CategoryEntry {
                id: category.id,
                name: category.name,
                type_id,
                type_name: flow_type.name,
            })
        })
    }

    /// Creates or claims a subcategory by `(name, category)` in one
    /// transaction. The parent category must already be in the caller's
    /// working set.
    pub async fn add_subcategory(
        &self,
        user_id: &str,
        name: &str,
        category_id: i32,
    ) -> ResultEngine<SubcategoryEntry> {
        let name = normalize_required_name(name, "subcategory")?;
        with_tx!(self, |db_tx| {
            let category = categories::Entity::find_by_id(category_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?;
            if !Self::category_owned(&db_tx, user_id, category_id).await? {
                return Err(EngineError::UnauthorizedParent(
                    "category not owned".to_string(),
                ));
            }

            let subcategory = Self::find_or_create_subcategory(&db_tx, &name, category_id).await?;
            Self::attach_subcategory_row(&db_tx, user_id, subcategory.id).await?;
            Ok(SubcategoryEntry {
                id: subcategory.id,
                name: subcategory.name,
                category_id,
                category_name: category.name,
            })
        })
    }
}
