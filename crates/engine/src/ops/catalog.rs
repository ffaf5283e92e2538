//! The shared catalog: global, de-duplicated taxonomy rows.
//!
//! Rows are keyed by name (plus parent id for the lower levels) and belong to
//! nobody; per-user claims live in the ownership tables. Creation goes
//! through get-or-create so two users asking for the same entry converge on
//! one row.

use sea_orm::{
    ActiveValue, ConnectionTrait, JoinType, QueryFilter, QueryOrder, QuerySelect, prelude::*,
};

use crate::{
    EngineError, ResultEngine, categories, category_ownerships, status_ownerships, statuses,
    subcategories, subcategory_ownerships, type_ownerships, types,
};

use super::{Engine, is_unique_violation};

/// Which slice of the catalog a caller may see.
///
/// `Global` is the whole read-only catalog (anonymous callers included);
/// `Owned` is one user's working set.
#[derive(Clone, Copy, Debug)]
pub enum CatalogScope<'a> {
    Global,
    Owned(&'a str),
}

/// A category with its parent type name resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryEntry {
    pub id: i32,
    pub name: String,
    pub type_id: i32,
    pub type_name: String,
}

/// A subcategory with its parent category name resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubcategoryEntry {
    pub id: i32,
    pub name: String,
    pub category_id: i32,
    pub category_name: String,
}

impl Engine {
    /// Lists statuses visible in `scope`, ordered by name.
    pub async fn list_statuses(
        &self,
        scope: CatalogScope<'_>,
    ) -> ResultEngine<Vec<statuses::Model>> {
        let mut query = statuses::Entity::find().order_by_asc(statuses::Column::Name);
        if let CatalogScope::Owned(user_id) = scope {
            query = query
                .join(JoinType::InnerJoin, statuses::Relation::Ownerships.def())
                .filter(status_ownerships::Column::UserId.eq(user_id));
        }
        query.all(&self.database).await.map_err(Into::into)
    }

    /// Lists types visible in `scope`, ordered by name.
    ///
    /// For an authenticated caller this is exactly the candidate-parent set
    /// for category creation.
    pub async fn list_types(&self, scope: CatalogScope<'_>) -> ResultEngine<Vec<types::Model>> {
        let mut query = types::Entity::find().order_by_asc(types::Column::Name);
        if let CatalogScope::Owned(user_id) = scope {
            query = query
                .join(JoinType::InnerJoin, types::Relation::Ownerships.def())
                .filter(type_ownerships::Column::UserId.eq(user_id));
        }
        query.all(&self.database).await.map_err(Into::into)
    }

    /// Lists categories visible in `scope` with their type names resolved.
    pub async fn list_categories(
        &self,
        scope: CatalogScope<'_>,
    ) -> ResultEngine<Vec<CategoryEntry>> {
        let mut query = categories::Entity::find()
            .find_also_related(types::Entity)
            .order_by_asc(categories::Column::Name);
        if let CatalogScope::Owned(user_id) = scope {
            query = query
                .join(JoinType::InnerJoin, categories::Relation::Ownerships.def())
                .filter(category_ownerships::Column::UserId.eq(user_id));
        }

        let rows = query.all(&self.database).await?;
        rows.into_iter()
            .map(|(category, flow_type)| {
                let flow_type = flow_type
                    .ok_or_else(|| EngineError::KeyNotFound("type not exists".to_string()))?;
                Ok(CategoryEntry {
                    id: category.id,
                    name: category.name,
                    type_id: category.type_id,
                    type_name: flow_type.name,
                })
            })
            .collect()
    }

    /// Lists subcategories visible in `scope`, optionally restricted to one
    /// category, with their category names resolved.
    pub async fn list_subcategories(
        &self,
        scope: CatalogScope<'_>,
        category_id: Option<i32>,
    ) -> ResultEngine<Vec<SubcategoryEntry>> {
        let mut query = subcategories::Entity::find()
            .find_also_related(categories::Entity)
            .order_by_asc(subcategories::Column::CategoryId)
            .order_by_asc(subcategories::Column::Name);
        if let CatalogScope::Owned(user_id) = scope {
            query = query
                .join(
                    JoinType::InnerJoin,
                    subcategories::Relation::Ownerships.def(),
                )
                .filter(subcategory_ownerships::Column::UserId.eq(user_id));
        }
        if let Some(category_id) = category_id {
            query = query.filter(subcategories::Column::CategoryId.eq(category_id));
        }

        let rows = query.all(&self.database).await?;
        rows.into_iter()
            .map(|(subcategory, category)| {
                let category = category
                    .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?;
                Ok(SubcategoryEntry {
                    id: subcategory.id,
                    name: subcategory.name,
                    category_id: subcategory.category_id,
                    category_name: category.name,
                })
            })
            .collect()
    }

    /// Looks up a status by id.
    pub async fn status(&self, status_id: i32) -> ResultEngine<Option<statuses::Model>> {
        statuses::Entity::find_by_id(status_id)
            .one(&self.database)
            .await
            .map_err(Into::into)
    }

    /// Looks up a type by id.
    pub async fn flow_type(&self, type_id: i32) -> ResultEngine<Option<types::Model>> {
        types::Entity::find_by_id(type_id)
            .one(&self.database)
            .await
            .map_err(Into::into)
    }

    /// Looks up a category by id.
    pub async fn category(&self, category_id: i32) -> ResultEngine<Option<categories::Model>> {
        categories::Entity::find_by_id(category_id)
            .one(&self.database)
            .await
            .map_err(Into::into)
    }

    /// Looks up a subcategory by id.
    pub async fn subcategory(
        &self,
        subcategory_id: i32,
    ) -> ResultEngine<Option<subcategories::Model>> {
        subcategories::Entity::find_by_id(subcategory_id)
            .one(&self.database)
            .await
            .map_err(Into::into)
    }

    /// Looks up a status by name.
    pub async fn status_by_name(&self, name: &str) -> ResultEngine<Option<statuses::Model>> {
        Self::find_status_by_name(&self.database, name).await
    }

    /// Looks up a type by name.
    pub async fn type_by_name(&self, name: &str) -> ResultEngine<Option<types::Model>> {
        Self::find_type_by_name(&self.database, name).await
    }

    /// Looks up a category by `(name, type)`.
    pub async fn category_by_name(
        &self,
        name: &str,
        type_id: i32,
    ) -> ResultEngine<Option<categories::Model>> {
        Self::find_category_by_name(&self.database, name, type_id).await
    }

    /// Looks up a subcategory by `(name, category)`.
    pub async fn subcategory_by_name(
        &self,
        name: &str,
        category_id: i32,
    ) -> ResultEngine<Option<subcategories::Model>> {
        Self::find_subcategory_by_name(&self.database, name, category_id).await
    }

    pub(super) async fn find_status_by_name<C: ConnectionTrait>(
        db: &C,
        name: &str,
    ) -> ResultEngine<Option<statuses::Model>> {
        statuses::Entity::find()
            .filter(statuses::Column::Name.eq(name))
            .one(db)
            .await
            .map_err(Into::into)
    }

    pub(super) async fn find_type_by_name<C: ConnectionTrait>(
        db: &C,
        name: &str,
    ) -> ResultEngine<Option<types::Model>> {
        types::Entity::find()
            .filter(types::Column::Name.eq(name))
            .one(db)
            .await
            .map_err(Into::into)
    }

    pub(super) async fn find_category_by_name<C: ConnectionTrait>(
        db: &C,
        name: &str,
        type_id: i32,
    ) -> ResultEngine<Option<categories::Model>> {
        categories::Entity::find()
            .filter(categories::Column::Name.eq(name))
            .filter(categories::Column::TypeId.eq(type_id))
            .one(db)
            .await
            .map_err(Into::into)
    }

    pub(super) async fn find_subcategory_by_name<C: ConnectionTrait>(
        db: &C,
        name: &str,
        category_id: i32,
    ) -> ResultEngine<Option<subcategories::Model>> {
        subcategories::Entity::find()
            .filter(subcategories::Column::Name.eq(name))
            .filter(subcategories::Column::CategoryId.eq(category_id))
            .one(db)
            .await
            .map_err(Into::into)
    }

    /// Get-or-create for statuses, keyed by name.
    ///
    /// An existing row keeps its description; the lookup key is the name
    /// alone. A lost insert race is resolved by re-reading the winner's row.
    pub(super) async fn find_or_create_status<C: ConnectionTrait>(
        db: &C,
        name: &str,
        description: &str,
    ) -> ResultEngine<statuses::Model> {
        if let Some(model) = Self::find_status_by_name(db, name).await? {
            return Ok(model);
        }

        let active = statuses::ActiveModel {
            name: ActiveValue::Set(name.to_string()),
            description: ActiveValue::Set(description.to_string()),
            ..Default::default()
        };
        match active.insert(db).await {
            Ok(model) => Ok(model),
            Err(err) if is_unique_violation(&err) => Self::find_status_by_name(db, name)
                .await?
                .ok_or(EngineError::Database(err)),
            Err(err) => Err(err.into()),
        }
    }

    /// Get-or-create for types, keyed by name.
    pub(super) async fn find_or_create_type<C: ConnectionTrait>(
        db: &C,
        name: &str,
    ) -> ResultEngine<types::Model> {
        if let Some(model) = Self::find_type_by_name(db, name).await? {
            return Ok(model);
        }

        let active = types::ActiveModel {
            name: ActiveValue::Set(name.to_string()),
            ..Default::default()
        };
        match active.insert(db).await {
            Ok(model) => Ok(model),
            Err(err) if is_unique_violation(&err) => Self::find_type_by_name(db, name)
                .await?
                .ok_or(EngineError::Database(err)),
            Err(err) => Err(err.into()),
        }
    }

    /// Get-or-create for categories, keyed by `(name, type)`.
    pub(super) async fn find_or_create_category<C: ConnectionTrait>(
        db: &C,
        name: &str,
        type_id: i32,
    ) -> ResultEngine<categories::Model> {
        if let Some(model) = Self::find_category_by_name(db, name, type_id).await? {
            return Ok(model);
        }

        let active = categories::ActiveModel {
            name: ActiveValue::Set(name.to_string()),
            type_id: ActiveValue::Set(type_id),
            ..Default::default()
        };
        match active.insert(db).await {
            Ok(model) => Ok(model),
            Err(err) if is_unique_violation(&err) => {
                Self::find_category_by_name(db, name, type_id)
                    .await?
                    .ok_or(EngineError::Database(err))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Get-or-create for subcategories, keyed by `(name, category)`.
    pub(super) async fn find_or_create_subcategory<C: ConnectionTrait>(
        db: &C,
        name: &str,
        category_id: i32,
    ) -> ResultEngine<subcategories::Model> {
        if let Some(model) = Self::find_subcategory_by_name(db, name, category_id).await? {
            return Ok(model);
        }

        let active = subcategories::ActiveModel {
            name: ActiveValue::Set(name.to_string()),
            category_id: ActiveValue::Set(category_id),
            ..Default::default()
        };
        match active.insert(db).await {
            Ok(model) => Ok(model),
            Err(err) if is_unique_violation(&err) => {
                Self::find_subcategory_by_name(db, name, category_id)
                    .await?
                    .ok_or(EngineError::Database(err))
            }
            Err(err) => Err(err.into()),
        }
    }
}
