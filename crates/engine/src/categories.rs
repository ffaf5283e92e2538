//! Categories, the third taxonomy level.
//!
//! Unique on `(name, type_id)`: the same category name may exist under
//! different types without clashing.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub type_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::types::Entity",
        from = "Column::TypeId",
        to = "super::types::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Types,
    #[sea_orm(has_many = "super::subcategories::Entity")]
    Subcategories,
    #[sea_orm(has_many = "super::category_ownerships::Entity")]
    Ownerships,
    #[sea_orm(has_many = "super::money_flows::Entity")]
    MoneyFlows,
}

impl Related<super::types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Types.def()
    }
}

impl Related<super::subcategories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subcategories.def()
    }
}

impl Related<super::category_ownerships::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ownerships.def()
    }
}

impl Related<super::money_flows::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MoneyFlows.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
