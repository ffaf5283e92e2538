//! Subcategories, the fourth taxonomy level. Unique on `(name, category_id)`.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "subcategories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub category_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Categories,
    #[sea_orm(has_many = "super::subcategory_ownerships::Entity")]
    Ownerships,
    #[sea_orm(has_many = "super::money_flows::Entity")]
    MoneyFlows,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl Related<super::subcategory_ownerships::Entity> for Entity {
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
