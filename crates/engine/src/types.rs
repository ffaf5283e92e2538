//! Operation types (income/expense and friends), the second taxonomy level.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "types")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::categories::Entity")]
    Categories,
    #[sea_orm(has_many = "super::type_ownerships::Entity")]
    Ownerships,
    #[sea_orm(has_many = "super::money_flows::Entity")]
    MoneyFlows,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl Related<super::type_ownerships::Entity> for Entity {
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
