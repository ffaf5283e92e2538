//! Operation statuses, the first taxonomy level.
//!
//! Rows are global and shared between users; per-user visibility lives in
//! [`super::status_ownerships`].

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "statuses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::status_ownerships::Entity")]
    Ownerships,
    #[sea_orm(has_many = "super::money_flows::Entity")]
    MoneyFlows,
}

impl Related<super::status_ownerships::Entity> for Entity {
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
