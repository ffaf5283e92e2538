//! Initial schema migration - creates all tables from scratch.
//!
//! It creates the complete schema for Quattrini:
//!
//! - `users`: authentication
//! - `statuses`, `types`, `categories`, `subcategories`: the shared taxonomy
//!   catalog, de-duplicated by name (plus parent id for the lower levels)
//! - `status_ownerships` .. `subcategory_ownerships`: per-user claims on
//!   catalog rows, one join table per level
//! - `money_flows`: the per-user ledger, with restrictive references into the
//!   catalog

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
}

#[derive(Iden)]
enum Statuses {
    Table,
    Id,
    Name,
    Description,
}

#[derive(Iden)]
enum Types {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    Name,
    TypeId,
}

#[derive(Iden)]
enum Subcategories {
    Table,
    Id,
    Name,
    CategoryId,
}

#[derive(Iden)]
enum StatusOwnerships {
    Table,
    UserId,
    StatusId,
}

#[derive(Iden)]
enum TypeOwnerships {
    Table,
    UserId,
    TypeId,
}

#[derive(Iden)]
enum CategoryOwnerships {
    Table,
    UserId,
    CategoryId,
}

#[derive(Iden)]
enum SubcategoryOwnerships {
    Table,
    UserId,
    SubcategoryId,
}

#[derive(Iden)]
enum MoneyFlows {
    Table,
    Id,
    UserId,
    CreatedAt,
    StatusId,
    TypeId,
    CategoryId,
    SubcategoryId,
    AmountCents,
    Comment,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Taxonomy catalog
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Statuses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Statuses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Statuses::Name).string().not_null())
                    .col(
                        ColumnDef::new(Statuses::Description)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-statuses-name-unique")
                    .table(Statuses::Table)
                    .col(Statuses::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Types::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Types::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Types::Name).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-types-name-unique")
                    .table(Types::Table)
                    .col(Types::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::TypeId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-categories-type_id")
                            .from(Categories::Table, Categories::TypeId)
                            .to(Types::Table, Types::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // The same category name may exist under different types.
        manager
            .create_index(
                Index::create()
                    .name("idx-categories-name-type_id-unique")
                    .table(Categories::Table)
                    .col(Categories::Name)
                    .col(Categories::TypeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Subcategories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Subcategories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Subcategories::Name).string().not_null())
                    .col(
                        ColumnDef::new(Subcategories::CategoryId)
                            .integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-subcategories-category_id")
                            .from(Subcategories::Table, Subcategories::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-subcategories-name-category_id-unique")
                    .table(Subcategories::Table)
                    .col(Subcategories::Name)
                    .col(Subcategories::CategoryId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Ownership join tables
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(StatusOwnerships::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StatusOwnerships::UserId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StatusOwnerships::StatusId)
                            .integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(StatusOwnerships::UserId)
                            .col(StatusOwnerships::StatusId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-status_ownerships-user_id")
                            .from(StatusOwnerships::Table, StatusOwnerships::UserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-status_ownerships-status_id")
                            .from(StatusOwnerships::Table, StatusOwnerships::StatusId)
                            .to(Statuses::Table, Statuses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-status_ownerships-status_id")
                    .table(StatusOwnerships::Table)
                    .col(StatusOwnerships::StatusId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TypeOwnerships::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TypeOwnerships::UserId).string().not_null())
                    .col(ColumnDef::new(TypeOwnerships::TypeId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(TypeOwnerships::UserId)
                            .col(TypeOwnerships::TypeId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-type_ownerships-user_id")
                            .from(TypeOwnerships::Table, TypeOwnerships::UserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-type_ownerships-type_id")
                            .from(TypeOwnerships::Table, TypeOwnerships::TypeId)
                            .to(Types::Table, Types::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-type_ownerships-type_id")
                    .table(TypeOwnerships::Table)
                    .col(TypeOwnerships::TypeId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CategoryOwnerships::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CategoryOwnerships::UserId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CategoryOwnerships::CategoryId)
                            .integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(CategoryOwnerships::UserId)
                            .col(CategoryOwnerships::CategoryId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-category_ownerships-user_id")
                            .from(CategoryOwnerships::Table, CategoryOwnerships::UserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-category_ownerships-category_id")
                            .from(CategoryOwnerships::Table, CategoryOwnerships::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-category_ownerships-category_id")
                    .table(CategoryOwnerships::Table)
                    .col(CategoryOwnerships::CategoryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SubcategoryOwnerships::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SubcategoryOwnerships::UserId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubcategoryOwnerships::SubcategoryId)
                            .integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(SubcategoryOwnerships::UserId)
                            .col(SubcategoryOwnerships::SubcategoryId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-subcategory_ownerships-user_id")
                            .from(SubcategoryOwnerships::Table, SubcategoryOwnerships::UserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-subcategory_ownerships-subcategory_id")
                            .from(
                                SubcategoryOwnerships::Table,
                                SubcategoryOwnerships::SubcategoryId,
                            )
                            .to(Subcategories::Table, Subcategories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-subcategory_ownerships-subcategory_id")
                    .table(SubcategoryOwnerships::Table)
                    .col(SubcategoryOwnerships::SubcategoryId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Money flows
        // ───────────────────────────────────────────────────────────────────
        // Taxonomy references are RESTRICT: a catalog row in use by the
        // ledger cannot be deleted, it has to fail loudly.
        manager
            .create_table(
                Table::create()
                    .table(MoneyFlows::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MoneyFlows::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MoneyFlows::UserId).string())
                    .col(ColumnDef::new(MoneyFlows::CreatedAt).date().not_null())
                    .col(ColumnDef::new(MoneyFlows::StatusId).integer().not_null())
                    .col(ColumnDef::new(MoneyFlows::TypeId).integer().not_null())
                    .col(ColumnDef::new(MoneyFlows::CategoryId).integer().not_null())
                    .col(
                        ColumnDef::new(MoneyFlows::SubcategoryId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MoneyFlows::AmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MoneyFlows::Comment)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-money_flows-user_id")
                            .from(MoneyFlows::Table, MoneyFlows::UserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-money_flows-status_id")
                            .from(MoneyFlows::Table, MoneyFlows::StatusId)
                            .to(Statuses::Table, Statuses::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-money_flows-type_id")
                            .from(MoneyFlows::Table, MoneyFlows::TypeId)
                            .to(Types::Table, Types::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-money_flows-category_id")
                            .from(MoneyFlows::Table, MoneyFlows::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-money_flows-subcategory_id")
                            .from(MoneyFlows::Table, MoneyFlows::SubcategoryId)
                            .to(Subcategories::Table, Subcategories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-money_flows-user_id-created_at")
                    .table(MoneyFlows::Table)
                    .col(MoneyFlows::UserId)
                    .col(MoneyFlows::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(MoneyFlows::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SubcategoryOwnerships::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CategoryOwnerships::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TypeOwnerships::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StatusOwnerships::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Subcategories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Types::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Statuses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
