use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, EntityTrait, PaginatorTrait, Statement,
};

use engine::{CatalogScope, Engine, EngineError, MoneyFlowDraft};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for username in ["alice", "bob"] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password) VALUES (?, ?)",
            vec![username.into(), "password".into()],
        ))
        .await
        .unwrap();
    }
    let engine = Engine::builder().database(db.clone()).build().await.unwrap();
    (engine, db)
}

struct Taxonomy {
    status_id: i32,
    type_id: i32,
    category_id: i32,
    subcategory_id: i32,
}

async fn seed_taxonomy(engine: &Engine, user: &str) -> Taxonomy {
    let status = engine.add_status(user, "Личное", "").await.unwrap();
    let flow_type = engine.add_type(user, "Доход").await.unwrap();
    let category = engine
        .add_category(user, "Зарплата", flow_type.id)
        .await
        .unwrap();
    let subcategory = engine
        .add_subcategory(user, "Основная работа", category.id)
        .await
        .unwrap();

    Taxonomy {
        status_id: status.id,
        type_id: flow_type.id,
        category_id: category.id,
        subcategory_id: subcategory.id,
    }
}

fn flow_draft(tax: &Taxonomy, amount: &str) -> MoneyFlowDraft {
    MoneyFlowDraft {
        created_at: chrono::NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
        status_id: tax.status_id,
        type_id: tax.type_id,
        category_id: tax.category_id,
        subcategory_id: tax.subcategory_id,
        amount: amount.parse().unwrap(),
        comment: String::new(),
    }
}

#[tokio::test]
async fn added_status_lands_in_working_set_and_global_catalog() {
    let (engine, _db) = engine_with_db().await;

    let status = engine.add_status("alice", "Личное", "домашние траты").await.unwrap();

    let mine = engine
        .list_statuses(CatalogScope::Owned("alice"))
        .await
        .unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, status.id);
    assert_eq!(mine[0].description, "домашние траты");

    // bob has not claimed it, but the global catalog shows it read-only
    let bobs = engine
        .list_statuses(CatalogScope::Owned("bob"))
        .await
        .unwrap();
    assert!(bobs.is_empty());
    let global = engine.list_statuses(CatalogScope::Global).await.unwrap();
    assert_eq!(global.len(), 1);
}

#[tokio::test]
async fn identical_names_share_one_catalog_row() {
    let (engine, db) = engine_with_db().await;

    let alice_type = engine.add_type("alice", "Доход").await.unwrap();
    let bob_type = engine.add_type("bob", "Доход").await.unwrap();
    assert_eq!(alice_type.id, bob_type.id);

    let alice_cat = engine
        .add_category("alice", "Зарплата", alice_type.id)
        .await
        .unwrap();
    let bob_cat = engine
        .add_category("bob", "Зарплата", bob_type.id)
        .await
        .unwrap();
    assert_eq!(alice_cat.id, bob_cat.id);

    assert_eq!(
        engine::categories::Entity::find().count(&db).await.unwrap(),
        1
    );
    assert_eq!(
        engine::category_ownerships::Entity::find()
            .count(&db)
            .await
            .unwrap(),
        2
    );
}

#[tokio::test]
async fn whitespace_variants_of_a_name_deduplicate() {
    let (engine, db) = engine_with_db().await;

    let first = engine.add_type("alice", "Доход").await.unwrap();
    let second = engine.add_type("bob", "  Доход ").await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(engine::types::Entity::find().count(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn attach_is_idempotent() {
    let (engine, db) = engine_with_db().await;

    let first = engine.add_status("alice", "Личное", "").await.unwrap();
    let second = engine.add_status("alice", "Личное", "").await.unwrap();
    assert_eq!(first.id, second.id);

    engine.attach_status("alice", first.id).await.unwrap();

    assert_eq!(
        engine::status_ownerships::Entity::find()
            .count(&db)
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn category_requires_owned_type() {
    let (engine, _db) = engine_with_db().await;

    let flow_type = engine.add_type("alice", "Доход").await.unwrap();

    let err = engine
        .add_category("bob", "Зарплата", flow_type.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::UnauthorizedParent(_)));

    // after claiming the type, the same create succeeds
    engine.attach_type("bob", flow_type.id).await.unwrap();
    engine
        .add_category("bob", "Зарплата", flow_type.id)
        .await
        .unwrap();
}

#[tokio::test]
async fn subcategory_requires_owned_category() {
    let (engine, _db) = engine_with_db().await;

    let flow_type = engine.add_type("alice", "Доход").await.unwrap();
    let category = engine
        .add_category("alice", "Зарплата", flow_type.id)
        .await
        .unwrap();

    let err = engine
        .add_subcategory("bob", "Подработка", category.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::UnauthorizedParent(_)));

    let err = engine.attach_subcategory("bob", 424242).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn detach_reclaims_row_only_after_last_owner() {
    let (engine, db) = engine_with_db().await;

    let status = engine.add_status("alice", "Личное", "").await.unwrap();
    engine.attach_status("bob", status.id).await.unwrap();

    engine.detach_status("alice", status.id).await.unwrap();
    // bob still owns it, the row survives
    assert_eq!(
        engine::statuses::Entity::find().count(&db).await.unwrap(),
        1
    );
    assert!(engine.owns_status("bob", status.id).await.unwrap());

    engine.detach_status("bob", status.id).await.unwrap();
    assert_eq!(
        engine::statuses::Entity::find().count(&db).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn detach_of_unowned_entry_is_not_found() {
    let (engine, _db) = engine_with_db().await;

    let status = engine.add_status("alice", "Личное", "").await.unwrap();
    let err = engine.detach_status("bob", status.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn ledger_reference_blocks_catalog_reclaim_but_not_the_detach() {
    let (engine, db) = engine_with_db().await;

    let tax = seed_taxonomy(&engine, "alice").await;
    engine
        .new_money_flow("alice", flow_draft(&tax, "100.00"))
        .await
        .unwrap();

    let err = engine
        .detach_status("alice", tax.status_id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ReferencedByLedger(_)));

    // the claim is gone, the shared row survives for the ledger
    assert!(!engine.owns_status("alice", tax.status_id).await.unwrap());
    assert_eq!(
        engine::statuses::Entity::find().count(&db).await.unwrap(),
        1
    );
}

#[tokio::test]
async fn subcategory_listing_can_filter_by_category() {
    let (engine, _db) = engine_with_db().await;

    let flow_type = engine.add_type("alice", "Расход").await.unwrap();
    let food = engine
        .add_category("alice", "Питание", flow_type.id)
        .await
        .unwrap();
    let transport = engine
        .add_category("alice", "Транспорт", flow_type.id)
        .await
        .unwrap();
    engine
        .add_subcategory("alice", "Продукты", food.id)
        .await
        .unwrap();
    engine
        .add_subcategory("alice", "Такси", transport.id)
        .await
        .unwrap();

    let all = engine
        .list_subcategories(CatalogScope::Owned("alice"), None)
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    let only_food = engine
        .list_subcategories(CatalogScope::Owned("alice"), Some(food.id))
        .await
        .unwrap();
    assert_eq!(only_food.len(), 1);
    assert_eq!(only_food[0].name, "Продукты");
    assert_eq!(only_food[0].category_name, "Питание");
}
