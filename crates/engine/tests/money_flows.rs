use chrono::NaiveDate;
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, EntityTrait, PaginatorTrait, Statement,
};

use engine::{
    Engine, EngineError, MoneyFlowDraft, MoneyFlowListFilter, MoneyFlowPatch,
};
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

async fn seed_income_taxonomy(engine: &Engine, user: &str) -> Taxonomy {
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

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn draft(tax: &Taxonomy, day: NaiveDate, amount: &str, comment: &str) -> MoneyFlowDraft {
    MoneyFlowDraft {
        created_at: day,
        status_id: tax.status_id,
        type_id: tax.type_id,
        category_id: tax.category_id,
        subcategory_id: tax.subcategory_id,
        amount: amount.parse().unwrap(),
        comment: comment.to_string(),
    }
}

#[tokio::test]
async fn create_resolves_names_and_stamps_the_caller() {
    let (engine, _db) = engine_with_db().await;
    let tax = seed_income_taxonomy(&engine, "alice").await;

    let record = engine
        .new_money_flow(
            "alice",
            draft(&tax, date(2026, 1, 15), "50000.00", "Тестовая операция"),
        )
        .await
        .unwrap();

    assert_eq!(record.user_id.as_deref(), Some("alice"));
    assert_eq!(record.amount_cents, 5_000_000);
    assert_eq!(record.status_name, "Личное");
    assert_eq!(record.type_name, "Доход");
    assert_eq!(record.category_name, "Зарплата");
    assert_eq!(record.subcategory_name, "Основная работа");
    assert_eq!(record.comment, "Тестовая операция");
}

#[tokio::test]
async fn non_positive_amounts_are_rejected() {
    let (engine, db) = engine_with_db().await;
    let tax = seed_income_taxonomy(&engine, "alice").await;

    let err = engine
        .new_money_flow("alice", draft(&tax, date(2026, 1, 15), "0", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .new_money_flow("alice", draft(&tax, date(2026, 1, 15), "-1000.00", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    // one cent is enough
    engine
        .new_money_flow("alice", draft(&tax, date(2026, 1, 15), "0.01", ""))
        .await
        .unwrap();

    assert_eq!(
        engine::money_flows::Entity::find().count(&db).await.unwrap(),
        1
    );
}

#[tokio::test]
async fn subcategory_from_another_category_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let tax = seed_income_taxonomy(&engine, "alice").await;

    // a second branch: Расход → Питание → Ресторан
    let expense = engine.add_type("alice", "Расход").await.unwrap();
    let food = engine
        .add_category("alice", "Питание", expense.id)
        .await
        .unwrap();
    let restaurant = engine
        .add_subcategory("alice", "Ресторан", food.id)
        .await
        .unwrap();

    let mut bad = draft(&tax, date(2026, 1, 15), "100.00", "");
    bad.subcategory_id = restaurant.id;
    let err = engine.new_money_flow("alice", bad).await.unwrap_err();
    assert!(matches!(err, EngineError::HierarchyMismatch(_)));
}

#[tokio::test]
async fn references_outside_the_working_set_read_as_missing() {
    let (engine, _db) = engine_with_db().await;
    let tax = seed_income_taxonomy(&engine, "alice").await;

    // bob can see alice's rows in the global catalog but has claimed none
    let err = engine
        .new_money_flow("bob", draft(&tax, date(2026, 1, 15), "100.00", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn update_is_scoped_and_merges_fields() {
    let (engine, _db) = engine_with_db().await;
    let tax = seed_income_taxonomy(&engine, "alice").await;

    let record = engine
        .new_money_flow("alice", draft(&tax, date(2026, 1, 15), "100.00", "initial"))
        .await
        .unwrap();

    // not bob's record, even though it exists
    let err = engine
        .update_money_flow(
            record.id,
            "bob",
            MoneyFlowPatch {
                comment: Some("hijack".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let updated = engine
        .update_money_flow(
            record.id,
            "alice",
            MoneyFlowPatch {
                amount: Some("250.50".parse().unwrap()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.amount_cents, 25_050);
    assert_eq!(updated.comment, "initial");
    assert_eq!(updated.created_at, date(2026, 1, 15));
    assert_eq!(updated.user_id.as_deref(), Some("alice"));
}

#[tokio::test]
async fn update_rejects_broken_hierarchy_and_bad_amounts() {
    let (engine, _db) = engine_with_db().await;
    let tax = seed_income_taxonomy(&engine, "alice").await;

    let expense = engine.add_type("alice", "Расход").await.unwrap();
    let food = engine
        .add_category("alice", "Питание", expense.id)
        .await
        .unwrap();
    let restaurant = engine
        .add_subcategory("alice", "Ресторан", food.id)
        .await
        .unwrap();

    let record = engine
        .new_money_flow("alice", draft(&tax, date(2026, 1, 15), "100.00", ""))
        .await
        .unwrap();

    // moving only the subcategory breaks the pairing with the stored category
    let err = engine
        .update_money_flow(
            record.id,
            "alice",
            MoneyFlowPatch {
                subcategory_id: Some(restaurant.id),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::HierarchyMismatch(_)));

    let err = engine
        .update_money_flow(
            record.id,
            "alice",
            MoneyFlowPatch {
                amount: Some(engine::MoneyCents::ZERO),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    // moving both category and subcategory together is fine
    let moved = engine
        .update_money_flow(
            record.id,
            "alice",
            MoneyFlowPatch {
                category_id: Some(food.id),
                subcategory_id: Some(restaurant.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.category_name, "Питание");
    assert_eq!(moved.subcategory_name, "Ресторан");
}

#[tokio::test]
async fn delete_is_scoped_to_the_owner() {
    let (engine, db) = engine_with_db().await;
    let tax = seed_income_taxonomy(&engine, "alice").await;

    let record = engine
        .new_money_flow("alice", draft(&tax, date(2026, 1, 15), "100.00", ""))
        .await
        .unwrap();

    let err = engine.delete_money_flow(record.id, "bob").await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    engine.delete_money_flow(record.id, "alice").await.unwrap();
    assert_eq!(
        engine::money_flows::Entity::find().count(&db).await.unwrap(),
        0
    );

    let err = engine
        .delete_money_flow(record.id, "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn bulk_create_is_all_or_nothing() {
    let (engine, db) = engine_with_db().await;
    let tax = seed_income_taxonomy(&engine, "alice").await;

    let expense = engine.add_type("alice", "Расход").await.unwrap();
    let food = engine
        .add_category("alice", "Питание", expense.id)
        .await
        .unwrap();
    let restaurant = engine
        .add_subcategory("alice", "Ресторан", food.id)
        .await
        .unwrap();

    let mut mismatched = draft(&tax, date(2026, 1, 17), "300.00", "");
    mismatched.subcategory_id = restaurant.id;

    let err = engine
        .bulk_new_money_flows(
            "alice",
            vec![
                draft(&tax, date(2026, 1, 15), "10000.00", "Операция 1"),
                draft(&tax, date(2026, 1, 16), "20000.00", "Операция 2"),
                mismatched,
            ],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::HierarchyMismatch(_)));
    assert_eq!(
        engine::money_flows::Entity::find().count(&db).await.unwrap(),
        0
    );

    let records = engine
        .bulk_new_money_flows(
            "alice",
            vec![
                draft(&tax, date(2026, 1, 15), "10000.00", "Операция 1"),
                draft(&tax, date(2026, 1, 16), "20000.00", "Операция 2"),
            ],
        )
        .await
        .unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(
        engine::money_flows::Entity::find().count(&db).await.unwrap(),
        2
    );
}

#[tokio::test]
async fn list_is_scoped_and_ordered_newest_first() {
    let (engine, _db) = engine_with_db().await;
    let alice_tax = seed_income_taxonomy(&engine, "alice").await;
    let bob_tax = seed_income_taxonomy(&engine, "bob").await;

    engine
        .new_money_flow("alice", draft(&alice_tax, date(2026, 1, 10), "100.00", "old"))
        .await
        .unwrap();
    engine
        .new_money_flow("alice", draft(&alice_tax, date(2026, 2, 20), "200.00", "new"))
        .await
        .unwrap();
    engine
        .new_money_flow("bob", draft(&bob_tax, date(2026, 1, 15), "999.00", ""))
        .await
        .unwrap();

    let listed = engine
        .list_money_flows("alice", &MoneyFlowListFilter::default())
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].comment, "new");
    assert_eq!(listed[1].comment, "old");
}

#[tokio::test]
async fn list_filters_by_date_range_and_names() {
    let (engine, _db) = engine_with_db().await;
    let tax = seed_income_taxonomy(&engine, "alice").await;

    let expense = engine.add_type("alice", "Расход").await.unwrap();
    let trips = engine
        .add_category("alice", "Business trips", expense.id)
        .await
        .unwrap();
    let taxi = engine.add_subcategory("alice", "Такси", trips.id).await.unwrap();

    engine
        .new_money_flow("alice", draft(&tax, date(2026, 1, 10), "100.00", "january"))
        .await
        .unwrap();
    engine
        .new_money_flow("alice", draft(&tax, date(2026, 1, 31), "150.00", "edge"))
        .await
        .unwrap();
    let mut trip = draft(&tax, date(2026, 2, 5), "50.00", "trip");
    trip.type_id = expense.id;
    trip.category_id = trips.id;
    trip.subcategory_id = taxi.id;
    engine.new_money_flow("alice", trip).await.unwrap();

    // inclusive date bounds
    let in_january = engine
        .list_money_flows(
            "alice",
            &MoneyFlowListFilter {
                start_date: Some(date(2026, 1, 1)),
                end_date: Some(date(2026, 1, 31)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(in_january.len(), 2);

    // substring match on the category name, case-insensitive for ascii
    let by_category = engine
        .list_money_flows(
            "alice",
            &MoneyFlowListFilter {
                category_contains: Some("business".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(by_category.len(), 1);
    assert_eq!(by_category[0].comment, "trip");

    // exact-case substring works for non-ascii names too
    let by_type = engine
        .list_money_flows(
            "alice",
            &MoneyFlowListFilter {
                type_contains: Some("Дохо".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(by_type.len(), 2);
}
