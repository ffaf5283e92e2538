use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, patch, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use std::sync::Arc;

use crate::{catalog, money_flow, ownership, statistics, user};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(auth_header) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user: Option<user::Model> = user::Entity::find()
        .filter(user::Column::Username.eq(auth_header.username()))
        .filter(user::Column::Password.eq(auth_header.password()))
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let Some(user) = user else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    // The catalog itself is world-readable; everything touching a user's
    // working set or ledger sits behind auth.
    let protected = Router::new()
        .route(
            "/my/statuses",
            get(ownership::my_statuses).post(ownership::add_status),
        )
        .route("/my/statuses/{id}", delete(ownership::remove_status))
        .route(
            "/my/types",
            get(ownership::my_types).post(ownership::add_type),
        )
        .route("/my/types/{id}", delete(ownership::remove_type))
        .route(
            "/my/categories",
            get(ownership::my_categories).post(ownership::add_category),
        )
        .route("/my/categories/{id}", delete(ownership::remove_category))
        .route(
            "/my/subcategories",
            get(ownership::my_subcategories).post(ownership::add_subcategory),
        )
        .route(
            "/my/subcategories/{id}",
            delete(ownership::remove_subcategory),
        )
        .route("/moneyFlows", get(money_flow::list).post(money_flow::create))
        .route("/moneyFlows/bulk", post(money_flow::bulk_create))
        .route("/moneyFlows/statistics", get(statistics::report))
        .route("/moneyFlows/trend", get(statistics::trend))
        .route(
            "/moneyFlows/{id}",
            patch(money_flow::update).delete(money_flow::remove),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .route("/statuses", get(catalog::statuses))
        .route("/types", get(catalog::types))
        .route("/categories", get(catalog::categories))
        .route("/subcategories", get(catalog::subcategories))
        .merge(protected)
        .with_state(state)
}

pub async fn run(engine: Engine, db: DatabaseConnection) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, db, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, db, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, header},
    };
    use base64::Engine as _;
    use http_body_util::BodyExt;
    use migration::MigratorTrait;
    use sea_orm::ActiveValue;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn test_router() -> Router {
        let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();

        for (username, password) in [("alice", "password"), ("bob", "secret")] {
            let model = user::ActiveModel {
                username: ActiveValue::Set(username.to_string()),
                password: ActiveValue::Set(password.to_string()),
            };
            user::Entity::insert(model).exec(&db).await.unwrap();
        }

        let engine = Engine::builder().database(db.clone()).build().await.unwrap();
        router(ServerState {
            engine: Arc::new(engine),
            db,
        })
    }

    fn basic_auth() -> String {
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode("alice:password")
        )
    }

    fn get_request(uri: &str, authed: bool) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder().uri(uri);
        if authed {
            builder = builder.header(header::AUTHORIZATION, basic_auth());
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post_request(uri: &str, body: Value) -> HttpRequest<Body> {
        HttpRequest::builder()
            .method("POST")
            .uri(uri)
            .header(header::AUTHORIZATION, basic_auth())
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn anonymous_can_read_the_catalog() {
        let app = test_router().await;
        let response = app.oneshot(get_request("/statuses", false)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_credentials_are_rejected() {
        let app = test_router().await;
        let response = app
            .oneshot(get_request("/my/statuses", false))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn added_type_shows_up_in_working_set_and_global_catalog() {
        let app = test_router().await;

        let response = app
            .clone()
            .oneshot(post_request("/my/types", json!({"name": "Доход"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .clone()
            .oneshot(get_request("/my/types", true))
            .await
            .unwrap();
        let listed = body_json(response).await;
        assert_eq!(listed[0]["name"], "Доход");

        let response = app.oneshot(get_request("/types", false)).await.unwrap();
        let global = body_json(response).await;
        assert_eq!(global.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn money_flow_roundtrip() {
        let app = test_router().await;

        let status = body_json(
            app.clone()
                .oneshot(post_request("/my/statuses", json!({"name": "Личное"})))
                .await
                .unwrap(),
        )
        .await;
        let flow_type = body_json(
            app.clone()
                .oneshot(post_request("/my/types", json!({"name": "Доход"})))
                .await
                .unwrap(),
        )
        .await;
        let category = body_json(
            app.clone()
                .oneshot(post_request(
                    "/my/categories",
                    json!({"name": "Зарплата", "type": flow_type["id"]}),
                ))
                .await
                .unwrap(),
        )
        .await;
        let subcategory = body_json(
            app.clone()
                .oneshot(post_request(
                    "/my/subcategories",
                    json!({"name": "Основная работа", "category": category["id"]}),
                ))
                .await
                .unwrap(),
        )
        .await;

        let response = app
            .clone()
            .oneshot(post_request(
                "/moneyFlows",
                json!({
                    "created_at": "2026-01-15",
                    "status": status["id"],
                    "type": flow_type["id"],
                    "category": category["id"],
                    "subcategory": subcategory["id"],
                    "amount": "50000.00",
                    "comment": "January"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        assert_eq!(created["amount"], "50000.00");
        assert_eq!(created["category"]["name"], "Зарплата");

        let response = app
            .oneshot(get_request("/moneyFlows", true))
            .await
            .unwrap();
        let listed = body_json(response).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["type"]["name"], "Доход");
    }

    #[tokio::test]
    async fn zero_amount_is_unprocessable() {
        let app = test_router().await;

        let status = body_json(
            app.clone()
                .oneshot(post_request("/my/statuses", json!({"name": "Личное"})))
                .await
                .unwrap(),
        )
        .await;
        let flow_type = body_json(
            app.clone()
                .oneshot(post_request("/my/types", json!({"name": "Расход"})))
                .await
                .unwrap(),
        )
        .await;
        let category = body_json(
            app.clone()
                .oneshot(post_request(
                    "/my/categories",
                    json!({"name": "Питание", "type": flow_type["id"]}),
                ))
                .await
                .unwrap(),
        )
        .await;
        let subcategory = body_json(
            app.clone()
                .oneshot(post_request(
                    "/my/subcategories",
                    json!({"name": "Продукты", "category": category["id"]}),
                ))
                .await
                .unwrap(),
        )
        .await;

        let response = app
            .oneshot(post_request(
                "/moneyFlows",
                json!({
                    "created_at": "2026-01-15",
                    "status": status["id"],
                    "type": flow_type["id"],
                    "category": category["id"],
                    "subcategory": subcategory["id"],
                    "amount": "0",
                    "comment": ""
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn category_under_unowned_type_is_forbidden() {
        let app = test_router().await;

        let flow_type = body_json(
            app.clone()
                .oneshot(post_request("/my/types", json!({"name": "Доход"})))
                .await
                .unwrap(),
        )
        .await;

        // bob is a valid user but does not own "Доход"
        let body = json!({"name": "Зарплата", "type": flow_type["id"]});
        let request = HttpRequest::builder()
            .method("POST")
            .uri("/my/categories")
            .header(
                header::AUTHORIZATION,
                format!(
                    "Basic {}",
                    base64::engine::general_purpose::STANDARD.encode("bob:secret")
                ),
            )
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
