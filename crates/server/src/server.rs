use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use std::sync::Arc;

use crate::{
    accounts, categories, contributions, goals, statistics, transactions, transfers, user,
};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

async fn auth(
    auth_header: TypedHeader<Authorization<Basic>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
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
    Router::new()
        .route("/accounts", post(accounts::create).get(accounts::list))
        .route(
            "/accounts/{id}",
            get(accounts::get)
                .patch(accounts::update)
                .delete(accounts::remove),
        )
        .route("/accounts/{id}/active", patch(accounts::set_active))
        .route("/categories", post(categories::create).get(categories::list))
        .route("/categories/{id}/archive", patch(categories::set_archived))
        .route(
            "/transactions",
            post(transactions::create).get(transactions::list),
        )
        .route(
            "/transactions/{id}",
            get(transactions::get)
                .patch(transactions::update)
                .delete(transactions::remove),
        )
        .route("/transfers", post(transfers::create).get(transfers::list))
        .route(
            "/transfers/{id}",
            get(transfers::get)
                .patch(transfers::update)
                .delete(transfers::remove),
        )
        .route("/goals", post(goals::create).get(goals::list))
        .route(
            "/goals/{id}",
            get(goals::get).patch(goals::update).delete(goals::remove),
        )
        .route(
            "/goals/{id}/contributions",
            get(contributions::list_for_goal),
        )
        .route("/contributions", post(contributions::create))
        .route(
            "/contributions/{id}",
            get(contributions::get).delete(contributions::remove),
        )
        .route("/stats", get(statistics::get_stats))
        .route("/balances/recompute", post(statistics::recompute))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
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
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, header};
    use base64::Engine as _;
    use http_body_util::BodyExt;
    use migration::MigratorTrait;
    use sea_orm::{ConnectionTrait, Database, Statement};
    use tower::ServiceExt;

    async fn test_router() -> Router {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let backend = db.get_database_backend();
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password) VALUES (?, ?)",
            vec!["alice".into(), "password".into()],
        ))
        .await
        .unwrap();
        let engine = Engine::builder()
            .database(db.clone())
            .build()
            .await
            .unwrap();
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

    #[tokio::test]
    async fn requests_without_credentials_are_rejected() {
        let router = test_router().await;

        let response = router
            .oneshot(
                HttpRequest::builder()
                    .uri("/accounts")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let router = test_router().await;
        let credentials = format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode("alice:wrong")
        );

        let response = router
            .oneshot(
                HttpRequest::builder()
                    .uri("/accounts")
                    .header(header::AUTHORIZATION, credentials)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn create_and_fetch_account_roundtrip() {
        let router = test_router().await;

        let payload = serde_json::json!({
            "name": "Checking",
            "kind": "checking",
            "initial_balance_minor": 10000
        });
        let response = router
            .clone()
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/accounts")
                    .header(header::AUTHORIZATION, basic_auth())
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let created: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let id = created["id"].as_str().unwrap().to_string();

        let response = router
            .oneshot(
                HttpRequest::builder()
                    .uri(format!("/accounts/{id}"))
                    .header(header::AUTHORIZATION, basic_auth())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let view: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(view["name"], "Checking");
        assert_eq!(view["current_balance_minor"], 10000);
        assert_eq!(view["currency"], "EUR");
    }

    #[tokio::test]
    async fn self_transfer_maps_to_unprocessable_entity() {
        let router = test_router().await;

        let payload = serde_json::json!({
            "name": "Checking",
            "kind": "checking",
            "initial_balance_minor": 10000
        });
        let response = router
            .clone()
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/accounts")
                    .header(header::AUTHORIZATION, basic_auth())
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let created: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let id = created["id"].as_str().unwrap().to_string();

        let payload = serde_json::json!({
            "from_account_id": id,
            "to_account_id": id,
            "amount_minor": 500,
            "occurred_at": "2026-03-15T12:00:00+00:00"
        });
        let response = router
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/transfers")
                    .header(header::AUTHORIZATION, basic_auth())
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
