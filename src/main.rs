//src/main.rs

use anyhow::Context;
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

// Importações principais
use crate::config::{AppState, Config};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let config = Config::from_env()?;
    let app_state = AppState::new(&config)
        .await
        .context("Falha ao inicializar o estado da aplicação")?;

    let app = build_router(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Falha ao iniciar o listener TCP em {}", config.bind_addr))?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("Erro no servidor Axum")?;
    Ok(())
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn build_router(app_state: AppState) -> Router {
    let stall_routes = Router::new()
        .route("/"
               ,get(handlers::stalls::list_stalls)
               .post(handlers::stalls::create_stall)
        )
        .route("/available", get(handlers::stalls::list_available))
        .route("/{id}"
               ,get(handlers::stalls::get_stall)
               .put(handlers::stalls::update_stall)
               .delete(handlers::stalls::delete_stall)
        );

    let lease_routes = Router::new()
        .route("/"
               ,get(handlers::leases::list_leases)
               .post(handlers::leases::submit_lease)
        )
        .route("/requests", get(handlers::leases::list_requests))
        .route("/approved", get(handlers::leases::list_approved))
        .route("/renewable", get(handlers::leases::list_renewable))
        .route("/{id}", get(handlers::leases::get_lease))
        .route("/{id}/approve", post(handlers::leases::approve_lease))
        .route("/{id}/reject", post(handlers::leases::reject_lease))
        .route("/{id}/renew", post(handlers::leases::renew_lease));

    let tenant_routes = Router::new()
        .route("/", get(handlers::tenants::list_tenants))
        .route("/{id}"
               ,get(handlers::tenants::get_tenant)
               .put(handlers::tenants::update_tenant)
               .delete(handlers::tenants::delete_tenant)
        );

    let expense_routes = Router::new()
        .route("/"
               ,get(handlers::expenses::list_expenses)
               .post(handlers::expenses::create_expense)
        )
        .route("/{id}"
               ,get(handlers::expenses::get_expense)
               .delete(handlers::expenses::delete_expense)
        )
        .route("/{id}/approve", post(handlers::expenses::approve_expense))
        .route("/{id}/reject", post(handlers::expenses::reject_expense))
        .route("/{id}/review", post(handlers::expenses::review_expense))
        .route("/{id}/check-request", post(handlers::expenses::generate_check_request))
        .route("/{id}/release", post(handlers::expenses::authorize_release));

    let check_routes = Router::new()
        .route("/requests"
               ,get(handlers::checks::list_requests)
               .post(handlers::checks::create_request)
        )
        .route("/requests/{id}", axum::routing::delete(handlers::checks::delete_request))
        .route("/requests/{id}/approve", post(handlers::checks::approve_request))
        .route("/requests/{id}/reject", post(handlers::checks::reject_request))
        .route("/requests/{id}/release", post(handlers::checks::release_request))
        .route("/releases", get(handlers::checks::list_releases));

    let inventory_routes = Router::new()
        .route("/"
               ,get(handlers::inventory::list_items)
               .post(handlers::inventory::create_item)
        )
        .route("/summary", get(handlers::inventory::get_summary))
        .route("/adjustments", get(handlers::inventory::list_adjustments))
        .route("/adjustments/{id}", axum::routing::delete(handlers::inventory::delete_adjustment))
        .route("/{id}/adjust", post(handlers::inventory::adjust_stock))
        .route("/purchase-orders"
               ,get(handlers::inventory::list_purchase_orders)
               .post(handlers::inventory::create_purchase_order)
        )
        .route("/purchase-orders/{id}", axum::routing::delete(handlers::inventory::cancel_purchase_order))
        .route("/purchase-orders/{id}/receive", post(handlers::inventory::receive_purchase_order));

    let payment_routes = Router::new()
        .route("/"
               ,get(handlers::payments::list_payments)
               .post(handlers::payments::record_payment)
        )
        .route("/bulk", post(handlers::payments::record_bulk))
        .route("/daily", get(handlers::payments::daily_breakdown))
        .route("/{id}"
               ,get(handlers::payments::get_payment)
               .delete(handlers::payments::delete_payment)
        );

    let collector_routes = Router::new()
        .route("/", get(handlers::payments::list_collectors))
        .route("/{id}", axum::routing::put(handlers::payments::assign_collector));

    let document_routes = Router::new()
        .route("/validate", post(handlers::documents::validate_upload))
        .route("/capture", post(handlers::documents::capture_photo));

    // Tudo aqui exige token (protegido pelo middleware)
    let protected = Router::new()
        .route("/api/users/", get(handlers::auth::list_users))
        .route("/api/users/me/", get(handlers::auth::get_me))
        .route("/api/users/{id}/"
               ,axum::routing::put(handlers::auth::update_user)
               .delete(handlers::auth::delete_user)
        )
        .nest("/api/stalls", stall_routes)
        .nest("/api/leases", lease_routes)
        .nest("/api/tenants", tenant_routes)
        .nest("/api/expenses", expense_routes)
        .nest("/api/checks", check_routes)
        .nest("/api/inventory", inventory_routes)
        .nest("/api/payments", payment_routes)
        .nest("/api/collectors", collector_routes)
        .nest("/api/documents", document_routes)
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/openapi.json", get(openapi_json))
        .route("/api/register/", post(handlers::auth::register))
        .route("/api/auth/token/", post(handlers::auth::login))
        .merge(protected)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::{db::Store, services::document_service::DEFAULT_MAX_UPLOAD_BYTES};

    fn app() -> Router {
        let mut state = AppState::with_store(Store::in_memory(), "test-secret".into(), DEFAULT_MAX_UPLOAD_BYTES);
        state.auth_service = state.auth_service.clone().with_hash_cost(crate::services::auth::TEST_HASH_COST);
        build_router(state)
    }

    async fn call(app: &Router, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn signed_in(app: &Router) -> String {
        let (status, _) = call(app, "POST", "/api/register/", None, Some(json!({
            "username": "maria",
            "email": "maria@palengke.ph",
            "password": "palengke123",
            "first_name": "Maria",
            "last_name": "Santos",
            "role": "market_manager",
        })))
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = call(app, "POST", "/api/auth/token/", None, Some(json!({
            "username": "maria",
            "password": "palengke123",
        })))
        .await;
        assert_eq!(status, StatusCode::OK);
        body["access"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_is_public() {
        let response = app()
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn protected_routes_need_a_valid_token() {
        let app = app();

        let (status, body) = call(&app, "GET", "/api/stalls", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Authentication token is invalid or missing.");

        let (status, _) = call(&app, "GET", "/api/users/", Some("not-a-token"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let token = signed_in(&app).await;
        let (status, body) = call(&app, "GET", "/api/users/me/", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "maria");
        assert!(body.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn duplicate_registration_is_a_bad_request() {
        let app = app();
        signed_in(&app).await;

        let (status, body) = call(&app, "POST", "/api/register/", None, Some(json!({
            "username": "maria",
            "email": "other@palengke.ph",
            "password": "palengke123",
            "first_name": "Maria",
            "last_name": "Reyes",
            "role": "collector",
        })))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["username"], "Username already exists.");
    }

    #[tokio::test]
    async fn lease_approval_over_http() {
        let app = app();
        let token = signed_in(&app).await;
        let auth = Some(token.as_str());

        let (status, stall) = call(&app, "POST", "/api/stalls", auth, Some(json!({
            "type": "Food",
            "section": "Center",
            "location": "C1",
        })))
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(stall["id"], "ST-001");

        let (status, body) = call(&app, "POST", "/api/leases", auth, Some(json!({ "stallId": "ST-001" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["missingFields"], json!(["tenantName", "leaseStart", "monthlyRate"]));

        let (status, lease) = call(&app, "POST", "/api/leases", auth, Some(json!({
            "tenantName": "Ana Cruz",
            "stallId": "ST-001",
            "leaseStart": "2025-01-01",
            "monthlyRate": 5000,
        })))
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(lease["status"], "Pending Approval");
        let lease_id = lease["id"].as_str().unwrap().to_string();

        let approve = format!("/api/leases/{lease_id}/approve");
        let (status, body) = call(&app, "POST", &approve, auth, Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Valid ID is required for approval.");

        let (status, approved) = call(&app, "POST", &approve, auth, Some(json!({
            "documents": {
                "validId": {
                    "fileName": "id.jpg",
                    "fileType": "image/jpeg",
                    "content": "data:image/jpeg;base64,/9j/4AAQ",
                }
            }
        })))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(approved["lease"]["status"], "Approved");
        assert_eq!(approved["lease"]["approvedBy"], "Maria Santos");
        assert_eq!(approved["tenant"]["stallId"], "ST-001");

        let (_, stall) = call(&app, "GET", "/api/stalls/ST-001", auth, None).await;
        assert_eq!(stall["status"], "Occupied");
        let (_, available) = call(&app, "GET", "/api/stalls/available", auth, None).await;
        assert_eq!(available, json!([]));
        let (_, tenants) = call(&app, "GET", "/api/tenants", auth, None).await;
        assert_eq!(tenants.as_array().unwrap().len(), 1);

        let (status, _) = call(&app, "POST", &approve, auth, Some(json!({}))).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn deletes_require_a_reason() {
        let app = app();
        let token = signed_in(&app).await;
        let auth = Some(token.as_str());

        let (status, request) = call(&app, "POST", "/api/checks/requests", auth, Some(json!({
            "payee": "Meralco",
            "amount": 1200,
            "purpose": "Electric bill",
        })))
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let uri = format!("/api/checks/requests/{}", request["id"].as_str().unwrap());

        let (status, _) = call(&app, "DELETE", &uri, auth, Some(json!({ "reason": "  " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(&app, "DELETE", &uri, auth, Some(json!({ "reason": "Duplicate" }))).await;
        assert_eq!(status, StatusCode::OK);

        let (_, requests) = call(&app, "GET", "/api/checks/requests", auth, None).await;
        assert_eq!(requests, json!([]));
    }

    #[tokio::test]
    async fn openapi_document_lists_routes() {
        let (status, body) = call(&app(), "GET", "/api/openapi.json", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"].get("/api/leases/{id}/approve").is_some());
        assert!(body["components"]["securitySchemes"].get("api_jwt").is_some());
        assert!(body["paths"].get("/api/inventory/purchase-orders/{id}/receive").is_some());
        assert!(body["components"]["schemas"].get("BulkPaymentPayload").is_some());
        assert!(body["components"]["schemas"].get("Collector").is_some());
    }

    #[tokio::test]
    async fn purchase_order_is_received_into_stock_over_http() {
        let app = app();
        let token = signed_in(&app).await;
        let auth = Some(token.as_str());

        let (status, body) = call(&app, "POST", "/api/inventory/purchase-orders", auth, Some(json!({
            "vendor": "Manila Rice Traders",
            "date": "2025-03-01",
            "items": [{ "itemId": "ITEM-001", "qty": 0, "price": 40 }],
        })))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Please complete all item rows (select item, qty > 0, price).");

        let (status, order) = call(&app, "POST", "/api/inventory/purchase-orders", auth, Some(json!({
            "vendor": "Manila Rice Traders",
            "date": "2025-03-01",
            "items": [{ "itemId": "ITEM-001", "name": "Rice (25kg)", "qty": "10", "price": "40" }],
        })))
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(order["id"], "PO-0001");
        assert_eq!(order["status"], "Pending");

        let receive = "/api/inventory/purchase-orders/PO-0001/receive";
        let (status, order) = call(&app, "POST", receive, auth, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(order["status"], "Received");
        let (status, _) = call(&app, "POST", receive, auth, None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, items) = call(&app, "GET", "/api/inventory", auth, None).await;
        assert_eq!(items[0]["id"], "ITEM-001");
        assert_eq!(items[0]["qty"], 10);
        let (_, adjustments) = call(&app, "GET", "/api/inventory/adjustments", auth, None).await;
        assert_eq!(adjustments[0]["adjustedBy"], "Maria Santos");
    }

    #[tokio::test]
    async fn payments_name_their_collector() {
        let app = app();
        let token = signed_in(&app).await;
        let auth = Some(token.as_str());

        let (_, collectors) = call(&app, "GET", "/api/collectors", auth, None).await;
        assert_eq!(collectors.as_array().unwrap().len(), 3);

        let (status, collector) = call(&app, "PUT", "/api/collectors/C-002", auth, Some(json!({ "area": "Parking Zone 2" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(collector["area"], "Parking Zone 2");

        let (status, body) = call(&app, "POST", "/api/payments", auth, Some(json!({
            "paymentType": "parking",
            "collectorId": "C-009",
            "breakdown": { "others": 40 },
        })))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Collector C-009 is not registered.");

        let (status, payment) = call(&app, "POST", "/api/payments", auth, Some(json!({
            "paymentType": "parking",
            "collectorId": "C-002",
            "breakdown": { "others": 40 },
        })))
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(payment["collectorName"], "Maria Santos");
    }
}
