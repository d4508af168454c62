//! Application router: the JSON API under `/api/v1`, the HTML pages and the
//! HTMX endpoints behind them.

use axum::{
    Router,
    routing::{get, patch, post, put},
};
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::{
    AppState,
    account::{
        create_account_endpoint, create_account_handler, delete_account_endpoint,
        delete_account_handler, get_account_handler, get_accounts_page, get_accounts_partial,
        get_edit_account_page, get_new_account_page, list_accounts, update_account_endpoint,
        update_account_handler,
    },
    api::get_health,
    balance::{
        get_balance_handler, get_balance_summary_handler, get_balance_summary_partial,
        get_balances_page, list_balances, refresh_all_balances_endpoint,
        refresh_all_balances_handler, refresh_balance_endpoint, refresh_balance_handler,
    },
    category::{
        create_category_endpoint, create_category_handler, delete_category_endpoint,
        delete_category_handler, get_categories_page, get_categories_partial, get_category_handler,
        get_edit_category_page, get_new_category_page, list_categories, update_category_endpoint,
        update_category_handler,
    },
    dashboard::get_dashboard_page,
    endpoints,
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    transaction::{
        create_transaction_endpoint, create_transaction_handler, delete_transaction_endpoint,
        delete_transaction_handler, get_edit_transaction_page, get_new_transaction_page,
        get_transaction_handler, get_transactions_page, get_transactions_partial,
        list_transactions_handler, update_transaction_endpoint, update_transaction_handler,
        update_transaction_status_handler,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route(
            endpoints::API_ACCOUNTS,
            get(list_accounts).post(create_account_handler),
        )
        .route(
            endpoints::API_ACCOUNT,
            get(get_account_handler)
                .put(update_account_handler)
                .delete(delete_account_handler),
        )
        .route(
            endpoints::API_CATEGORIES,
            get(list_categories).post(create_category_handler),
        )
        .route(
            endpoints::API_CATEGORY,
            get(get_category_handler)
                .put(update_category_handler)
                .delete(delete_category_handler),
        )
        .route(
            endpoints::API_TRANSACTIONS,
            get(list_transactions_handler).post(create_transaction_handler),
        )
        .route(
            endpoints::API_TRANSACTION,
            get(get_transaction_handler)
                .put(update_transaction_handler)
                .delete(delete_transaction_handler),
        )
        .route(
            endpoints::API_TRANSACTION_STATUS,
            patch(update_transaction_status_handler),
        )
        .route(endpoints::API_BALANCES, get(list_balances))
        .route(
            endpoints::API_BALANCE_SUMMARY,
            get(get_balance_summary_handler),
        )
        .route(
            endpoints::API_BALANCES_REFRESH,
            post(refresh_all_balances_handler),
        )
        .route(endpoints::API_BALANCE, get(get_balance_handler))
        .route(
            endpoints::API_BALANCE_REFRESH,
            post(refresh_balance_handler),
        )
        .layer(CorsLayer::permissive());

    let page_routes = Router::new()
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::ACCOUNTS_VIEW, get(get_accounts_page))
        .route(endpoints::NEW_ACCOUNT_VIEW, get(get_new_account_page))
        .route(endpoints::EDIT_ACCOUNT_VIEW, get(get_edit_account_page))
        .route(endpoints::CATEGORIES_VIEW, get(get_categories_page))
        .route(endpoints::NEW_CATEGORY_VIEW, get(get_new_category_page))
        .route(endpoints::EDIT_CATEGORY_VIEW, get(get_edit_category_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(
            endpoints::NEW_TRANSACTION_VIEW,
            get(get_new_transaction_page),
        )
        .route(
            endpoints::EDIT_TRANSACTION_VIEW,
            get(get_edit_transaction_page),
        )
        .route(endpoints::BALANCES_VIEW, get(get_balances_page))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let htmx_routes = Router::new()
        .route(endpoints::POST_ACCOUNT, post(create_account_endpoint))
        .route(
            endpoints::PUT_ACCOUNT,
            put(update_account_endpoint).delete(delete_account_endpoint),
        )
        .route(endpoints::POST_CATEGORY, post(create_category_endpoint))
        .route(
            endpoints::PUT_CATEGORY,
            put(update_category_endpoint).delete(delete_category_endpoint),
        )
        .route(
            endpoints::POST_TRANSACTION,
            post(create_transaction_endpoint),
        )
        .route(
            endpoints::PUT_TRANSACTION,
            put(update_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::REFRESH_ALL_BALANCES,
            post(refresh_all_balances_endpoint),
        )
        .route(endpoints::REFRESH_BALANCE, post(refresh_balance_endpoint))
        .route(endpoints::ACCOUNTS_PARTIAL, get(get_accounts_partial))
        .route(endpoints::CATEGORIES_PARTIAL, get(get_categories_partial))
        .route(
            endpoints::TRANSACTIONS_PARTIAL,
            get(get_transactions_partial),
        )
        .route(
            endpoints::BALANCE_SUMMARY_PARTIAL,
            get(get_balance_summary_partial),
        );

    Router::new()
        .route(endpoints::HEALTH, get(get_health))
        .merge(api_routes)
        .merge(page_routes)
        .merge(htmx_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

#[cfg(test)]
mod api_route_tests {
    use axum::{body::Bytes, http::StatusCode};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};

    use crate::{AppState, endpoints, endpoints::format_endpoint, money::Asset};

    use super::build_router;

    fn get_test_server() -> TestServer {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        let state = AppState::new(connection, Asset::USD).expect("Could not create app state");

        TestServer::try_new(build_router(state)).expect("Could not create test server.")
    }

    async fn create_account(server: &TestServer) -> Value {
        let response = server
            .post(endpoints::API_ACCOUNTS)
            .json(&json!({"name": "Everyday", "type": "checking", "asset": "USD"}))
            .await;
        response.assert_status(StatusCode::CREATED);

        response.json()
    }

    async fn create_category(server: &TestServer, name: &str, category_type: &str) -> Value {
        let response = server
            .post(endpoints::API_CATEGORIES)
            .json(&json!({"name": name, "type": category_type}))
            .await;
        response.assert_status(StatusCode::CREATED);

        response.json()
    }

    async fn create_transaction(server: &TestServer, body: Value) -> Value {
        let response = server.post(endpoints::API_TRANSACTIONS).json(&body).await;
        response.assert_status(StatusCode::CREATED);

        response.json()
    }

    #[tokio::test]
    async fn health_check_is_ok() {
        let server = get_test_server();

        server.get(endpoints::HEALTH).await.assert_status_ok();
    }

    #[tokio::test]
    async fn empty_lists_are_empty_arrays() {
        let server = get_test_server();

        for path in [
            endpoints::API_ACCOUNTS,
            endpoints::API_CATEGORIES,
            endpoints::API_TRANSACTIONS,
            endpoints::API_BALANCES,
        ] {
            let response = server.get(path).await;
            response.assert_status_ok();
            response.assert_json(&json!([]));
        }
    }

    #[tokio::test]
    async fn expense_amount_is_stored_negative() {
        let server = get_test_server();
        let account = create_account(&server).await;
        let category = create_category(&server, "Groceries", "expense").await;

        let transaction = create_transaction(
            &server,
            json!({
                "account_id": account["id"],
                "category_id": category["id"],
                "amount": "42.10",
                "description": "Weekly shop",
                "date": "2024-03-01",
            }),
        )
        .await;

        assert_eq!(transaction["amount"]["minor_units"], json!(-4210));
        assert_eq!(transaction["amount"]["amount"], json!("-42.10"));
        assert_eq!(transaction["status"], json!("cleared"));
        assert_eq!(transaction["date"], json!("2024-03-01"));
    }

    #[tokio::test]
    async fn missing_date_defaults_to_today() {
        let server = get_test_server();
        let account = create_account(&server).await;
        let category = create_category(&server, "Salary", "income").await;
        let today = time::OffsetDateTime::now_utc().date().to_string();

        let transaction = create_transaction(
            &server,
            json!({
                "account_id": account["id"],
                "category_id": category["id"],
                "amount": 100,
                "description": "Pay",
            }),
        )
        .await;

        assert_eq!(transaction["amount"]["minor_units"], json!(10000));
        let date = transaction["date"].as_str().unwrap();
        assert!(date.starts_with(&today), "want {today}, got {date}");
    }

    #[tokio::test]
    async fn bad_amount_and_bad_date_are_bad_requests() {
        let server = get_test_server();
        let account = create_account(&server).await;
        let category = create_category(&server, "Groceries", "expense").await;

        let response = server
            .post(endpoints::API_TRANSACTIONS)
            .json(&json!({
                "account_id": account["id"],
                "category_id": category["id"],
                "amount": "abc",
                "description": "Weekly shop",
            }))
            .await;
        response.assert_status_bad_request();
        assert_eq!(
            response.json::<Value>()["error"],
            json!("invalid parameter amount: must be a valid decimal number")
        );

        let response = server
            .post(endpoints::API_TRANSACTIONS)
            .json(&json!({
                "account_id": account["id"],
                "category_id": category["id"],
                "amount": "1.00",
                "description": "Weekly shop",
                "date": "01/03/2024",
            }))
            .await;
        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn bad_list_date_is_bad_request() {
        let server = get_test_server();

        server
            .get(endpoints::API_TRANSACTIONS)
            .add_query_param("start_date", "2024-13-01")
            .add_query_param("end_date", "2024-12-31")
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn missing_resources_are_not_found() {
        let server = get_test_server();
        let missing_id = uuid::Uuid::new_v4();

        for path in [
            format_endpoint(endpoints::API_ACCOUNT, missing_id),
            format_endpoint(endpoints::API_CATEGORY, missing_id),
            format_endpoint(endpoints::API_TRANSACTION, missing_id),
            format_endpoint(endpoints::API_BALANCE, missing_id),
            format_endpoint(endpoints::API_ACCOUNT, "not-a-uuid"),
        ] {
            server.get(&path).await.assert_status_not_found();
        }

        server
            .delete(&format_endpoint(endpoints::API_TRANSACTION, missing_id))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn deleting_account_removes_its_transactions() {
        let server = get_test_server();
        let account = create_account(&server).await;
        let category = create_category(&server, "Groceries", "expense").await;
        let transaction = create_transaction(
            &server,
            json!({
                "account_id": account["id"],
                "category_id": category["id"],
                "amount": "5",
                "description": "Snack",
            }),
        )
        .await;
        let account_id = account["id"].as_str().unwrap();
        let transaction_id = transaction["id"].as_str().unwrap();

        server
            .delete(&format_endpoint(endpoints::API_ACCOUNT, account_id))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        server
            .get(&format_endpoint(endpoints::API_TRANSACTION, transaction_id))
            .await
            .assert_status_not_found();
        server
            .get(&format_endpoint(endpoints::API_BALANCE, account_id))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn category_in_use_cannot_be_deleted() {
        let server = get_test_server();
        let account = create_account(&server).await;
        let category = create_category(&server, "Groceries", "expense").await;
        create_transaction(
            &server,
            json!({
                "account_id": account["id"],
                "category_id": category["id"],
                "amount": "5",
                "description": "Snack",
            }),
        )
        .await;

        server
            .delete(&format_endpoint(endpoints::API_CATEGORY, category["id"].as_str().unwrap()))
            .await
            .assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn balance_follows_status_changes() {
        let server = get_test_server();
        let account = create_account(&server).await;
        let category = create_category(&server, "Salary", "income").await;
        let transaction = create_transaction(
            &server,
            json!({
                "account_id": account["id"],
                "category_id": category["id"],
                "amount": "250.00",
                "description": "Pay",
                "status": "pending",
            }),
        )
        .await;
        let account_id = account["id"].as_str().unwrap();
        let balance_path = format_endpoint(endpoints::API_BALANCE, account_id);

        let balance: Value = server.get(&balance_path).await.json();
        assert_eq!(balance["current"]["minor_units"], json!(0));
        assert_eq!(balance["pending"]["minor_units"], json!(25000));

        server
            .patch(&format_endpoint(
                endpoints::API_TRANSACTION_STATUS,
                transaction["id"].as_str().unwrap(),
            ))
            .json(&json!({"status": "cleared"}))
            .await
            .assert_status_ok();

        let balance: Value = server.get(&balance_path).await.json();
        assert_eq!(balance["current"]["minor_units"], json!(25000));
        assert_eq!(balance["available"]["minor_units"], json!(25000));

        let summary: Value = server.get(endpoints::API_BALANCE_SUMMARY).await.json();
        assert_eq!(summary["net_worth"]["display"], json!("[USD ($) 250.00]"));
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let server = get_test_server();

        server
            .post(endpoints::API_ACCOUNTS)
            .content_type("application/json")
            .bytes(Bytes::from_static(b"{not json"))
            .await
            .assert_status_bad_request();
    }
}
