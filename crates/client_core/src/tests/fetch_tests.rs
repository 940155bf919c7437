use std::sync::Arc;

use axum::{
    extract::{Path, RawQuery, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use shared::{
    domain::{AccountType, AssetId, AssetState, CategoryId, SortField, SortOrder, UserId},
    error::{ApiError, ErrorCode},
    protocol::{AssetPage, AssetSummary, PageMeta, Profile},
};
use tokio::{net::TcpListener, sync::Mutex};

use super::*;

async fn spawn_server(app: Router) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

fn sample_asset() -> AssetSummary {
    AssetSummary {
        id: AssetId(101),
        asset_code: "LA000101".to_string(),
        name: "ThinkPad T14".to_string(),
        category: CategorySummary {
            id: CategoryId(1),
            name: "Laptop".to_string(),
        },
        state: AssetState::Available,
    }
}

fn epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(0, 0).unwrap_or_default()
}

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Option<String>>>);

async fn handle_list_assets(
    State(captured): State<Captured>,
    RawQuery(query): RawQuery,
) -> Json<AssetPage> {
    *captured.0.lock().await = query;
    Json(AssetPage {
        items: vec![sample_asset()],
        pagination: PageMeta { total_pages: 3 },
    })
}

#[tokio::test]
async fn list_assets_encodes_the_full_parameter_tuple() {
    let captured = Captured::default();
    let app = Router::new()
        .route("/assets", get(handle_list_assets))
        .with_state(captured.clone());
    let base = spawn_server(app).await;
    let directory = HttpAssetDirectory::new(&base).expect("directory");

    let query = AssetListQuery {
        page: 2,
        take: 10,
        search: "lap top".to_string(),
        states: vec![AssetState::Assigned, AssetState::Available],
        category_ids: vec![CategoryId(1), CategoryId(3)],
        sort_field: SortField::AssetCode,
        sort_order: SortOrder::Asc,
    };
    let page = directory.list_assets(&query).await.expect("page");
    assert_eq!(page.pagination.total_pages, 3);
    assert_eq!(page.items, vec![sample_asset()]);

    let raw = captured.0.lock().await.clone().expect("query captured");
    assert_eq!(
        raw,
        "page=2&take=10&search=lap+top&states=ASSIGNED&states=AVAILABLE\
         &categoryIds=1&categoryIds=3&sortField=assetCode&sortOrder=ASC"
    );
}

#[tokio::test]
async fn empty_search_and_filters_are_omitted_from_the_query_string() {
    let captured = Captured::default();
    let app = Router::new()
        .route("/assets", get(handle_list_assets))
        .with_state(captured.clone());
    let base = spawn_server(app).await;
    let directory = HttpAssetDirectory::new(&base).expect("directory");

    let query = AssetListQuery {
        page: 1,
        take: 10,
        search: String::new(),
        states: Vec::new(),
        category_ids: Vec::new(),
        sort_field: SortField::Name,
        sort_order: SortOrder::Desc,
    };
    directory.list_assets(&query).await.expect("page");

    let raw = captured.0.lock().await.clone().expect("query captured");
    assert_eq!(raw, "page=1&take=10&sortField=name&sortOrder=DESC");
}

#[tokio::test]
async fn page_zero_fails_validation_before_any_request() {
    let directory = HttpAssetDirectory::new("http://127.0.0.1:9").expect("directory");
    let query = AssetListQuery {
        page: 0,
        take: 10,
        search: String::new(),
        states: Vec::new(),
        category_ids: Vec::new(),
        sort_field: SortField::AssetCode,
        sort_order: SortOrder::Asc,
    };
    let err = directory.list_assets(&query).await.expect_err("invalid");
    assert!(matches!(err, FetchError::Validation(_)));
}

#[tokio::test]
async fn server_error_body_message_is_surfaced() {
    let app = Router::new().route(
        "/assets",
        get(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new(ErrorCode::Internal, "database exploded")),
            )
        }),
    );
    let base = spawn_server(app).await;
    let directory = HttpAssetDirectory::new(&base).expect("directory");

    let query = AssetListQuery {
        page: 1,
        take: 10,
        search: String::new(),
        states: Vec::new(),
        category_ids: Vec::new(),
        sort_field: SortField::AssetCode,
        sort_order: SortOrder::Asc,
    };
    match directory.list_assets(&query).await {
        Err(FetchError::Server { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "database exploded");
        }
        other => panic!("expected server error, got {other:?}"),
    }
}

#[tokio::test]
async fn undecodable_error_body_falls_back_to_status_reason() {
    let app = Router::new().route("/categories", get(|| async { StatusCode::NOT_FOUND }));
    let base = spawn_server(app).await;
    let directory = HttpAssetDirectory::new(&base).expect("directory");

    match directory.list_categories().await {
        Err(FetchError::Server { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "Not Found");
        }
        other => panic!("expected server error, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    // Bind then drop a listener so the port is known-closed.
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let directory = HttpAssetDirectory::new(&format!("http://{addr}")).expect("directory");
    let err = directory.list_categories().await.expect_err("unreachable");
    assert!(matches!(err, FetchError::Network { .. }));
}

#[tokio::test]
async fn get_asset_resolves_the_detail_record() {
    let app = Router::new().route(
        "/assets/:id",
        get(|Path(id): Path<i64>| async move {
            Json(AssetDetail {
                summary: AssetSummary {
                    id: AssetId(id),
                    ..sample_asset()
                },
                specification: Some("14in, 32GB RAM".to_string()),
                installed_date: epoch(),
                location: Some("HN office".to_string()),
            })
        }),
    );
    let base = spawn_server(app).await;
    let directory = HttpAssetDirectory::new(&base).expect("directory");

    let detail = directory.get_asset(AssetId(42)).await.expect("detail");
    assert_eq!(detail.summary.id, AssetId(42));
    assert_eq!(detail.specification.as_deref(), Some("14in, 32GB RAM"));
}

#[tokio::test]
async fn list_assignments_pages_with_the_default_page_size() {
    let captured = Captured::default();
    let app = Router::new()
        .route(
            "/assignments",
            get(
                |State(captured): State<Captured>, RawQuery(query): RawQuery| async move {
                    *captured.0.lock().await = query;
                    Json(AssignmentPage {
                        items: Vec::new(),
                        pagination: PageMeta { total_pages: 0 },
                    })
                },
            ),
        )
        .with_state(captured.clone());
    let base = spawn_server(app).await;
    let directory = HttpAssetDirectory::new(&base).expect("directory");

    directory.list_assignments(2).await.expect("page");
    let raw = captured.0.lock().await.clone().expect("query captured");
    assert_eq!(raw, "page=2&take=10");
}

#[tokio::test]
async fn login_returns_the_authenticated_profile() {
    let app = Router::new().route(
        "/auth/login",
        post(|Json(request): Json<LoginRequest>| async move {
            assert_eq!(request.username, "adminhn");
            Json(Profile {
                user_id: UserId(7),
                username: request.username,
                full_name: "Nguyen Van A".to_string(),
                account_type: AccountType::Admin,
            })
        }),
    );
    let base = spawn_server(app).await;
    let directory = HttpAssetDirectory::new(&base).expect("directory");

    let profile = directory
        .login(&LoginRequest {
            username: "adminhn".to_string(),
            password: "s3cret".to_string(),
        })
        .await
        .expect("profile");
    assert_eq!(profile.user_id, UserId(7));
    assert_eq!(profile.account_type, AccountType::Admin);
}
