//! Tests for commission registry and lifecycle handlers.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use mockable::DefaultClock;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::{DisplayName, Error, Profile, UserId};
use crate::domain::ports::{
    MockBidCommand, MockBidQuery, MockCommissionCommand, MockCommissionQuery, MockProfileCommand,
    MockProfileQuery,
};
use crate::inbound::http::profiles::sign_up;
use crate::inbound::http::state::HttpStatePorts;
use crate::inbound::http::test_utils::{
    get_json, in_memory_state, post_json, sign_up_as, test_session_middleware,
};
use crate::inbound::http::validation::json_config;

fn test_app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .app_data(json_config())
        .wrap(test_session_middleware())
        .service(
            web::scope("/api/v1")
                .service(sign_up)
                .service(create_commission)
                .service(list_commissions)
                .service(get_commission)
                .service(revise_commission)
                .service(transition_commission)
                .service(dashboard),
        )
}

fn in_memory_app_state() -> HttpState {
    in_memory_state(Arc::new(DefaultClock))
}

fn brief(title: &str) -> Value {
    json!({
        "title": title,
        "description": "A watercolour of our house",
        "category": "Illustration",
        "budgetMin": 5_000,
        "budgetMax": 20_000,
        "deadline": "2099-12-31"
    })
}

#[actix_web::test]
async fn customers_post_open_commissions() {
    let app = actix_test::init_service(test_app(in_memory_app_state())).await;
    let (cookie, customer_id) = sign_up_as(&app, "Carol Customer", "customer").await;

    let (status, body) = post_json(&app, "/api/v1/commissions", &cookie, brief("House")).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], json!("open"));
    assert_eq!(body["customerId"], json!(customer_id));
    assert_eq!(body["budgetMax"], json!(20_000));
    assert_eq!(body["revision"], json!(0));
    assert!(body.get("artistId").is_none());
}

#[actix_web::test]
async fn artists_cannot_post_commissions() {
    let app = actix_test::init_service(test_app(in_memory_app_state())).await;
    let (cookie, _) = sign_up_as(&app, "Arty Artist", "artist").await;

    let (status, body) = post_json(&app, "/api/v1/commissions", &cookie, brief("House")).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["details"]["code"], json!("role_required"));
}

#[rstest]
#[case(json!({"description": "d"}), "title", "missing_field")]
#[case(json!({"title": "t", "description": "d", "deadline": "soon"}), "deadline", "invalid_date")]
#[case(
    json!({"title": "t", "description": "d", "deadline": "2001-01-01"}),
    "deadline",
    "validation_failed"
)]
#[case(
    json!({"title": "t", "description": "d", "budgetMin": 9, "budgetMax": 1}),
    "budgetMin",
    "validation_failed"
)]
#[actix_web::test]
async fn invalid_briefs_are_rejected(
    #[case] payload: Value,
    #[case] field: &str,
    #[case] code: &str,
) {
    let app = actix_test::init_service(test_app(in_memory_app_state())).await;
    let (cookie, _) = sign_up_as(&app, "Carol Customer", "customer").await;

    let (status, body) = post_json(&app, "/api/v1/commissions", &cookie, payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], json!(field));
    assert_eq!(body["details"]["code"], json!(code));
}

#[actix_web::test]
async fn listing_pages_newest_first_with_links() {
    let app = actix_test::init_service(test_app(in_memory_app_state())).await;
    let (cookie, _) = sign_up_as(&app, "Carol Customer", "customer").await;
    for title in ["First", "Second", "Third"] {
        post_json(&app, "/api/v1/commissions", &cookie, brief(title)).await;
    }

    let (status, first) = get_json(&app, "/api/v1/commissions?limit=2", &cookie).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = first["data"]
        .as_array()
        .expect("data array")
        .iter()
        .filter_map(|c| c["title"].as_str())
        .collect();
    assert_eq!(titles, vec!["Third", "Second"]);
    let next = first["links"]["next"].as_str().expect("next link");
    assert!(next.contains("cursor="));

    let cursor = first["nextCursor"].as_str().expect("cursor");
    let (_, second) = get_json(
        &app,
        &format!("/api/v1/commissions?limit=2&cursor={cursor}"),
        &cookie,
    )
    .await;
    assert_eq!(second["data"][0]["title"], json!("First"));
    assert!(second.get("nextCursor").is_none());
}

#[actix_web::test]
async fn listing_rejects_unknown_status() {
    let app = actix_test::init_service(test_app(in_memory_app_state())).await;
    let (cookie, _) = sign_up_as(&app, "Carol Customer", "customer").await;

    let (status, body) = get_json(&app, "/api/v1/commissions?status=done", &cookie).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["code"], json!("invalid_status"));
}

#[actix_web::test]
async fn other_customers_cannot_see_a_commission() {
    let app = actix_test::init_service(test_app(in_memory_app_state())).await;
    let (owner, _) = sign_up_as(&app, "Carol Customer", "customer").await;
    let (stranger, _) = sign_up_as(&app, "Dave Customer", "customer").await;
    let (_, created) = post_json(&app, "/api/v1/commissions", &owner, brief("House")).await;
    let uri = format!("/api/v1/commissions/{}", created["id"].as_str().expect("id"));

    let (owner_status, _) = get_json(&app, &uri, &owner).await;
    let (stranger_status, _) = get_json(&app, &uri, &stranger).await;

    assert_eq!(owner_status, StatusCode::OK);
    assert_eq!(stranger_status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn malformed_ids_are_bad_requests() {
    let app = actix_test::init_service(test_app(in_memory_app_state())).await;
    let (cookie, _) = sign_up_as(&app, "Carol Customer", "customer").await;

    let (status, body) = get_json(&app, "/api/v1/commissions/not-a-uuid", &cookie).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["code"], json!("invalid_uuid"));
}

#[actix_web::test]
async fn revision_clears_nullable_fields() {
    let app = actix_test::init_service(test_app(in_memory_app_state())).await;
    let (cookie, _) = sign_up_as(&app, "Carol Customer", "customer").await;
    let (_, created) = post_json(&app, "/api/v1/commissions", &cookie, brief("House")).await;
    let uri = format!("/api/v1/commissions/{}", created["id"].as_str().expect("id"));

    let request = actix_test::TestRequest::patch()
        .uri(&uri)
        .cookie(cookie)
        .set_json(json!({"title": "House at dusk", "category": null, "budgetMax": null}))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: CommissionResponse = actix_test::read_body_json(response).await;
    assert_eq!(body.title, "House at dusk");
    assert_eq!(body.category, None);
    assert_eq!(body.budget_max, None);
    assert_eq!(body.budget_min, Some(5_000));
    assert_eq!(body.revision, 1);
}

#[actix_web::test]
async fn owners_cancel_open_commissions() {
    let app = actix_test::init_service(test_app(in_memory_app_state())).await;
    let (cookie, _) = sign_up_as(&app, "Carol Customer", "customer").await;
    let (_, created) = post_json(&app, "/api/v1/commissions", &cookie, brief("House")).await;
    let uri = format!(
        "/api/v1/commissions/{}/transitions",
        created["id"].as_str().expect("id")
    );

    let (status, body) = post_json(&app, &uri, &cookie, json!({"to": "cancelled"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], json!("applied"));
    assert_eq!(body["commission"]["status"], json!("cancelled"));
}

#[rstest]
#[case(json!({"to": "completed"}), StatusCode::CONFLICT, "illegal_transition")]
#[case(json!({"to": "finished"}), StatusCode::BAD_REQUEST, "invalid_status")]
#[case(json!({}), StatusCode::BAD_REQUEST, "missing_field")]
#[actix_web::test]
async fn bad_transitions_are_refused(
    #[case] payload: Value,
    #[case] expected: StatusCode,
    #[case] code: &str,
) {
    let app = actix_test::init_service(test_app(in_memory_app_state())).await;
    let (cookie, _) = sign_up_as(&app, "Carol Customer", "customer").await;
    let (_, created) = post_json(&app, "/api/v1/commissions", &cookie, brief("House")).await;
    let uri = format!(
        "/api/v1/commissions/{}/transitions",
        created["id"].as_str().expect("id")
    );

    let (status, body) = post_json(&app, &uri, &cookie, payload).await;

    assert_eq!(status, expected);
    assert_eq!(body["details"]["code"], json!(code));
}

#[actix_web::test]
async fn artist_dashboard_shows_open_work() {
    let app = actix_test::init_service(test_app(in_memory_app_state())).await;
    let (customer, _) = sign_up_as(&app, "Carol Customer", "customer").await;
    let (artist, _) = sign_up_as(&app, "Arty Artist", "artist").await;
    post_json(&app, "/api/v1/commissions", &customer, brief("House")).await;
    post_json(&app, "/api/v1/commissions", &customer, brief("Dog")).await;

    let (status, body) = get_json(&app, "/api/v1/dashboard?limit=1", &artist).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], json!("artist"));
    assert_eq!(body["commissions"]["data"].as_array().map(Vec::len), Some(1));
    assert!(body["commissions"]["nextCursor"].is_string());
    assert_eq!(body["counts"]["open"], json!(2));
}

#[actix_web::test]
async fn store_timeouts_surface_as_gateway_timeouts() {
    let mut query = MockCommissionQuery::new();
    query
        .expect_get_commission()
        .returning(|_, _| Err(Error::timeout("commission lookup timed out")));
    let mut profiles = MockProfileCommand::new();
    profiles.expect_sign_up().returning(|request| {
        let name = DisplayName::new(request.display_name).expect("name");
        Ok(Profile::new(
            UserId::random(),
            request.role,
            name,
            None,
            chrono::Utc::now(),
        ))
    });
    let state = HttpState::new(HttpStatePorts {
        profiles: Arc::new(profiles),
        profiles_query: Arc::new(MockProfileQuery::new()),
        commissions: Arc::new(MockCommissionCommand::new()),
        commissions_query: Arc::new(query),
        bids: Arc::new(MockBidCommand::new()),
        bids_query: Arc::new(MockBidQuery::new()),
    });
    let app = actix_test::init_service(test_app(state)).await;
    let (cookie, _) = sign_up_as(&app, "Carol Customer", "customer").await;

    let (status, body) = get_json(
        &app,
        &format!("/api/v1/commissions/{}", Uuid::new_v4()),
        &cookie,
    )
    .await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["code"], json!("timeout"));
}
