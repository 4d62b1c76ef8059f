//! Router-level tests against the in-memory store.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use solo_api::{create_router, ApiConfig, AppState};
use solo_store::Store;

const JOB_ID_A: &str = "65a1b2c3d4e5f6a7b8c9d0e1";

fn test_app() -> Router {
    let config = ApiConfig {
        token_secret: "test-secret".to_string(),
        ..Default::default()
    };
    create_router(AppState::new(config, Store::in_memory()), None)
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn set_cookie(response: &Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

/// Log in as `email` and return the `token=...` cookie pair.
async fn login(app: &Router, email: &str) -> String {
    let response = send(app, json_request("POST", "/jwt", json!({ "email": email }))).await;
    assert_eq!(response.status(), StatusCode::OK);
    set_cookie(&response).split(';').next().unwrap().to_string()
}

async fn create_job(app: &Router, job: Value) -> String {
    let response = send(app, json_request("POST", "/addJob", job)).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["insertedId"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_root_liveness() {
    let app = test_app();
    let response = send(&app, get("/")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"Hello from SoloSphere Server....");
}

#[tokio::test]
async fn test_health_and_ready() {
    let app = test_app();

    let health = body_json(send(&app, get("/health")).await).await;
    assert_eq!(health["status"], "healthy");

    let response = send(&app, get("/ready")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let ready = body_json(response).await;
    assert_eq!(ready["status"], "ready");
    assert_eq!(ready["backend"], "memory");
}

#[tokio::test]
async fn test_jwt_sets_session_cookie() {
    let app = test_app();
    let response = send(
        &app,
        json_request("POST", "/jwt", json!({ "email": "jane@example.com", "name": "Jane" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = set_cookie(&response);
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));
    assert!(cookie.contains("Path=/"));
    assert!(!cookie.contains("Secure"));

    assert_eq!(body_json(response).await, json!({ "success": true }));
}

#[tokio::test]
async fn test_jwt_rejects_invalid_email() {
    let app = test_app();
    let response = send(&app, json_request("POST", "/jwt", json!({ "email": "not-an-email" }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_log_out_clears_cookie() {
    let app = test_app();
    let response = send(&app, get("/logOut")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = set_cookie(&response);
    assert!(cookie.starts_with("token=;"));
    assert!(cookie.contains("Max-Age=0"));
    assert_eq!(body_json(response).await, json!({ "success": true }));
}

#[tokio::test]
async fn test_create_then_fetch_job() {
    let app = test_app();
    let job = json!({
        "title": "Build a landing page",
        "category": "Web Development",
        "deadline": "2025-03-01T00:00:00.000Z",
        "buyer": { "email": "owner@example.com", "name": "Owner" },
        "min_price": 100,
    });
    let id = create_job(&app, job.clone()).await;

    let fetched = body_json(send(&app, get(&format!("/job/{}", id))).await).await;
    assert_eq!(fetched["_id"], id.as_str());
    assert_eq!(fetched["title"], job["title"]);
    assert_eq!(fetched["buyer"], job["buyer"]);
    assert_eq!(fetched["min_price"], 100);
}

#[tokio::test]
async fn test_job_with_non_string_fields_is_stored_and_listed() {
    let app = test_app();
    create_job(&app, json!({ "title": "Dated", "category": "Web Development", "deadline": "2025-02-01" })).await;
    let id = create_job(&app, json!({ "title": 42, "deadline": 1735689600000_i64 })).await;

    let fetched = body_json(send(&app, get(&format!("/job/{}", id))).await).await;
    assert_eq!(fetched["title"], 42);
    assert_eq!(fetched["deadline"], 1735689600000_i64);

    let response = send(&app, get("/allJobs")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);

    let response = send(&app, get("/allJobsFilter?sort=asc")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let sorted = body_json(response).await;
    assert_eq!(sorted[1]["title"], "Dated");
}

#[tokio::test]
async fn test_missing_job_is_null_and_bad_id_is_400() {
    let app = test_app();

    let response = send(&app, get(&format!("/job/{}", JOB_ID_A))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, Value::Null);

    let response = send(&app, get("/job/not-an-id")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "invalid_id");
}

#[tokio::test]
async fn test_list_jobs_by_buyer() {
    let app = test_app();
    create_job(&app, json!({ "title": "A", "buyer": { "email": "owner@example.com" } })).await;
    create_job(&app, json!({ "title": "B", "buyer": { "email": "other@example.com" } })).await;

    let all = body_json(send(&app, get("/allJobs")).await).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let mine = body_json(send(&app, get("/allJobs/owner@example.com")).await).await;
    let mine = mine.as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["title"], "A");
}

#[tokio::test]
async fn test_filter_and_sort() {
    let app = test_app();
    create_job(&app, json!({ "title": "React dashboard", "category": "Web Development", "deadline": "2025-05-01" })).await;
    create_job(&app, json!({ "title": "REST API", "category": "Web Development", "deadline": "2025-02-01" })).await;
    create_job(&app, json!({ "title": "SEO audit", "category": "Digital Marketing", "deadline": "2025-03-01" })).await;

    let empty_search =
        body_json(send(&app, get("/allJobsFilter?filter=Web%20Development&search=")).await).await;
    let category_only = body_json(send(&app, get("/allJobsFilter?filter=Web%20Development")).await).await;
    assert_eq!(empty_search, category_only);
    assert_eq!(category_only.as_array().unwrap().len(), 2);

    let searched = body_json(send(&app, get("/allJobsFilter?search=rest")).await).await;
    let searched = searched.as_array().unwrap();
    assert_eq!(searched.len(), 1);
    assert_eq!(searched[0]["title"], "REST API");

    let ascending = body_json(send(&app, get("/allJobsFilter?sort=asc")).await).await;
    let titles: Vec<&str> = ascending
        .as_array()
        .unwrap()
        .iter()
        .map(|j| j["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["REST API", "SEO audit", "React dashboard"]);

    let legacy = body_json(send(&app, get("/allJbosFilter?sort=dsc")).await).await;
    assert_eq!(legacy.as_array().unwrap()[0]["title"], "React dashboard");
}

#[tokio::test]
async fn test_upsert_creates_then_merges() {
    let app = test_app();

    let response = send(&app, json_request("PUT", &format!("/update/{}", JOB_ID_A), json!({ "title": "Logo" }))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    assert_eq!(created["upsertedCount"], 1);
    assert_eq!(created["upsertedId"], JOB_ID_A);

    let response = send(
        &app,
        json_request("PUT", &format!("/update/{}", JOB_ID_A), json!({ "category": "Graphics Design", "_id": "65a1b2c3d4e5f6a7b8c9d0ff" })),
    )
    .await;
    let merged = body_json(response).await;
    assert_eq!(merged["matchedCount"], 1);
    assert_eq!(merged["modifiedCount"], 1);

    let job = body_json(send(&app, get(&format!("/job/{}", JOB_ID_A))).await).await;
    assert_eq!(job["_id"], JOB_ID_A);
    assert_eq!(job["title"], "Logo");
    assert_eq!(job["category"], "Graphics Design");
}

#[tokio::test]
async fn test_empty_update_is_rejected() {
    let app = test_app();
    let response = send(&app, json_request("PUT", &format!("/update/{}", JOB_ID_A), json!({}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let app = test_app();
    let id = create_job(&app, json!({ "title": "Temporary" })).await;

    let delete = |id: String| {
        Request::builder()
            .method("DELETE")
            .uri(format!("/job/{}", id))
            .body(Body::empty())
            .unwrap()
    };

    let first = body_json(send(&app, delete(id.clone())).await).await;
    assert_eq!(first["deletedCount"], 1);

    let response = send(&app, delete(id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["deletedCount"], 0);
}

#[tokio::test]
async fn test_duplicate_bid_is_conflict() {
    let app = test_app();
    let job_id = create_job(&app, json!({ "title": "Logo", "bid_count": 0 })).await;
    let bid = json!({
        "email": "bidder@example.com",
        "jobId": job_id,
        "buyer": "owner@example.com",
        "price": 120,
        "status": "Pending",
    });

    let response = send(&app, json_request("POST", "/bidJob", bid.clone())).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["insertedId"].is_string());

    let response = send(&app, json_request("POST", "/bidJob", bid)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_json(response).await["message"],
        "You have already placed a bid on this job"
    );

    let job = body_json(send(&app, get(&format!("/job/{}", job_id))).await).await;
    assert_eq!(job["bid_count"], 1);
}

#[tokio::test]
async fn test_string_bid_count_is_normalized() {
    let app = test_app();
    let three = create_job(&app, json!({ "title": "A", "bid_count": "3" })).await;
    let junk = create_job(&app, json!({ "title": "B", "bid_count": "abc" })).await;

    for job_id in [&three, &junk] {
        let bid = json!({ "email": "bidder@example.com", "jobId": job_id });
        let response = send(&app, json_request("POST", "/bidJob", bid)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let job = body_json(send(&app, get(&format!("/job/{}", three))).await).await;
    assert_eq!(job["bid_count"], 4);
    let job = body_json(send(&app, get(&format!("/job/{}", junk))).await).await;
    assert_eq!(job["bid_count"], 1);
}

#[tokio::test]
async fn test_saturated_bid_count_stays_at_max() {
    let app = test_app();
    let job_id = create_job(&app, json!({ "title": "Popular", "bid_count": i64::MAX })).await;

    let bid = json!({ "email": "bidder@example.com", "jobId": job_id });
    let response = send(&app, json_request("POST", "/bidJob", bid)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let job = body_json(send(&app, get(&format!("/job/{}", job_id))).await).await;
    assert_eq!(job["bid_count"], i64::MAX);
}

#[tokio::test]
async fn test_bid_on_unknown_job_is_recorded() {
    let app = test_app();
    let bid = json!({ "email": "bidder@example.com", "jobId": JOB_ID_A, "buyer": "owner@example.com" });

    let response = send(&app, json_request("POST", "/bidJob", bid)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = login(&app, "bidder@example.com").await;
    let request = Request::builder()
        .uri("/bids/bidder@example.com")
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    let bids = body_json(send(&app, request).await).await;
    assert_eq!(bids.as_array().unwrap().len(), 1);
    assert_eq!(bids[0]["jobId"], JOB_ID_A);
}

#[tokio::test]
async fn test_bids_require_token() {
    let app = test_app();

    let response = send(&app, get("/bids/jane@example.com")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["message"], "Unauthorized access!!");

    let request = Request::builder()
        .uri("/bids/jane@example.com")
        .header(header::COOKIE, "token=garbage")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["message"], "Unauthorized access");
}

#[tokio::test]
async fn test_bids_for_other_user_is_forbidden() {
    let app = test_app();
    let cookie = login(&app, "jane@example.com").await;

    let request = Request::builder()
        .uri("/bids/john@example.com")
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["message"], "Forbidden access!!");
}

#[tokio::test]
async fn test_bids_as_bidder_and_buyer() {
    let app = test_app();
    for (bidder, job_id) in [
        ("jane@example.com", "65a1b2c3d4e5f6a7b8c9d0e1"),
        ("john@example.com", "65a1b2c3d4e5f6a7b8c9d0e2"),
    ] {
        let bid = json!({ "email": bidder, "jobId": job_id, "buyer": "owner@example.com" });
        send(&app, json_request("POST", "/bidJob", bid)).await;
    }

    let cookie = login(&app, "owner@example.com").await;
    let list = |uri: &str| {
        Request::builder()
            .uri(uri)
            .header(header::COOKIE, cookie.clone())
            .body(Body::empty())
            .unwrap()
    };

    let received = body_json(send(&app, list("/bids/owner@example.com?buyer=true")).await).await;
    assert_eq!(received.as_array().unwrap().len(), 2);

    let placed = body_json(send(&app, list("/bids/owner@example.com")).await).await;
    assert!(placed.as_array().unwrap().is_empty());

    let placed = body_json(send(&app, list("/bids/owner@example.com?buyer=false")).await).await;
    assert!(placed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_bid_status_update() {
    let app = test_app();
    let bid = json!({ "email": "bidder@example.com", "jobId": JOB_ID_A, "status": "Pending" });
    let response = send(&app, json_request("POST", "/bidJob", bid)).await;
    let bid_id = body_json(response).await["insertedId"]
        .as_str()
        .unwrap()
        .to_string();

    let response = send(
        &app,
        json_request("PATCH", &format!("/bidStatusUpdate/{}", bid_id), json!({ "currentStatus": "In Progress" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let result = body_json(response).await;
    assert_eq!(result["matchedCount"], 1);
    assert_eq!(result["modifiedCount"], 1);

    let response = send(
        &app,
        json_request("PATCH", "/bidStatusUpdate/bogus", json!({ "currentStatus": "Rejected" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_security_headers_and_request_id() {
    let app = test_app();
    let response = send(&app, get("/allJobs")).await;

    assert_eq!(response.headers().get("X-Content-Type-Options").unwrap(), "nosniff");
    assert!(response.headers().contains_key("X-Request-ID"));
}
