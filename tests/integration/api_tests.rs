//! API integration tests
//!
//! These run against a live server with a fresh database:
//! `cargo run` in one terminal, then `cargo test -- --ignored`.

use chrono::Utc;
use reqwest::Client;
use serde_json::{json, Value};
use uuid::Uuid;

use libroteca_server::models::claims::{Role, UserClaims};

const BASE_URL: &str = "http://localhost:8080/api/v1";
// Matches config/default.toml
const JWT_SECRET: &str = "change-this-secret-in-production";

fn token_for(sub: Uuid, role: Role) -> String {
    let now = Utc::now().timestamp();
    UserClaims {
        sub,
        role,
        exp: now + 3600,
        iat: now,
    }
    .create_token(JWT_SECRET)
    .expect("Failed to mint test token")
}

fn librarian_token() -> String {
    token_for(Uuid::new_v4(), Role::Librarian)
}

async fn create_book(client: &Client, token: &str, title: &str, quantity: i32) -> Value {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "title": title,
            "author": "Test Author",
            "quantity": quantity
        }))
        .send()
        .await
        .expect("Failed to create book");
    assert_eq!(response.status(), 201);
    response.json().await.expect("Failed to parse book")
}

async fn create_student(client: &Client, token: &str, code: &str) -> Value {
    let response = client
        .post(format!("{}/students", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "student_code": code,
            "name": format!("Student {}", code)
        }))
        .send()
        .await
        .expect("Failed to create student");
    assert_eq!(response.status(), 201);
    response.json().await.expect("Failed to parse student")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_readiness_pings_database() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/borrowings", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_student_cannot_review_requests() {
    let client = Client::new();
    let student_token = token_for(Uuid::new_v4(), Role::Student);

    let response = client
        .post(format!("{}/requests/{}/review", BASE_URL, Uuid::new_v4()))
        .bearer_auth(&student_token)
        .json(&json!({ "decision": "approved" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_pending_request_rejected() {
    let client = Client::new();
    let admin = librarian_token();

    let book = create_book(&client, &admin, "Duplicate Request Book", 2).await;
    let student = create_student(&client, &admin, &format!("DUP-{}", Uuid::new_v4())).await;
    let student_token = token_for(
        student["id"].as_str().unwrap().parse().unwrap(),
        Role::Student,
    );

    let first = client
        .post(format!("{}/requests", BASE_URL))
        .bearer_auth(&student_token)
        .json(&json!({ "book_id": book["id"] }))
        .send()
        .await
        .expect("Failed to submit request");
    assert_eq!(first.status(), 201);

    let second = client
        .post(format!("{}/requests", BASE_URL))
        .bearer_auth(&student_token)
        .json(&json!({ "book_id": book["id"] }))
        .send()
        .await
        .expect("Failed to submit request");
    assert_eq!(second.status(), 409);

    let body: Value = second.json().await.expect("Failed to parse error");
    assert_eq!(body["error"], "DuplicateRequest");
}

#[tokio::test]
#[ignore]
async fn test_last_copy_contention_and_return_cycle() {
    let client = Client::new();
    let admin = librarian_token();

    // Single-copy book, two students
    let book = create_book(&client, &admin, "Last Copy Book", 1).await;
    let book_id = book["id"].as_str().unwrap();
    let student_a = create_student(&client, &admin, &format!("A-{}", Uuid::new_v4())).await;
    let student_b = create_student(&client, &admin, &format!("B-{}", Uuid::new_v4())).await;
    let token_a = token_for(student_a["id"].as_str().unwrap().parse().unwrap(), Role::Student);
    let token_b = token_for(student_b["id"].as_str().unwrap().parse().unwrap(), Role::Student);

    // Student A requests and is approved
    let request_a: Value = client
        .post(format!("{}/requests", BASE_URL))
        .bearer_auth(&token_a)
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to submit")
        .json()
        .await
        .expect("Failed to parse");

    let review_a = client
        .post(format!("{}/requests/{}/review", BASE_URL, request_a["id"].as_str().unwrap()))
        .bearer_auth(&admin)
        .json(&json!({ "decision": "approved" }))
        .send()
        .await
        .expect("Failed to review");
    assert!(review_a.status().is_success());
    let review_a: Value = review_a.json().await.expect("Failed to parse review");
    let borrowing_id = review_a["borrowing"]["id"].as_str().unwrap().to_string();

    // Inventory: 0 available, times_borrowed bumped
    let after_issue: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to get book")
        .json()
        .await
        .expect("Failed to parse book");
    assert_eq!(after_issue["available_quantity"], 0);
    assert_eq!(after_issue["times_borrowed"], book["times_borrowed"].as_i64().unwrap() + 1);

    // Student B may request the same book, but approval must fail
    let request_b: Value = client
        .post(format!("{}/requests", BASE_URL))
        .bearer_auth(&token_b)
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to submit")
        .json()
        .await
        .expect("Failed to parse");

    let review_b = client
        .post(format!("{}/requests/{}/review", BASE_URL, request_b["id"].as_str().unwrap()))
        .bearer_auth(&admin)
        .json(&json!({ "decision": "approved" }))
        .send()
        .await
        .expect("Failed to review");
    assert_eq!(review_b.status(), 409);
    let err: Value = review_b.json().await.expect("Failed to parse error");
    assert_eq!(err["error"], "NoCopiesAvailable");

    // Reviewing A's request again must also fail
    let re_review = client
        .post(format!("{}/requests/{}/review", BASE_URL, request_a["id"].as_str().unwrap()))
        .bearer_auth(&admin)
        .json(&json!({ "decision": "approved" }))
        .send()
        .await
        .expect("Failed to review");
    assert_eq!(re_review.status(), 409);

    // A returns the book; on-time return carries no fine
    let returned = client
        .post(format!("{}/borrowings/{}/return", BASE_URL, borrowing_id))
        .bearer_auth(&admin)
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to return");
    assert!(returned.status().is_success());
    let returned: Value = returned.json().await.expect("Failed to parse");
    assert_eq!(returned["fine_amount"], "0.00");

    // Second return must fail and availability must increment only once
    let double_return = client
        .post(format!("{}/borrowings/{}/return", BASE_URL, borrowing_id))
        .bearer_auth(&admin)
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to return");
    assert_eq!(double_return.status(), 409);
    let err: Value = double_return.json().await.expect("Failed to parse error");
    assert_eq!(err["error"], "AlreadyReturned");

    let after_return: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to get book")
        .json()
        .await
        .expect("Failed to parse book");
    assert_eq!(after_return["available_quantity"], 1);

    // With the copy back, B's fresh request can be approved
    let request_b2: Value = client
        .post(format!("{}/requests", BASE_URL))
        .bearer_auth(&token_b)
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to submit")
        .json()
        .await
        .expect("Failed to parse");

    let review_b2 = client
        .post(format!("{}/requests/{}/review", BASE_URL, request_b2["id"].as_str().unwrap()))
        .bearer_auth(&admin)
        .json(&json!({ "decision": "approved" }))
        .send()
        .await
        .expect("Failed to review");
    assert!(review_b2.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_reject_does_not_touch_inventory() {
    let client = Client::new();
    let admin = librarian_token();

    let book = create_book(&client, &admin, "Rejected Book", 3).await;
    let student = create_student(&client, &admin, &format!("R-{}", Uuid::new_v4())).await;
    let student_token = token_for(student["id"].as_str().unwrap().parse().unwrap(), Role::Student);

    let request: Value = client
        .post(format!("{}/requests", BASE_URL))
        .bearer_auth(&student_token)
        .json(&json!({ "book_id": book["id"] }))
        .send()
        .await
        .expect("Failed to submit")
        .json()
        .await
        .expect("Failed to parse");

    let review = client
        .post(format!("{}/requests/{}/review", BASE_URL, request["id"].as_str().unwrap()))
        .bearer_auth(&admin)
        .json(&json!({ "decision": "rejected", "notes": "out of scope for your grade" }))
        .send()
        .await
        .expect("Failed to review");
    assert!(review.status().is_success());

    let after: Value = client
        .get(format!("{}/books/{}", BASE_URL, book["id"].as_str().unwrap()))
        .send()
        .await
        .expect("Failed to get book")
        .json()
        .await
        .expect("Failed to parse book");
    assert_eq!(after["available_quantity"], book["available_quantity"]);
    assert_eq!(after["times_borrowed"], book["times_borrowed"]);
}

#[tokio::test]
#[ignore]
async fn test_cancel_own_pending_request() {
    let client = Client::new();
    let admin = librarian_token();

    let book = create_book(&client, &admin, "Cancelled Book", 1).await;
    let student = create_student(&client, &admin, &format!("C-{}", Uuid::new_v4())).await;
    let student_token = token_for(student["id"].as_str().unwrap().parse().unwrap(), Role::Student);

    let request: Value = client
        .post(format!("{}/requests", BASE_URL))
        .bearer_auth(&student_token)
        .json(&json!({ "book_id": book["id"] }))
        .send()
        .await
        .expect("Failed to submit")
        .json()
        .await
        .expect("Failed to parse");

    let cancel = client
        .post(format!("{}/requests/{}/cancel", BASE_URL, request["id"].as_str().unwrap()))
        .bearer_auth(&student_token)
        .send()
        .await
        .expect("Failed to cancel");
    assert!(cancel.status().is_success());
    let cancelled: Value = cancel.json().await.expect("Failed to parse");
    assert_eq!(cancelled["status"], "cancelled");

    // Cancelling twice fails: the request is no longer pending
    let again = client
        .post(format!("{}/requests/{}/cancel", BASE_URL, request["id"].as_str().unwrap()))
        .bearer_auth(&student_token)
        .send()
        .await
        .expect("Failed to cancel");
    assert_eq!(again.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_deactivated_student_cannot_request() {
    let client = Client::new();
    let admin = librarian_token();

    let book = create_book(&client, &admin, "Inactive Student Book", 1).await;
    let student = create_student(&client, &admin, &format!("I-{}", Uuid::new_v4())).await;
    let student_id = student["id"].as_str().unwrap();
    let student_token = token_for(student_id.parse().unwrap(), Role::Student);

    let deactivate = client
        .post(format!("{}/students/{}/deactivate", BASE_URL, student_id))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to deactivate");
    assert!(deactivate.status().is_success());

    let response = client
        .post(format!("{}/requests", BASE_URL))
        .bearer_auth(&student_token)
        .json(&json!({ "book_id": book["id"] }))
        .send()
        .await
        .expect("Failed to submit");
    assert_eq!(response.status(), 422);
    let body: Value = response.json().await.expect("Failed to parse error");
    assert_eq!(body["error"], "InactiveStudent");
}

#[tokio::test]
#[ignore]
async fn test_direct_issue_and_fine_preview() {
    let client = Client::new();
    let admin = librarian_token();

    let book = create_book(&client, &admin, "Direct Issue Book", 1).await;
    let student = create_student(&client, &admin, &format!("D-{}", Uuid::new_v4())).await;

    let issue = client
        .post(format!("{}/borrowings", BASE_URL))
        .bearer_auth(&admin)
        .json(&json!({
            "book_id": book["id"],
            "student_id": student["id"],
            "days": 7
        }))
        .send()
        .await
        .expect("Failed to issue");
    assert_eq!(issue.status(), 201);
    let borrowing: Value = issue.json().await.expect("Failed to parse");

    // Freshly issued, not yet overdue
    let preview = client
        .get(format!("{}/borrowings/{}/fine", BASE_URL, borrowing["id"].as_str().unwrap()))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to preview");
    assert!(preview.status().is_success());
    let preview: Value = preview.json().await.expect("Failed to parse");
    assert_eq!(preview["days_overdue"], 0);
    assert_eq!(preview["fine_amount"], "0.00");

    // A second issue of the only copy must fail
    let second = client
        .post(format!("{}/borrowings", BASE_URL))
        .bearer_auth(&admin)
        .json(&json!({
            "book_id": book["id"],
            "student_id": student["id"],
            "days": 7
        }))
        .send()
        .await
        .expect("Failed to issue");
    assert_eq!(second.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_borrow_cap_holds_under_concurrent_issues() {
    let client = Client::new();
    let admin = librarian_token();

    // Default cap is 3 books per student
    let student = create_student(&client, &admin, &format!("CAP-{}", Uuid::new_v4())).await;
    let student_id = student["id"].as_str().unwrap();

    let mut book_ids = Vec::new();
    for n in 0..4 {
        let book = create_book(&client, &admin, &format!("Cap Book {}", n), 1).await;
        book_ids.push(book["id"].as_str().unwrap().to_string());
    }

    let issue = |book_id: String| {
        let client = client.clone();
        let admin = admin.clone();
        let student_id = student_id.to_string();
        async move {
            client
                .post(format!("{}/borrowings", BASE_URL))
                .bearer_auth(&admin)
                .json(&json!({ "book_id": book_id, "student_id": student_id }))
                .send()
                .await
                .expect("Failed to issue")
                .status()
        }
    };

    assert_eq!(issue(book_ids[0].clone()).await, 201);
    assert_eq!(issue(book_ids[1].clone()).await, 201);

    // One slot left; fire two issues at once and expect exactly one win
    let (third, fourth) = tokio::join!(issue(book_ids[2].clone()), issue(book_ids[3].clone()));
    let statuses = [third.as_u16(), fourth.as_u16()];
    assert!(
        statuses.contains(&201) && statuses.contains(&422),
        "expected one issued and one rejected at the cap, got {:?}",
        statuses
    );

    // Over the cap, every further issue is rejected
    let loser = if third == 201 { &book_ids[3] } else { &book_ids[2] };
    let response = client
        .post(format!("{}/borrowings", BASE_URL))
        .bearer_auth(&admin)
        .json(&json!({ "book_id": loser, "student_id": student_id }))
        .send()
        .await
        .expect("Failed to issue");
    assert_eq!(response.status(), 422);
    let body: Value = response.json().await.expect("Failed to parse error");
    assert_eq!(body["error"], "MaxBooksReached");
}

#[tokio::test]
#[ignore]
async fn test_settings_round_trip_and_validation() {
    let client = Client::new();
    let admin = librarian_token();

    let response = client
        .get(format!("{}/settings", BASE_URL))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to get settings");
    assert!(response.status().is_success());
    let settings: Value = response.json().await.expect("Failed to parse");
    assert!(settings["fine_per_day"].is_string());

    let bad = client
        .put(format!("{}/settings", BASE_URL))
        .bearer_auth(&admin)
        .json(&json!({ "max_borrow_days": "soon" }))
        .send()
        .await
        .expect("Failed to update settings");
    assert_eq!(bad.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_stats_shape() {
    let client = Client::new();
    let admin = librarian_token();

    let response = client
        .get(format!("{}/stats", BASE_URL))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to get stats");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["total_books"].is_number());
    assert!(body["active_borrowings"].is_number());
    assert!(body["overdue_borrowings"].is_number());
    assert!(body["popular_books"].is_array());
}
