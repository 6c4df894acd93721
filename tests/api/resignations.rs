use chrono::NaiveDate;

use reqwest::{Method, StatusCode};

use serde_json::{json, Value};

use crate::helpers::{error_message, lwd, TestApp};

#[tokio::test]
async fn employee_can_resign_and_see_it_pending() {
    let app = TestApp::spawn().await;
    let employee = app.employee().await;

    let id = app.resign(&employee, lwd()).await;

    let res = employee
        .own_resignation()
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::OK, res.status());

    let resignation: Value = res.json().await.unwrap();
    assert_eq!(id.to_string(), resignation["_id"]);
    assert_eq!("2025-01-31", resignation["lwd"]);
    assert_eq!("pending", resignation["status"]);
    assert!(resignation["approvedLwd"].is_null());
}

#[tokio::test]
async fn second_open_resignation_conflicts() {
    let app = TestApp::spawn().await;
    let employee = app.employee().await;
    app.resign(&employee, lwd()).await;

    let res = employee
        .resign(NaiveDate::from_ymd_opt(2025, 2, 28).unwrap())
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::CONFLICT, res.status());
    assert_eq!("Resignation already submitted", error_message(res).await);
}

#[tokio::test]
async fn resign_requires_a_valid_date() {
    let app = TestApp::spawn().await;
    let employee = app.employee().await;

    let test_cases = vec![
        (json!({}), "missing lwd"),
        (json!({ "lwd": "31/01/2025" }), "wrong date format"),
        (json!({ "lwd": "2025-02-30" }), "impossible date"),
    ];

    for (body, description) in test_cases {
        let res = employee
            .request(Method::POST, "user/resign")
            .unwrap()
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(
            StatusCode::BAD_REQUEST,
            res.status(),
            "Resign did not fail on {}",
            description
        );
    }
}

#[tokio::test]
async fn resign_requires_authentication() {
    let app = TestApp::spawn().await;

    let res = app
        .anonymous
        .resign(lwd())
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::UNAUTHORIZED, res.status());
    assert_eq!("Access denied", error_message(res).await);
}

#[tokio::test]
async fn rejected_employee_can_resubmit() {
    let app = TestApp::spawn().await;
    let admin = app.admin().await;
    let employee = app.employee().await;
    let first = app.resign(&employee, lwd()).await;

    let res = admin
        .conclude_resignation(first, false, None)
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::OK, res.status());

    let res = employee
        .own_resignation()
        .await
        .expect("Failed to execute request");
    let resignation: Value = res.json().await.unwrap();
    assert_eq!("rejected", resignation["status"]);

    let later = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
    let second = app.resign(&employee, later).await;
    assert_ne!(first, second);

    let res = employee
        .own_resignation()
        .await
        .expect("Failed to execute request");
    let resignation: Value = res.json().await.unwrap();
    assert_eq!(second.to_string(), resignation["_id"]);
    assert_eq!("pending", resignation["status"]);
}

#[tokio::test]
async fn approved_employee_cannot_resign_again() {
    let app = TestApp::spawn().await;
    let (employee, _) = app.approved_employee().await;

    let res = employee
        .resign(lwd())
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::CONFLICT, res.status());
}
