use reqwest::{Method, StatusCode};

use serde_json::json;

use uuid::Uuid;

use crate::helpers::{error_message, TestApp, TestUser};

#[tokio::test]
async fn register_then_login_issues_token() {
    let app = TestApp::spawn().await;
    let user = TestUser::generate();

    let res = app
        .anonymous
        .register(&user.username, &user.password)
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::CREATED, res.status());

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!("User registered successfully", body["message"]);

    let token = app.login(&user).await;
    assert_eq!(2, token.split('.').count());
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let app = TestApp::spawn().await;
    let user = TestUser::generate();
    app.register(&user).await;

    let res = app
        .anonymous
        .register(&user.username, "another password")
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::CONFLICT, res.status());
    assert_eq!("Username already taken", error_message(res).await);
}

#[tokio::test]
async fn usernames_are_case_insensitive() {
    let app = TestApp::spawn().await;
    let user = TestUser::generate();
    app.register(&user).await;

    let res = app
        .anonymous
        .register(&user.username.to_uppercase(), &user.password)
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::CONFLICT, res.status());
}

#[tokio::test]
async fn seeded_admin_cannot_be_registered_again() {
    let app = TestApp::spawn().await;

    let res = app
        .anonymous
        .register("admin", "whatever")
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::CONFLICT, res.status());
}

#[tokio::test]
async fn register_rejects_invalid_input() {
    let app = TestApp::spawn().await;

    let test_cases = vec![
        ("", "password", "empty username"),
        ("ab", "password", "short username"),
        ("has space", "password", "username with whitespace"),
        ("valid_name", "", "empty password"),
        ("valid_name", "abc", "short password"),
    ];

    for (username, password, description) in test_cases {
        let res = app
            .anonymous
            .register(username, password)
            .await
            .expect("Failed to execute request");

        assert_eq!(
            StatusCode::BAD_REQUEST,
            res.status(),
            "Register did not fail on {}",
            description
        );
    }
}

#[tokio::test]
async fn malformed_body_gets_json_error() {
    let app = TestApp::spawn().await;

    let test_cases = vec![
        (json!({ "username": "someone" }), "missing password"),
        (json!({ "password": "password" }), "missing username"),
        (json!({ "username": 5, "password": "password" }), "wrong type"),
    ];

    for (body, description) in test_cases {
        let res = app
            .anonymous
            .request(Method::POST, "auth/register")
            .unwrap()
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(
            StatusCode::BAD_REQUEST,
            res.status(),
            "Register did not fail on {}",
            description
        );
        assert!(!error_message(res).await.is_empty());
    }
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let app = TestApp::spawn().await;
    let user = TestUser::generate();
    app.register(&user).await;

    let test_cases = vec![
        (user.username.clone(), "wrong password".to_string(), "wrong password"),
        (
            format!("nobody_{}", Uuid::new_v4().simple()),
            user.password.clone(),
            "unknown user",
        ),
    ];

    for (username, password, description) in test_cases {
        let res = app
            .anonymous
            .login(&username, &password)
            .await
            .expect("Failed to execute request");

        assert_eq!(
            StatusCode::UNAUTHORIZED,
            res.status(),
            "Login did not fail on {}",
            description
        );
        assert_eq!("Invalid username or password", error_message(res).await);
    }
}

#[tokio::test]
async fn missing_token_is_access_denied() {
    let app = TestApp::spawn().await;

    let res = app
        .anonymous
        .own_resignation()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::UNAUTHORIZED, res.status());
    assert_eq!("Access denied", error_message(res).await);
}

#[tokio::test]
async fn unusable_token_is_invalid() {
    let app = TestApp::spawn().await;
    let expired = app.expired_token(Uuid::new_v4());

    let test_cases = vec![
        ("garbage".to_string(), "not a token"),
        ("Bearer abc.def".to_string(), "bad signature"),
        (expired, "expired token"),
    ];

    for (token, description) in test_cases {
        let res = app
            .client_with_token(&token)
            .own_resignation()
            .await
            .expect("Failed to execute request");

        assert_eq!(
            StatusCode::UNAUTHORIZED,
            res.status(),
            "Request was not rejected with {}",
            description
        );
        assert_eq!("Invalid token", error_message(res).await);
    }
}

#[tokio::test]
async fn bearer_prefix_is_optional() {
    let app = TestApp::spawn().await;
    let user = TestUser::generate();
    app.register(&user).await;
    let token = app.login(&user).await;

    for header in [token.clone(), format!("Bearer {}", token)] {
        let res = app
            .client_with_token(&header)
            .own_resignation()
            .await
            .expect("Failed to execute request");

        // Authenticated, but nothing submitted yet
        assert_eq!(StatusCode::NOT_FOUND, res.status());
    }
}
