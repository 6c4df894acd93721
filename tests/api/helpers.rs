use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;

use fake::faker::lorem::en::Sentence;
use fake::Fake;

use reqwest::{Client, Response, StatusCode};

use secrecy::Secret;

use serde_json::Value;

use url::Url;

use uuid::Uuid;

use exitease::app;
use exitease::auth::{Session, SessionKeys};
use exitease::client::ApiClient;
use exitease::controller::auth::LoginResponse;
use exitease::controller::user::ResignResponse;
use exitease::crypto::{SigningKey, Token};
use exitease::domain::ExitAnswer;
use exitease::settings::AdminSettings;
use exitease::store::MemoryStore;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin";

const TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct TestUser {
    pub username: String,
    pub password: String,
}

impl TestUser {
    pub fn generate() -> Self {
        Self {
            username: format!("emp_{}", Uuid::new_v4().simple()),
            password: "correct horse".into(),
        }
    }

    pub fn admin() -> Self {
        Self {
            username: ADMIN_USERNAME.into(),
            password: ADMIN_PASSWORD.into(),
        }
    }
}

pub struct TestApp {
    addr: String,
    base_url: Url,
    signing_key: SigningKey,

    pub anonymous: ApiClient,
}

impl TestApp {
    pub async fn spawn() -> Self {
        use rand::{distributions::Alphanumeric, Rng};

        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to listen on random port");
        let port = listener.local_addr().unwrap().port();

        let addr = format!("http://127.0.0.1:{}", port);
        let base_url = Url::parse(&format!("{}/api/", addr)).expect("Failed to parse base url");

        let signing_key = {
            let rand_key: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(16)
                .map(char::from)
                .collect();

            SigningKey::new(&Secret::new(rand_key)).expect("Failed to create signing key")
        };
        let session_keys = SessionKeys::new(signing_key.clone(), chrono::Duration::minutes(5));

        let store = Arc::new(MemoryStore::new());
        let admin = AdminSettings {
            username: ADMIN_USERNAME.into(),
            password: Secret::new(ADMIN_PASSWORD.into()),
        };
        app::ensure_admin(store.as_ref(), &admin)
            .await
            .expect("Failed to seed admin account");

        let server = app::run(listener, store, session_keys).expect("Failed to spawn app instance");
        let _ = tokio::spawn(server);

        let anonymous =
            ApiClient::anonymous(base_url.clone(), TIMEOUT).expect("Failed to build client");

        Self {
            addr,
            base_url,
            signing_key,
            anonymous,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn health_check(&self) -> reqwest::Result<Response> {
        Client::new()
            .get(format!("{}/health_check", self.addr))
            .send()
            .await
    }

    /// Client that sends `token` verbatim in the `Authorization` header
    pub fn client_with_token(&self, token: &str) -> ApiClient {
        ApiClient::authenticated(self.base_url.clone(), TIMEOUT, &Secret::new(token.into()))
            .expect("Failed to build client")
    }

    /// Token signed with the server key that expired a minute ago
    pub fn expired_token(&self, user_id: Uuid) -> String {
        let session = Session {
            user_id,
            role: exitease::domain::Role::Employee,
        };
        Token::sign(
            &session,
            chrono::Duration::minutes(-1),
            self.signing_key.as_ref(),
        )
        .expect("Failed to sign token")
        .into()
    }

    pub async fn register(&self, user: &TestUser) {
        let res = self
            .anonymous
            .register(&user.username, &user.password)
            .await
            .expect("Failed to execute request");
        assert_eq!(StatusCode::CREATED, res.status());
    }

    pub async fn login(&self, user: &TestUser) -> String {
        let res = self
            .anonymous
            .login(&user.username, &user.password)
            .await
            .expect("Failed to execute request");
        assert_eq!(StatusCode::OK, res.status());

        let LoginResponse { token } = res.json().await.expect("Malformed login response");
        token
    }

    /// Register a fresh employee and return a client logged in as them
    pub async fn employee(&self) -> ApiClient {
        let user = TestUser::generate();
        self.register(&user).await;
        let token = self.login(&user).await;
        self.client_with_token(&token)
    }

    pub async fn admin(&self) -> ApiClient {
        let token = self.login(&TestUser::admin()).await;
        self.client_with_token(&format!("Bearer {}", token))
    }

    pub async fn resign(&self, client: &ApiClient, lwd: NaiveDate) -> Uuid {
        let res = client.resign(lwd).await.expect("Failed to execute request");
        assert_eq!(StatusCode::OK, res.status());

        let ResignResponse { resignation_id } =
            res.json().await.expect("Malformed resign response");
        resignation_id
    }

    /// Submit a resignation and have the admin approve it as requested
    pub async fn approved_employee(&self) -> (ApiClient, Uuid) {
        let employee = self.employee().await;
        let id = self.resign(&employee, lwd()).await;

        let res = self
            .admin()
            .await
            .conclude_resignation(id, true, None)
            .await
            .expect("Failed to execute request");
        assert_eq!(StatusCode::OK, res.status());

        (employee, id)
    }
}

pub fn lwd() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
}

pub fn answers(count: usize) -> Vec<ExitAnswer> {
    (0..count)
        .map(|i| ExitAnswer {
            question_text: format!("Question {}: {}", i, Sentence(3..6).fake::<String>()),
            response: Sentence(4..10).fake(),
        })
        .collect()
}

pub async fn error_message(res: Response) -> String {
    let body: Value = res.json().await.expect("Error body is not JSON");
    body["error"]
        .as_str()
        .expect("Error body has no message")
        .to_string()
}
