use anyhow::Context;

use async_trait::async_trait;

use chrono::{DateTime, NaiveDate, Utc};

use secrecy::{ExposeSecret, Secret};

use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;

use uuid::Uuid;

use crate::domain::{ExitAnswer, Username};
use crate::settings::DatabaseSettings;

use super::{
    Conclusion, ExitResponse, NewUser, Resignation, Store, StoreError, StoreResult, User,
};

const RESIGNATION_COLUMNS: &str =
    "id, employee_id, lwd, status, approved_lwd, submitted_at, concluded_at";

/// Postgres-backed store, one shared connection pool for the whole process
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the configured database, failing if it is not reachable in time
    #[tracing::instrument(name = "Connect to database", skip(settings))]
    pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .acquire_timeout(settings.connect_timeout())
            .connect_with(settings.with_db())
            .await
            .context("Failed to connect to the database")?;

        tracing::info!("Database connection established");
        Ok(Self::new(pool))
    }

    /// Bring the schema up to date
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")
    }
}

/// Translate unique index violations into [`StoreError::Conflict`]
fn conflict_on_unique(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict,
        _ => StoreError::Database(e),
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> StoreResult<Self> {
        Ok(Self {
            id: row.id,
            username: row.username,
            password_hash: Secret::new(row.password_hash),
            role: row.role.parse().map_err(StoreError::Corrupt)?,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ResignationRow {
    id: Uuid,
    employee_id: Uuid,
    lwd: NaiveDate,
    status: String,
    approved_lwd: Option<NaiveDate>,
    submitted_at: DateTime<Utc>,
    concluded_at: Option<DateTime<Utc>>,
}

impl TryFrom<ResignationRow> for Resignation {
    type Error = StoreError;

    fn try_from(row: ResignationRow) -> StoreResult<Self> {
        Ok(Self {
            id: row.id,
            employee_id: row.employee_id,
            lwd: row.lwd,
            status: row.status.parse().map_err(StoreError::Corrupt)?,
            approved_lwd: row.approved_lwd,
            submitted_at: row.submitted_at,
            concluded_at: row.concluded_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ExitResponseRow {
    id: Uuid,
    employee_id: Uuid,
    responses: Json<Vec<ExitAnswer>>,
    submitted_at: DateTime<Utc>,
}

impl From<ExitResponseRow> for ExitResponse {
    fn from(row: ExitResponseRow) -> Self {
        Self {
            id: row.id,
            employee_id: row.employee_id,
            responses: row.responses.0,
            submitted_at: row.submitted_at,
        }
    }
}

#[async_trait]
impl Store for PgStore {
    #[tracing::instrument(name = "Insert a new user record", skip(self, new_user), fields(username = %new_user.username))]
    async fn insert_user(&self, new_user: &NewUser) -> StoreResult<Uuid> {
        let id = Uuid::new_v4();
        sqlx::query(
            "insert into users (id, username, password_hash, role) values ($1, $2, $3, $4)",
        )
        .bind(id)
        .bind(new_user.username.as_ref())
        .bind(new_user.password_hash.expose_secret())
        .bind(new_user.role.as_str())
        .execute(&self.pool)
        .await
        .map_err(conflict_on_unique)?;

        Ok(id)
    }

    #[tracing::instrument(name = "Fetch user by username", skip(self))]
    async fn fetch_user_by_username(&self, username: &Username) -> StoreResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(
            "select id, username, password_hash, role, created_at from users where username = $1",
        )
        .bind(username.as_ref())
        .fetch_optional(&self.pool)
        .await?
        .map(User::try_from)
        .transpose()
    }

    #[tracing::instrument(name = "Insert resignation", skip(self))]
    async fn insert_resignation(&self, employee_id: Uuid, lwd: NaiveDate) -> StoreResult<Uuid> {
        let id = Uuid::new_v4();
        sqlx::query("insert into resignations (id, employee_id, lwd) values ($1, $2, $3)")
            .bind(id)
            .bind(employee_id)
            .bind(lwd)
            .execute(&self.pool)
            .await
            .map_err(conflict_on_unique)?;

        Ok(id)
    }

    #[tracing::instrument(name = "Fetch resignation by id", skip(self))]
    async fn fetch_resignation(&self, id: Uuid) -> StoreResult<Option<Resignation>> {
        sqlx::query_as::<_, ResignationRow>(&format!(
            "select {} from resignations where id = $1",
            RESIGNATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Resignation::try_from)
        .transpose()
    }

    #[tracing::instrument(name = "Fetch latest resignation of employee", skip(self))]
    async fn fetch_latest_resignation(
        &self,
        employee_id: Uuid,
    ) -> StoreResult<Option<Resignation>> {
        sqlx::query_as::<_, ResignationRow>(&format!(
            "select {} from resignations where employee_id = $1 \
             order by submitted_at desc, id desc limit 1",
            RESIGNATION_COLUMNS
        ))
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await?
        .map(Resignation::try_from)
        .transpose()
    }

    #[tracing::instrument(name = "Fetch all resignations", skip(self))]
    async fn fetch_all_resignations(&self) -> StoreResult<Vec<Resignation>> {
        sqlx::query_as::<_, ResignationRow>(&format!(
            "select {} from resignations order by submitted_at, id",
            RESIGNATION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Resignation::try_from)
        .collect()
    }

    #[tracing::instrument(name = "Conclude resignation", skip(self))]
    async fn conclude_resignation(
        &self,
        id: Uuid,
        conclusion: &Conclusion,
    ) -> StoreResult<Option<Resignation>> {
        // The status guard makes concurrent conclusions race-free
        sqlx::query_as::<_, ResignationRow>(&format!(
            "update resignations set status = $2, approved_lwd = $3, concluded_at = now() \
             where id = $1 and status = 'pending' returning {}",
            RESIGNATION_COLUMNS
        ))
        .bind(id)
        .bind(conclusion.status().as_str())
        .bind(conclusion.approved_lwd())
        .fetch_optional(&self.pool)
        .await?
        .map(Resignation::try_from)
        .transpose()
    }

    #[tracing::instrument(name = "Insert exit response", skip(self, responses))]
    async fn insert_exit_response(
        &self,
        employee_id: Uuid,
        responses: &[ExitAnswer],
    ) -> StoreResult<Uuid> {
        let id = Uuid::new_v4();
        sqlx::query("insert into exit_responses (id, employee_id, responses) values ($1, $2, $3)")
            .bind(id)
            .bind(employee_id)
            .bind(Json(responses))
            .execute(&self.pool)
            .await
            .map_err(conflict_on_unique)?;

        Ok(id)
    }

    #[tracing::instrument(name = "Fetch all exit responses", skip(self))]
    async fn fetch_all_exit_responses(&self) -> StoreResult<Vec<ExitResponse>> {
        let rows = sqlx::query_as::<_, ExitResponseRow>(
            "select id, employee_id, responses, submitted_at from exit_responses \
             order by submitted_at, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ExitResponse::from).collect())
    }
}
