use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use chrono::{DateTime, NaiveDate, Utc};

use secrecy::Secret;

use serde::{Deserialize, Serialize};

use uuid::Uuid;

use crate::domain::{ExitAnswer, Role, Username};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness rule rejected the write
    #[error("Record conflicts with an existing record")]
    Conflict,
    #[error("Stored record is malformed: {0}")]
    Corrupt(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// New user account request
#[derive(Debug)]
pub struct NewUser {
    pub username: Username,
    pub password_hash: Secret<String>,
    pub role: Role,
}

/// Stored user account
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: Secret<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResignationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ResignationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Whether the resignation still blocks a new submission by the same employee
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Rejected)
    }
}

impl FromStr for ResignationStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("{} is not a valid resignation status", other)),
        }
    }
}

impl fmt::Display for ResignationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored resignation record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resignation {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub employee_id: Uuid,
    /// Last working day requested by the employee
    pub lwd: NaiveDate,
    pub status: ResignationStatus,
    /// Last working day granted on approval
    pub approved_lwd: Option<NaiveDate>,
    pub submitted_at: DateTime<Utc>,
    pub concluded_at: Option<DateTime<Utc>>,
}

/// An administrator's decision on a pending resignation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conclusion {
    Approve { lwd: NaiveDate },
    Reject,
}

impl Conclusion {
    pub fn status(&self) -> ResignationStatus {
        match self {
            Self::Approve { .. } => ResignationStatus::Approved,
            Self::Reject => ResignationStatus::Rejected,
        }
    }

    pub fn approved_lwd(&self) -> Option<NaiveDate> {
        match self {
            Self::Approve { lwd } => Some(*lwd),
            Self::Reject => None,
        }
    }
}

/// Stored exit questionnaire submission
#[derive(Debug, Clone, PartialEq)]
pub struct ExitResponse {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub responses: Vec<ExitAnswer>,
    pub submitted_at: DateTime<Utc>,
}

/// Persistence for users, resignations and exit questionnaire responses.
///
/// Implementations enforce the uniqueness rules themselves and report them as
/// [`StoreError::Conflict`]:
/// - usernames are unique
/// - an employee has at most one open (pending or approved) resignation
/// - an employee has at most one exit response
#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_user(&self, new_user: &NewUser) -> StoreResult<Uuid>;

    async fn fetch_user_by_username(&self, username: &Username) -> StoreResult<Option<User>>;

    async fn insert_resignation(&self, employee_id: Uuid, lwd: NaiveDate) -> StoreResult<Uuid>;

    async fn fetch_resignation(&self, id: Uuid) -> StoreResult<Option<Resignation>>;

    /// Most recently submitted resignation of an employee
    async fn fetch_latest_resignation(&self, employee_id: Uuid)
        -> StoreResult<Option<Resignation>>;

    /// All resignations, oldest submission first
    async fn fetch_all_resignations(&self) -> StoreResult<Vec<Resignation>>;

    /// Apply `conclusion` if and only if the resignation is still pending.
    /// Returns `None` when the resignation is missing or already concluded
    async fn conclude_resignation(
        &self,
        id: Uuid,
        conclusion: &Conclusion,
    ) -> StoreResult<Option<Resignation>>;

    async fn insert_exit_response(
        &self,
        employee_id: Uuid,
        responses: &[ExitAnswer],
    ) -> StoreResult<Uuid>;

    /// All exit responses, oldest submission first
    async fn fetch_all_exit_responses(&self) -> StoreResult<Vec<ExitResponse>>;
}
