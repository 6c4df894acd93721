use async_trait::async_trait;

use chrono::{NaiveDate, Utc};

use tokio::sync::RwLock;

use uuid::Uuid;

use crate::domain::{ExitAnswer, Username};

use super::{
    Conclusion, ExitResponse, NewUser, Resignation, ResignationStatus, Store, StoreError,
    StoreResult, User,
};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    resignations: Vec<Resignation>,
    exit_responses: Vec<ExitResponse>,
}

/// In-process store. Same rules as [`super::PgStore`], nothing survives a restart
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, new_user: &NewUser) -> StoreResult<Uuid> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .iter()
            .any(|u| u.username == new_user.username.as_ref())
        {
            return Err(StoreError::Conflict);
        }

        let id = Uuid::new_v4();
        tables.users.push(User {
            id,
            username: new_user.username.as_ref().to_string(),
            password_hash: new_user.password_hash.clone(),
            role: new_user.role,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn fetch_user_by_username(&self, username: &Username) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.username == username.as_ref())
            .cloned())
    }

    async fn insert_resignation(&self, employee_id: Uuid, lwd: NaiveDate) -> StoreResult<Uuid> {
        let mut tables = self.tables.write().await;
        if tables
            .resignations
            .iter()
            .any(|r| r.employee_id == employee_id && r.status.is_open())
        {
            return Err(StoreError::Conflict);
        }

        let id = Uuid::new_v4();
        tables.resignations.push(Resignation {
            id,
            employee_id,
            lwd,
            status: ResignationStatus::Pending,
            approved_lwd: None,
            submitted_at: Utc::now(),
            concluded_at: None,
        });
        Ok(id)
    }

    async fn fetch_resignation(&self, id: Uuid) -> StoreResult<Option<Resignation>> {
        let tables = self.tables.read().await;
        Ok(tables.resignations.iter().find(|r| r.id == id).cloned())
    }

    async fn fetch_latest_resignation(
        &self,
        employee_id: Uuid,
    ) -> StoreResult<Option<Resignation>> {
        let tables = self.tables.read().await;
        // Insertion order is submission order
        Ok(tables
            .resignations
            .iter()
            .rev()
            .find(|r| r.employee_id == employee_id)
            .cloned())
    }

    async fn fetch_all_resignations(&self) -> StoreResult<Vec<Resignation>> {
        Ok(self.tables.read().await.resignations.clone())
    }

    async fn conclude_resignation(
        &self,
        id: Uuid,
        conclusion: &Conclusion,
    ) -> StoreResult<Option<Resignation>> {
        let mut tables = self.tables.write().await;
        let resignation = tables
            .resignations
            .iter_mut()
            .find(|r| r.id == id && r.status == ResignationStatus::Pending);

        Ok(resignation.map(|r| {
            r.status = conclusion.status();
            r.approved_lwd = conclusion.approved_lwd();
            r.concluded_at = Some(Utc::now());
            r.clone()
        }))
    }

    async fn insert_exit_response(
        &self,
        employee_id: Uuid,
        responses: &[ExitAnswer],
    ) -> StoreResult<Uuid> {
        let mut tables = self.tables.write().await;
        if tables
            .exit_responses
            .iter()
            .any(|r| r.employee_id == employee_id)
        {
            return Err(StoreError::Conflict);
        }

        let id = Uuid::new_v4();
        tables.exit_responses.push(ExitResponse {
            id,
            employee_id,
            responses: responses.to_vec(),
            submitted_at: Utc::now(),
        });
        Ok(id)
    }

    async fn fetch_all_exit_responses(&self) -> StoreResult<Vec<ExitResponse>> {
        Ok(self.tables.read().await.exit_responses.clone())
    }
}
