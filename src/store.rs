use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::accounts::{repo as accounts_repo, Account, NewAccount};
use crate::analysis::repo as analysis_repo;
use crate::analysis::repo_types::{CommittedAnalysis, NewAnalysis};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,

    #[error("no credits remaining")]
    QuotaExhausted,

    #[error(transparent)]
    Database(#[from] anyhow::Error),
}

/// Persisted account and analysis state.
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_account_by_id(&self, id: Uuid) -> anyhow::Result<Option<Account>>;
    async fn find_account_by_email(&self, email: &str) -> anyhow::Result<Option<Account>>;
    async fn create_account(&self, new: NewAccount) -> Result<Account, StoreError>;
    /// Insert the analysis and take one credit (free tier) atomically.
    async fn commit_analysis(
        &self,
        account: &Account,
        new: NewAnalysis,
    ) -> Result<CommittedAnalysis, StoreError>;
    async fn close(&self);
}

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_account_by_id(&self, id: Uuid) -> anyhow::Result<Option<Account>> {
        accounts_repo::find_by_id(&self.db, id).await
    }

    async fn find_account_by_email(&self, email: &str) -> anyhow::Result<Option<Account>> {
        accounts_repo::find_by_email(&self.db, email).await
    }

    async fn create_account(&self, new: NewAccount) -> Result<Account, StoreError> {
        accounts_repo::create(&self.db, &new).await
    }

    async fn commit_analysis(
        &self,
        account: &Account,
        new: NewAnalysis,
    ) -> Result<CommittedAnalysis, StoreError> {
        analysis_repo::commit_analysis(&self.db, account, &new).await
    }

    async fn close(&self) {
        self.db.close().await;
    }
}
