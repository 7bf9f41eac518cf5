use crate::api::{Account, AccountId, NewAccount};

mod in_memory_accounts_repository;
mod postgres_accounts_repository;

#[derive(Debug, thiserror::Error)]
pub enum AccountsRepositoryError {
    #[error("Account with email {0} already exists")]
    EmailTaken(String),

    #[error("Invalid account row: {0}")]
    InvalidRow(String),

    #[error("Database failure {0}")]
    DatabaseFailure(#[from] tokio_postgres::Error),

    #[error("Other error {0}")]
    Other(String),
}

#[async_trait::async_trait]
pub trait AccountsRepository: Send + Sync {
    /// Looks up an account by id, None if it does not exist
    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, AccountsRepositoryError>;

    /// Looks up an account by its unique email, None if it does not exist
    async fn find_by_email(&self, email: &str)
        -> Result<Option<Account>, AccountsRepositoryError>;

    /// Provisions a new account, returns the id assigned to it.
    /// The password is expected to be hashed already
    async fn add_account(&self, account: NewAccount) -> Result<AccountId, AccountsRepositoryError>;
}
