use std::sync::atomic::Ordering;

use crate::accounts_repository::{AccountsRepository, AccountsRepositoryError};
use crate::api::{Account, AccountId, NewAccount};
use crate::database::InMemoryDatabase;

#[async_trait::async_trait]
impl AccountsRepository for InMemoryDatabase {
    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, AccountsRepositoryError> {
        Ok(self.accounts.read().get(&id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Account>, AccountsRepositoryError> {
        Ok(self
            .accounts
            .read()
            .values()
            .find(|account| account.email == email)
            .cloned())
    }

    async fn add_account(&self, account: NewAccount) -> Result<AccountId, AccountsRepositoryError> {
        let mut locked_accounts = self.accounts.write();
        if locked_accounts
            .values()
            .any(|existing| existing.email == account.email)
        {
            return Err(AccountsRepositoryError::EmailTaken(account.email));
        }

        let id = self
            .account_sequence_generator
            .fetch_add(1, Ordering::Relaxed);
        locked_accounts.insert(
            id,
            Account {
                id,
                email: account.email,
                password: account.password,
                name: account.name,
                role: account.role,
            },
        );
        Ok(id)
    }
}
