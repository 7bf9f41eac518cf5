use tokio_postgres::error::SqlState;
use tokio_postgres::{Row, Statement};

use crate::accounts_repository::{AccountsRepository, AccountsRepositoryError};
use crate::api::{Account, AccountId, NewAccount, RoleType};
use crate::database::PostgresDatabase;

fn account_from_row(row: &Row) -> Result<Account, AccountsRepositoryError> {
    let role: String = row.try_get(4)?;
    Ok(Account {
        id: row.try_get(0)?,
        email: row.try_get(1)?,
        password: row.try_get(2)?,
        name: row.try_get(3)?,
        role: role
            .parse::<RoleType>()
            .map_err(AccountsRepositoryError::InvalidRow)?,
    })
}

#[async_trait::async_trait]
impl AccountsRepository for PostgresDatabase {
    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, AccountsRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("SELECT id, email, password, name, role_type FROM account WHERE id = $1")
            .await?;

        let rows = self.client.query(&stmt, &[&id]).await?;
        rows.first().map(account_from_row).transpose()
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Account>, AccountsRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("SELECT id, email, password, name, role_type FROM account WHERE email = $1")
            .await?;

        let rows = self.client.query(&stmt, &[&email]).await?;
        rows.first().map(account_from_row).transpose()
    }

    async fn add_account(&self, account: NewAccount) -> Result<AccountId, AccountsRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare(
                "INSERT INTO account (email, password, name, role_type) VALUES ($1, $2, $3, $4) RETURNING id",
            )
            .await?;

        let rows = self
            .client
            .query(
                &stmt,
                &[
                    &account.email,
                    &account.password,
                    &account.name,
                    &account.role.as_str(),
                ],
            )
            .await;

        match rows {
            Ok(rows) => Ok(rows
                .first()
                .ok_or_else(|| AccountsRepositoryError::Other("Id not returned".to_string()))?
                .try_get(0)?),
            Err(err) if err.code() == Some(&SqlState::UNIQUE_VIOLATION) => {
                Err(AccountsRepositoryError::EmailTaken(account.email))
            }
            Err(other_err) => Err(other_err.into()),
        }
    }
}
