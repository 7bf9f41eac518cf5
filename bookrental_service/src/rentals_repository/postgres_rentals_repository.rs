use tokio_postgres::error::SqlState;
use tokio_postgres::Statement;

use crate::api::{AccountId, BookId, Rental};
use crate::database::PostgresDatabase;
use crate::rentals_repository::{RentalsRepository, RentalsRepositoryError};

#[async_trait::async_trait]
impl RentalsRepository for PostgresDatabase {
    async fn start_rental(&self, rental: Rental) -> Result<(), RentalsRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare(
                "INSERT INTO rental (book_id, account_id, rental_datetime, return_deadline)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT (book_id) DO NOTHING RETURNING book_id",
            )
            .await?;

        let rows = self
            .client
            .query(
                &stmt,
                &[
                    &rental.book_id,
                    &rental.account_id,
                    &rental.rental_datetime,
                    &rental.return_deadline,
                ],
            )
            .await;

        match rows {
            Ok(rows) if rows.is_empty() => {
                Err(RentalsRepositoryError::AlreadyRented(rental.book_id))
            }
            Ok(_) => Ok(()),
            Err(err) if err.code() == Some(&SqlState::FOREIGN_KEY_VIOLATION) => {
                Err(RentalsRepositoryError::BookNotFound(rental.book_id))
            }
            Err(other_err) => Err(other_err.into()),
        }
    }

    async fn end_rental(
        &self,
        book_id: BookId,
        account_id: AccountId,
    ) -> Result<(), RentalsRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("DELETE FROM rental WHERE book_id = $1 AND account_id = $2 RETURNING book_id")
            .await?;

        let rows = self.client.query(&stmt, &[&book_id, &account_id]).await?;
        if !rows.is_empty() {
            return Ok(());
        }

        // Nothing deleted, only tells apart the reason
        let holder = self
            .client
            .query_opt("SELECT account_id FROM rental WHERE book_id = $1", &[&book_id])
            .await?;
        match holder {
            Some(_) => Err(RentalsRepositoryError::RentedByOtherAccount(book_id)),
            None => Err(RentalsRepositoryError::NotRented(book_id)),
        }
    }

    async fn find_by_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Rental>, RentalsRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare(
                "SELECT book_id, account_id, rental_datetime, return_deadline
                 FROM rental WHERE account_id = $1 ORDER BY book_id",
            )
            .await?;

        let rows = self.client.query(&stmt, &[&account_id]).await?;

        rows.iter()
            .map(|row| {
                Ok(Rental {
                    book_id: row.try_get(0)?,
                    account_id: row.try_get(1)?,
                    rental_datetime: row.try_get(2)?,
                    return_deadline: row.try_get(3)?,
                })
            })
            .collect()
    }
}
