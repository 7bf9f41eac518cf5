use tokio_postgres::types::ToSql;
use tokio_postgres::{Row, Statement};

use crate::api::{Book, BookId, BookPatch, BookWithRental, Rental};
use crate::books_repository::{BooksRepository, BooksRepositoryError};
use crate::database::PostgresDatabase;

const SELECT_BOOK_WITH_RENTAL: &str = "
    SELECT book.id, book.title, book.author, book.release_date,
           rental.account_id, rental.rental_datetime, rental.return_deadline
    FROM book
    LEFT OUTER JOIN rental ON book.id = rental.book_id";

fn book_with_rental_from_row(row: &Row) -> Result<BookWithRental, BooksRepositoryError> {
    let book = Book {
        id: row.try_get(0)?,
        title: row.try_get(1)?,
        author: row.try_get(2)?,
        release_date: row.try_get(3)?,
    };

    let account_id: Option<i32> = row.try_get(4)?;
    let rental = match account_id {
        Some(account_id) => Some(Rental {
            book_id: book.id,
            account_id,
            rental_datetime: row.try_get(5)?,
            return_deadline: row.try_get(6)?,
        }),
        None => None,
    };

    Ok(BookWithRental::new(book, rental))
}

#[async_trait::async_trait]
impl BooksRepository for PostgresDatabase {
    async fn find_all_with_rental(&self) -> Result<Vec<BookWithRental>, BooksRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare(&format!("{SELECT_BOOK_WITH_RENTAL} ORDER BY book.id"))
            .await?;

        let rows = self.client.query(&stmt, &[]).await?;
        rows.iter().map(book_with_rental_from_row).collect()
    }

    async fn find_with_rental(
        &self,
        book_id: BookId,
    ) -> Result<Option<BookWithRental>, BooksRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare(&format!("{SELECT_BOOK_WITH_RENTAL} WHERE book.id = $1"))
            .await?;

        let rows = self.client.query(&stmt, &[&book_id]).await?;
        rows.first().map(book_with_rental_from_row).transpose()
    }

    async fn register(&self, book: Book) -> Result<(), BooksRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare(
                "INSERT INTO book (id, title, author, release_date) VALUES ($1, $2, $3, $4)
                 ON CONFLICT (id) DO NOTHING RETURNING id",
            )
            .await?;

        let rows = self
            .client
            .query(
                &stmt,
                &[&book.id, &book.title, &book.author, &book.release_date],
            )
            .await?;

        if rows.is_empty() {
            Err(BooksRepositoryError::AlreadyExists(book.id))
        } else {
            Ok(())
        }
    }

    async fn update(&self, book_id: BookId, patch: BookPatch) -> Result<bool, BooksRepositoryError> {
        let mut assignments: Vec<String> = vec![];
        let mut params: Vec<&(dyn ToSql + Sync)> = vec![&book_id];

        if let Some(title) = &patch.title {
            params.push(title);
            assignments.push(format!("title = ${}", params.len()));
        }
        if let Some(author) = &patch.author {
            params.push(author);
            assignments.push(format!("author = ${}", params.len()));
        }
        if let Some(release_date) = &patch.release_date {
            params.push(release_date);
            assignments.push(format!("release_date = ${}", params.len()));
        }

        if assignments.is_empty() {
            return Err(BooksRepositoryError::NothingToUpdate(book_id));
        }

        let query = format!(
            "UPDATE book SET {} WHERE id = $1 RETURNING id",
            assignments.join(", ")
        );
        let rows = self.client.query(query.as_str(), &params).await?;
        Ok(!rows.is_empty())
    }

    async fn delete(&self, book_id: BookId) -> Result<bool, BooksRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("DELETE FROM book WHERE id = $1 RETURNING id")
            .await?;

        let rows = self.client.query(&stmt, &[&book_id]).await?;
        Ok(!rows.is_empty())
    }
}
