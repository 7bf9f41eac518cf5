use crate::api::{AccountId, BookId, Rental};

mod in_memory_rentals_repository;
mod postgres_rentals_repository;

#[derive(Debug, thiserror::Error)]
pub enum RentalsRepositoryError {
    #[error("Book {0} already rented")]
    AlreadyRented(BookId),

    #[error("Book {0} not rented")]
    NotRented(BookId),

    #[error("Book {0} rented by another account")]
    RentedByOtherAccount(BookId),

    #[error("Book {0} not found")]
    BookNotFound(BookId),

    #[error("Database failure {0}")]
    DatabaseFailure(#[from] tokio_postgres::Error),
}

#[async_trait::async_trait]
pub trait RentalsRepository: Send + Sync {
    /// Inserts the rental only if the book has no active rental
    async fn start_rental(&self, rental: Rental) -> Result<(), RentalsRepositoryError>;

    /// Removes the active rental of the book only if the account holds it
    async fn end_rental(
        &self,
        book_id: BookId,
        account_id: AccountId,
    ) -> Result<(), RentalsRepositoryError>;

    /// Lists active rentals held by the account, ordered by book id
    async fn find_by_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Rental>, RentalsRepositoryError>;
}
