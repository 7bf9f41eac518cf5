use crate::api::{Book, BookId, BookPatch, BookWithRental};

mod in_memory_books_repository;
mod postgres_books_repository;

#[derive(thiserror::Error, Debug)]
pub enum BooksRepositoryError {
    #[error("Book {0} already exists")]
    AlreadyExists(BookId),

    #[error("Nothing to update for book {0}")]
    NothingToUpdate(BookId),

    #[error("Failed to deserialize book: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Database failure {0}")]
    DatabaseFailure(#[from] tokio_postgres::Error),
}

#[async_trait::async_trait]
pub trait BooksRepository: Send + Sync {
    /// Lists all books ordered by id, each with its current rental
    async fn find_all_with_rental(&self) -> Result<Vec<BookWithRental>, BooksRepositoryError>;
    /// Retrieves a book with its current rental, None if the book does not exist
    async fn find_with_rental(
        &self,
        book_id: BookId,
    ) -> Result<Option<BookWithRental>, BooksRepositoryError>;
    /// Adds book under its own id, fails with AlreadyExists if the id is taken
    async fn register(&self, book: Book) -> Result<(), BooksRepositoryError>;
    /// Overwrites the fields set in the patch, returns false if the book was not found
    async fn update(&self, book_id: BookId, patch: BookPatch) -> Result<bool, BooksRepositoryError>;
    /// Deletes the book together with its rental, returns false if the book was not found
    async fn delete(&self, book_id: BookId) -> Result<bool, BooksRepositoryError>;
}
