use std::sync::Arc;

use crate::api::{Book, BookId, BookPatch};
use crate::books_repository::{BooksRepository, BooksRepositoryError};
use crate::errors::ServiceError;

/// Catalog maintenance done by administrators. Callers check the admin role first
#[derive(Clone)]
pub struct BookAdminService {
    books_repository: Arc<dyn BooksRepository>,
}

impl BookAdminService {
    pub fn new(books_repository: Arc<dyn BooksRepository>) -> Self {
        Self { books_repository }
    }

    /// Registers the book under its own id and returns it unchanged
    #[tracing::instrument(skip(self))]
    pub async fn register(&self, book: Book) -> Result<Book, ServiceError> {
        if self.books_repository.find_with_rental(book.id).await?.is_some() {
            return Err(ServiceError::DuplicateBookId(book.id));
        }

        match self.books_repository.register(book.clone()).await {
            Ok(()) => {
                tracing::info!(book_id = book.id, "Book registered");
                Ok(book)
            }
            Err(BooksRepositoryError::AlreadyExists(id)) => Err(ServiceError::DuplicateBookId(id)),
            Err(err) => Err(err.into()),
        }
    }

    /// Overwrites only the fields present in the patch
    #[tracing::instrument(skip(self))]
    pub async fn update(&self, book_id: BookId, patch: BookPatch) -> Result<BookId, ServiceError> {
        if patch.is_empty() {
            return Err(ServiceError::EmptyUpdate(book_id));
        }
        if self.books_repository.find_with_rental(book_id).await?.is_none() {
            return Err(ServiceError::BookNotFound(book_id));
        }

        if self.books_repository.update(book_id, patch).await? {
            tracing::info!(book_id, "Book updated");
            Ok(book_id)
        } else {
            Err(ServiceError::BookNotFound(book_id))
        }
    }

    /// Deletes the book, an active rental of it goes away too
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, book_id: BookId) -> Result<BookId, ServiceError> {
        if self.books_repository.find_with_rental(book_id).await?.is_none() {
            return Err(ServiceError::BookNotFound(book_id));
        }

        if self.books_repository.delete(book_id).await? {
            tracing::info!(book_id, "Book deleted");
            Ok(book_id)
        } else {
            Err(ServiceError::BookNotFound(book_id))
        }
    }
}

#[cfg(test)]
mod book_admin_service_tests {
    use chrono::NaiveDate;

    use crate::database::InMemoryDatabase;
    use crate::errors::ErrorKind;

    use super::*;

    fn book(id: BookId) -> Book {
        Book {
            id,
            title: "X".to_string(),
            author: "Y".to_string(),
            release_date: NaiveDate::from_ymd_opt(2010, 12, 3).unwrap(),
        }
    }

    fn service() -> (Arc<InMemoryDatabase>, BookAdminService) {
        let database = Arc::new(InMemoryDatabase::default());
        (database.clone(), BookAdminService::new(database))
    }

    #[tokio::test]
    async fn register_returns_input_and_rejects_duplicate_id() {
        let (database, service) = service();

        assert_eq!(service.register(book(789)).await.unwrap(), book(789));
        assert_eq!(
            database.find_with_rental(789).await.unwrap().unwrap().book,
            book(789)
        );

        let duplicate = service.register(book(789)).await.unwrap_err();
        assert!(matches!(duplicate, ServiceError::DuplicateBookId(789)));
        assert_eq!(duplicate.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn update_changes_only_given_fields() {
        let (database, service) = service();
        service.register(book(3)).await.unwrap();

        let updated = service
            .update(
                3,
                BookPatch {
                    title: Some("New".to_string()),
                    author: None,
                    release_date: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated, 3);
        assert_eq!(
            database.find_with_rental(3).await.unwrap().unwrap().book,
            Book {
                title: "New".to_string(),
                ..book(3)
            }
        );
    }

    #[tokio::test]
    async fn update_rejects_unknown_book_and_empty_patch() {
        let (_database, service) = service();

        let patch = BookPatch {
            author: Some("Z".to_string()),
            ..BookPatch::default()
        };
        assert!(matches!(
            service.update(3, patch).await,
            Err(ServiceError::BookNotFound(3))
        ));

        service.register(book(3)).await.unwrap();
        let empty = service.update(3, BookPatch::default()).await.unwrap_err();
        assert!(matches!(empty, ServiceError::EmptyUpdate(3)));
        assert_eq!(empty.kind(), ErrorKind::BadRequest);
    }

    #[tokio::test]
    async fn delete_removes_book() {
        let (database, service) = service();
        assert!(matches!(
            service.delete(1).await,
            Err(ServiceError::BookNotFound(1))
        ));

        service.register(book(1)).await.unwrap();
        assert_eq!(service.delete(1).await.unwrap(), 1);
        assert_eq!(database.find_with_rental(1).await.unwrap(), None);

        // the id is free again
        service.register(book(1)).await.unwrap();
    }
}
