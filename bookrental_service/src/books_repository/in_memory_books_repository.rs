use std::collections::btree_map::Entry;

use serde_json::json;

use crate::api::{Book, BookId, BookPatch, BookWithRental};
use crate::books_repository::{BooksRepository, BooksRepositoryError};
use crate::database::InMemoryDatabase;

#[async_trait::async_trait]
impl BooksRepository for InMemoryDatabase {
    async fn find_all_with_rental(&self) -> Result<Vec<BookWithRental>, BooksRepositoryError> {
        let locked_books = self.books.read();
        let locked_rentals = self.rentals.read();
        Ok(locked_books
            .values()
            .map(|book| BookWithRental::new(book.clone(), locked_rentals.get(&book.id).cloned()))
            .collect())
    }

    async fn find_with_rental(
        &self,
        book_id: BookId,
    ) -> Result<Option<BookWithRental>, BooksRepositoryError> {
        let locked_books = self.books.read();
        let locked_rentals = self.rentals.read();
        Ok(locked_books
            .get(&book_id)
            .map(|book| BookWithRental::new(book.clone(), locked_rentals.get(&book_id).cloned())))
    }

    async fn register(&self, book: Book) -> Result<(), BooksRepositoryError> {
        match self.books.write().entry(book.id) {
            Entry::Occupied(_) => Err(BooksRepositoryError::AlreadyExists(book.id)),
            Entry::Vacant(entry) => {
                entry.insert(book);
                Ok(())
            }
        }
    }

    async fn update(&self, book_id: BookId, patch: BookPatch) -> Result<bool, BooksRepositoryError> {
        if patch.is_empty() {
            return Err(BooksRepositoryError::NothingToUpdate(book_id));
        }

        let mut locked_books = self.books.write();
        if let Some(book) = locked_books.get_mut(&book_id) {
            let mut result_book = json!(book);
            json_patch::merge(&mut result_book, &json!(patch));
            *book = serde_json::from_value(result_book)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn delete(&self, book_id: BookId) -> Result<bool, BooksRepositoryError> {
        let mut locked_books = self.books.write();
        if locked_books.remove(&book_id).is_some() {
            self.rentals.write().remove(&book_id);
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
