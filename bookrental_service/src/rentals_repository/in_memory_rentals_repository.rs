use std::collections::hash_map::Entry;

use crate::api::{AccountId, BookId, Rental};
use crate::database::InMemoryDatabase;
use crate::rentals_repository::{RentalsRepository, RentalsRepositoryError};

#[async_trait::async_trait]
impl RentalsRepository for InMemoryDatabase {
    async fn start_rental(&self, rental: Rental) -> Result<(), RentalsRepositoryError> {
        // books before rentals, same order as the joined reads
        let locked_books = self.books.read();
        if !locked_books.contains_key(&rental.book_id) {
            return Err(RentalsRepositoryError::BookNotFound(rental.book_id));
        }

        match self.rentals.write().entry(rental.book_id) {
            Entry::Occupied(_) => Err(RentalsRepositoryError::AlreadyRented(rental.book_id)),
            Entry::Vacant(entry) => {
                entry.insert(rental);
                Ok(())
            }
        }
    }

    async fn end_rental(
        &self,
        book_id: BookId,
        account_id: AccountId,
    ) -> Result<(), RentalsRepositoryError> {
        match self.rentals.write().entry(book_id) {
            Entry::Occupied(entry) if entry.get().account_id == account_id => {
                entry.remove();
                Ok(())
            }
            Entry::Occupied(_) => Err(RentalsRepositoryError::RentedByOtherAccount(book_id)),
            Entry::Vacant(_) => Err(RentalsRepositoryError::NotRented(book_id)),
        }
    }

    async fn find_by_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Rental>, RentalsRepositoryError> {
        let mut rentals: Vec<Rental> = self
            .rentals
            .read()
            .values()
            .filter(|rental| rental.account_id == account_id)
            .cloned()
            .collect();
        rentals.sort_by_key(|rental| rental.book_id);
        Ok(rentals)
    }
}
