use std::sync::Arc;

use crate::accounts_repository::AccountsRepository;
use crate::api::{AccountId, BookId, BookWithRental, Rental};
use crate::books_repository::BooksRepository;
use crate::clock::Clock;
use crate::errors::ServiceError;
use crate::rentals_repository::{RentalsRepository, RentalsRepositoryError};

/// Rental lifecycle of a book: AVAILABLE -> ON_LOAN(account) -> AVAILABLE.
/// Only the holding account can end a rental, and deadlines are never enforced here
#[derive(Clone)]
pub struct RentalService {
    accounts_repository: Arc<dyn AccountsRepository>,
    books_repository: Arc<dyn BooksRepository>,
    rentals_repository: Arc<dyn RentalsRepository>,
    clock: Arc<dyn Clock>,
}

impl RentalService {
    pub fn new(
        accounts_repository: Arc<dyn AccountsRepository>,
        books_repository: Arc<dyn BooksRepository>,
        rentals_repository: Arc<dyn RentalsRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            accounts_repository,
            books_repository,
            rentals_repository,
            clock,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_books(&self) -> Result<Vec<BookWithRental>, ServiceError> {
        Ok(self.books_repository.find_all_with_rental().await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_book(&self, book_id: BookId) -> Result<BookWithRental, ServiceError> {
        self.books_repository
            .find_with_rental(book_id)
            .await?
            .ok_or(ServiceError::BookNotFound(book_id))
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_rentals(&self, account_id: AccountId) -> Result<Vec<Rental>, ServiceError> {
        self.ensure_account_exists(account_id).await?;
        Ok(self.rentals_repository.find_by_account(account_id).await?)
    }

    /// Rents the book to the account for the fixed term starting now
    #[tracing::instrument(skip(self))]
    pub async fn start_rental(
        &self,
        book_id: BookId,
        account_id: AccountId,
    ) -> Result<Rental, ServiceError> {
        self.ensure_account_exists(account_id).await?;
        let book = self.get_book(book_id).await?;
        if book.is_rental() {
            return Err(ServiceError::AlreadyRented(book_id));
        }

        let rental = Rental::start(book_id, account_id, self.clock.now());
        match self.rentals_repository.start_rental(rental.clone()).await {
            Ok(()) => {
                tracing::info!(
                    book_id,
                    account_id,
                    return_deadline = %rental.return_deadline,
                    "Rental started"
                );
                Ok(rental)
            }
            // Lost a race against another start, or the book was deleted meanwhile
            Err(RentalsRepositoryError::AlreadyRented(_)) => {
                Err(ServiceError::AlreadyRented(book_id))
            }
            Err(RentalsRepositoryError::BookNotFound(_)) => {
                Err(ServiceError::BookNotFound(book_id))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Returns the book, only the account holding the rental may do so
    #[tracing::instrument(skip(self))]
    pub async fn end_rental(&self, book_id: BookId, account_id: AccountId) -> Result<(), ServiceError> {
        self.ensure_account_exists(account_id).await?;
        let book = self.get_book(book_id).await?;
        let rental = book.rental.ok_or(ServiceError::NotRented(book_id))?;
        if rental.account_id != account_id {
            return Err(ServiceError::RentedByOtherAccount(book_id));
        }

        // The store re-checks the holder, the book may have changed hands meanwhile
        match self.rentals_repository.end_rental(book_id, account_id).await {
            Ok(()) => {
                tracing::info!(book_id, account_id, "Rental ended");
                Ok(())
            }
            Err(RentalsRepositoryError::NotRented(_)) => Err(ServiceError::NotRented(book_id)),
            Err(RentalsRepositoryError::RentedByOtherAccount(_)) => {
                Err(ServiceError::RentedByOtherAccount(book_id))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn ensure_account_exists(&self, account_id: AccountId) -> Result<(), ServiceError> {
        match self.accounts_repository.find_by_id(account_id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::AccountNotFound(account_id)),
        }
    }
}

#[cfg(test)]
mod rental_service_tests {
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    use crate::api::{Book, BookPatch, NewAccount, RoleType, RENTAL_TERM_DAYS};
    use crate::books_repository::BooksRepositoryError;
    use crate::clock::FixedClock;
    use crate::database::InMemoryDatabase;

    use super::*;

    fn start_of_july() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 7, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    /// Two user accounts (ids 1 and 2) and books 1 and 2, nothing rented
    async fn setup() -> (Arc<InMemoryDatabase>, RentalService) {
        let database = Arc::new(InMemoryDatabase::default());
        for name in ["first", "second"] {
            database
                .add_account(NewAccount {
                    email: format!("{name}@example.com"),
                    password: "hash".to_string(),
                    name: name.to_string(),
                    role: RoleType::User,
                })
                .await
                .unwrap();
        }
        for id in [1, 2] {
            database
                .register(Book {
                    id,
                    title: format!("title{id}"),
                    author: "author".to_string(),
                    release_date: NaiveDate::from_ymd_opt(2010, 12, 3).unwrap(),
                })
                .await
                .unwrap();
        }

        let service = RentalService::new(
            database.clone(),
            database.clone(),
            database.clone(),
            Arc::new(FixedClock(start_of_july())),
        );
        (database, service)
    }

    #[tokio::test]
    async fn start_rental_sets_fourteen_day_deadline() {
        let (_database, service) = setup().await;

        let rental = service.start_rental(1, 2).await.unwrap();

        assert_eq!(
            rental,
            Rental {
                book_id: 1,
                account_id: 2,
                rental_datetime: start_of_july(),
                return_deadline: NaiveDate::from_ymd_opt(2021, 7, 15)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
            }
        );
        assert_eq!(
            rental.return_deadline - rental.rental_datetime,
            Duration::days(RENTAL_TERM_DAYS)
        );

        let book = service.get_book(1).await.unwrap();
        assert_eq!(book.rental, Some(rental.clone()));
        assert_eq!(service.list_rentals(2).await.unwrap(), vec![rental]);
    }

    #[tokio::test]
    async fn unknown_account_is_checked_before_book() {
        let (_database, service) = setup().await;

        assert!(matches!(
            service.start_rental(404, 99).await,
            Err(ServiceError::AccountNotFound(99))
        ));
        assert!(matches!(
            service.end_rental(404, 99).await,
            Err(ServiceError::AccountNotFound(99))
        ));
        assert!(matches!(
            service.list_rentals(99).await,
            Err(ServiceError::AccountNotFound(99))
        ));
    }

    #[tokio::test]
    async fn unknown_book_is_not_found() {
        let (_database, service) = setup().await;

        assert!(matches!(
            service.start_rental(404, 1).await,
            Err(ServiceError::BookNotFound(404))
        ));
        assert!(matches!(
            service.end_rental(404, 1).await,
            Err(ServiceError::BookNotFound(404))
        ));
        assert!(matches!(
            service.get_book(404).await,
            Err(ServiceError::BookNotFound(404))
        ));
    }

    #[tokio::test]
    async fn rented_book_cannot_be_rented_again_by_anyone() {
        let (_database, service) = setup().await;
        service.start_rental(1, 1).await.unwrap();

        let same_account = service.start_rental(1, 1).await.unwrap_err();
        let other_account = service.start_rental(1, 2).await.unwrap_err();

        assert!(matches!(same_account, ServiceError::AlreadyRented(1)));
        assert!(matches!(other_account, ServiceError::AlreadyRented(1)));
        assert_eq!(other_account.kind(), crate::errors::ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn only_holder_can_end_rental() {
        let (_database, service) = setup().await;
        service.start_rental(1, 1).await.unwrap();

        let forbidden = service.end_rental(1, 2).await.unwrap_err();
        assert!(matches!(forbidden, ServiceError::RentedByOtherAccount(1)));
        assert_eq!(forbidden.kind(), crate::errors::ErrorKind::Forbidden);
        assert!(service.get_book(1).await.unwrap().is_rental());

        service.end_rental(1, 1).await.unwrap();
        assert!(!service.get_book(1).await.unwrap().is_rental());
    }

    #[tokio::test]
    async fn ending_twice_is_not_rented() {
        let (_database, service) = setup().await;
        service.start_rental(2, 1).await.unwrap();
        service.end_rental(2, 1).await.unwrap();

        assert!(matches!(
            service.end_rental(2, 1).await,
            Err(ServiceError::NotRented(2))
        ));

        // and the book can be rented again afterwards
        service.start_rental(2, 2).await.unwrap();
        assert_eq!(service.list_rentals(1).await.unwrap(), Vec::<Rental>::default());
        assert_eq!(service.list_rentals(2).await.unwrap().len(), 1);
    }

    /// Reports every book with a fixed view of its rental, as if concurrent
    /// starts and ends were not visible yet
    struct StaleBooksRepository {
        database: Arc<InMemoryDatabase>,
        rental: Option<Rental>,
    }

    impl StaleBooksRepository {
        fn available(database: Arc<InMemoryDatabase>) -> Self {
            Self {
                database,
                rental: None,
            }
        }

        fn rented(database: Arc<InMemoryDatabase>, rental: Rental) -> Self {
            Self {
                database,
                rental: Some(rental),
            }
        }
    }

    #[async_trait::async_trait]
    impl BooksRepository for StaleBooksRepository {
        async fn find_all_with_rental(&self) -> Result<Vec<BookWithRental>, BooksRepositoryError> {
            self.database.find_all_with_rental().await
        }

        async fn find_with_rental(
            &self,
            book_id: BookId,
        ) -> Result<Option<BookWithRental>, BooksRepositoryError> {
            Ok(self
                .database
                .find_with_rental(book_id)
                .await?
                .map(|found| BookWithRental::new(found.book, self.rental.clone())))
        }

        async fn register(&self, book: Book) -> Result<(), BooksRepositoryError> {
            self.database.register(book).await
        }

        async fn update(&self, book_id: BookId, patch: BookPatch) -> Result<bool, BooksRepositoryError> {
            self.database.update(book_id, patch).await
        }

        async fn delete(&self, book_id: BookId) -> Result<bool, BooksRepositoryError> {
            self.database.delete(book_id).await
        }
    }

    #[tokio::test]
    async fn store_conflict_surfaces_as_already_rented() {
        let (database, _service) = setup().await;
        database
            .start_rental(Rental::start(1, 2, start_of_july()))
            .await
            .unwrap();

        let racing_service = RentalService::new(
            database.clone(),
            Arc::new(StaleBooksRepository::available(database.clone())),
            database.clone(),
            Arc::new(FixedClock(start_of_july())),
        );

        assert!(matches!(
            racing_service.start_rental(1, 1).await,
            Err(ServiceError::AlreadyRented(1))
        ));
        assert_eq!(
            database.find_by_account(2).await.unwrap(),
            vec![Rental::start(1, 2, start_of_july())]
        );
    }

    #[tokio::test]
    async fn end_rental_keeps_loan_taken_over_by_other_account() {
        let (database, _service) = setup().await;
        // account 1 returned the book meanwhile and account 2 rented it
        database
            .start_rental(Rental::start(1, 2, start_of_july()))
            .await
            .unwrap();

        let racing_service = RentalService::new(
            database.clone(),
            Arc::new(StaleBooksRepository::rented(
                database.clone(),
                Rental::start(1, 1, start_of_july()),
            )),
            database.clone(),
            Arc::new(FixedClock(start_of_july())),
        );

        let err = racing_service.end_rental(1, 1).await.unwrap_err();
        assert!(matches!(err, ServiceError::RentedByOtherAccount(1)));
        assert_eq!(
            database.find_by_account(2).await.unwrap(),
            vec![Rental::start(1, 2, start_of_july())]
        );
    }

    #[tokio::test]
    async fn end_rental_of_loan_ended_meanwhile_is_not_rented() {
        let (database, _service) = setup().await;

        let racing_service = RentalService::new(
            database.clone(),
            Arc::new(StaleBooksRepository::rented(
                database.clone(),
                Rental::start(2, 1, start_of_july()),
            )),
            database.clone(),
            Arc::new(FixedClock(start_of_july())),
        );

        assert!(matches!(
            racing_service.end_rental(2, 1).await,
            Err(ServiceError::NotRented(2))
        ));
    }

    #[tokio::test]
    async fn list_books_reports_rental_state() {
        let (_database, service) = setup().await;
        service.start_rental(2, 1).await.unwrap();

        let books = service.list_books().await.unwrap();
        assert_eq!(
            books.iter().map(|b| (b.book.id, b.is_rental)).collect::<Vec<_>>(),
            vec![(1, false), (2, true)]
        );
    }
}
