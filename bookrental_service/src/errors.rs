use crate::accounts_repository::AccountsRepositoryError;
use crate::api::{AccountId, BookId};
use crate::books_repository::BooksRepositoryError;
use crate::rentals_repository::RentalsRepositoryError;

/// Class of a service failure, decides how the caller reports it
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Forbidden,
    Unauthorized,
    BadRequest,
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Account {0} not found")]
    AccountNotFound(AccountId),

    #[error("Book {0} not found")]
    BookNotFound(BookId),

    #[error("Book {0} is already rented")]
    AlreadyRented(BookId),

    #[error("Book {0} is not rented")]
    NotRented(BookId),

    #[error("Book {0} is rented by another account")]
    RentedByOtherAccount(BookId),

    #[error("Book {0} already exists")]
    DuplicateBookId(BookId),

    #[error("No fields to update for book {0}")]
    EmptyUpdate(BookId),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account {0} is not an administrator")]
    NotAdmin(AccountId),

    #[error(transparent)]
    Accounts(#[from] AccountsRepositoryError),

    #[error(transparent)]
    Books(#[from] BooksRepositoryError),

    #[error(transparent)]
    Rentals(#[from] RentalsRepositoryError),

    #[error("Password hashing failure {0}")]
    Password(argon2::password_hash::Error),
}

impl From<argon2::password_hash::Error> for ServiceError {
    fn from(err: argon2::password_hash::Error) -> Self {
        ServiceError::Password(err)
    }
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::AccountNotFound(_) | ServiceError::BookNotFound(_) => {
                ErrorKind::NotFound
            }
            ServiceError::AlreadyRented(_)
            | ServiceError::NotRented(_)
            | ServiceError::DuplicateBookId(_) => ErrorKind::Conflict,
            ServiceError::RentedByOtherAccount(_) | ServiceError::NotAdmin(_) => {
                ErrorKind::Forbidden
            }
            ServiceError::InvalidCredentials => ErrorKind::Unauthorized,
            ServiceError::EmptyUpdate(_) => ErrorKind::BadRequest,
            ServiceError::Accounts(_)
            | ServiceError::Books(_)
            | ServiceError::Rentals(_)
            | ServiceError::Password(_) => ErrorKind::Internal,
        }
    }
}
