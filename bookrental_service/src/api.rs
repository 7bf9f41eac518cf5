use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

pub type AccountId = i32;
pub type BookId = i32;

/// Fixed rental term, not configurable per call
pub const RENTAL_TERM_DAYS: i64 = 14;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoleType {
    Admin,
    User,
}

impl RoleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleType::Admin => "ADMIN",
            RoleType::User => "USER",
        }
    }
}

impl fmt::Display for RoleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ADMIN" => Ok(RoleType::Admin),
            "USER" => Ok(RoleType::User),
            other => Err(format!("Unknown role type {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
/// Account as kept in the store, password holds the argon2 PHC hash
pub struct Account {
    pub id: AccountId,
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: RoleType,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
/// Account data supplied when provisioning, id is assigned by the store
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: RoleType,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
/// Public view of an account, without the password hash
pub struct AccountSummary {
    pub id: AccountId,
    pub email: String,
    pub name: String,
    pub role: RoleType,
}

impl From<Account> for AccountSummary {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            name: account.name,
            role: account.role,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
/// Book in the catalog, id is assigned by the caller
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub release_date: NaiveDate,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
/// Selective update of a book. Only fields that are set overwrite the stored values
pub struct BookPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,
}

impl BookPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.release_date.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
/// Active loan of a book
pub struct Rental {
    pub book_id: BookId,
    pub account_id: AccountId,
    pub rental_datetime: NaiveDateTime,
    pub return_deadline: NaiveDateTime,
}

impl Rental {
    /// Creates a rental starting at `now`, due after the fixed rental term
    pub fn start(book_id: BookId, account_id: AccountId, now: NaiveDateTime) -> Self {
        Self {
            book_id,
            account_id,
            rental_datetime: now,
            return_deadline: now + Duration::days(RENTAL_TERM_DAYS),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
/// Book joined with its current rental, if any
pub struct BookWithRental {
    pub book: Book,
    pub rental: Option<Rental>,
    pub is_rental: bool,
}

impl BookWithRental {
    pub fn new(book: Book, rental: Option<Rental>) -> Self {
        Self {
            is_rental: rental.is_some(),
            book,
            rental,
        }
    }

    pub fn is_rental(&self) -> bool {
        self.rental.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct ErrorResponse {
    pub error: String,
}
