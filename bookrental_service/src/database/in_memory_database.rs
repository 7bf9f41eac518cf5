use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::AtomicI32;

use crate::api::{Account, AccountId, Book, BookId, Rental};

/// Backing storage shared by the in-memory repositories.
/// Books and rentals live side by side so lookups can join them and book deletion can cascade.
pub struct InMemoryDatabase {
    pub(crate) accounts: parking_lot::RwLock<HashMap<AccountId, Account>>,
    pub(crate) books: parking_lot::RwLock<BTreeMap<BookId, Book>>,
    pub(crate) rentals: parking_lot::RwLock<HashMap<BookId, Rental>>,
    pub(crate) account_sequence_generator: AtomicI32,
}

impl Default for InMemoryDatabase {
    fn default() -> Self {
        Self {
            accounts: Default::default(),
            books: Default::default(),
            rentals: Default::default(),
            account_sequence_generator: AtomicI32::new(1),
        }
    }
}
