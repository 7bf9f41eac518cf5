pub mod api;

#[cfg(any(feature = "client", test))]
pub mod client;

#[cfg(any(feature = "server", test))]
pub mod account_service;
#[cfg(any(feature = "server", test))]
pub mod accounts_repository;
#[cfg(any(feature = "server", test))]
pub mod app_config;
#[cfg(any(feature = "server", test))]
pub mod book_admin_service;
#[cfg(any(feature = "server", test))]
pub mod books_repository;
#[cfg(any(feature = "server", test))]
pub mod clock;
#[cfg(any(feature = "server", test))]
pub mod database;
#[cfg(any(feature = "server", test))]
pub mod errors;
#[cfg(any(feature = "server", test))]
mod handlers;
#[cfg(any(feature = "server", test))]
pub mod password;
#[cfg(any(feature = "server", test))]
pub mod rental_service;
#[cfg(any(feature = "server", test))]
pub mod rentals_repository;
#[cfg(any(feature = "server", test))]
pub mod settings;
