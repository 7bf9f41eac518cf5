use std::sync::Arc;

use paperclip::actix::web;

use crate::account_service::AccountService;
use crate::accounts_repository::AccountsRepository;
use crate::book_admin_service::BookAdminService;
use crate::books_repository::BooksRepository;
use crate::clock::Clock;
use crate::handlers;
use crate::rental_service::RentalService;
use crate::rentals_repository::RentalsRepository;

/// Services shared by all workers, each registered as app data
#[derive(Clone)]
pub struct AppServices {
    pub accounts: AccountService,
    pub rentals: RentalService,
    pub book_admin: BookAdminService,
}

impl AppServices {
    pub fn new<D>(database: Arc<D>, clock: Arc<dyn Clock>) -> Self
    where
        D: AccountsRepository + BooksRepository + RentalsRepository + 'static,
    {
        Self {
            accounts: AccountService::new(database.clone()),
            rentals: RentalService::new(database.clone(), database.clone(), database.clone(), clock),
            book_admin: BookAdminService::new(database),
        }
    }
}

pub fn config_app(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(handlers::health)))
        .service(
            web::scope("/api")
                .service(web::resource("/login").route(web::post().to(handlers::login)))
                .service(web::resource("/books").route(web::get().to(handlers::get_all_books)))
                .service(
                    web::resource("/book/{book_id}").route(web::get().to(handlers::get_book)),
                )
                .service(
                    web::scope("/account/{account_id}")
                        .service(
                            web::resource("/rentals").route(web::get().to(handlers::get_rentals)),
                        )
                        .service(
                            web::resource("/rental/{book_id}")
                                .route(web::post().to(handlers::start_rental))
                                .route(web::delete().to(handlers::end_rental)),
                        ),
                )
                .service(
                    web::scope("/admin/{account_id}")
                        .service(
                            web::resource("/book").route(web::post().to(handlers::register_book)),
                        )
                        .service(
                            web::resource("/book/{book_id}")
                                .route(web::patch().to(handlers::update_book))
                                .route(web::delete().to(handlers::delete_book)),
                        ),
                ),
        );
}
