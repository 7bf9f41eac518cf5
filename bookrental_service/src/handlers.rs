use actix_web::http::header::LOCATION;
use actix_web::web::Data;
use actix_web::{Error, HttpResponse};
use paperclip::actix::{api_v2_operation, web, Apiv2Schema};
use serde::Deserialize;

use crate::account_service::AccountService;
use crate::api::{AccountId, AccountSummary, Book, BookId, BookPatch, ErrorResponse, LoginRequest};
use crate::book_admin_service::BookAdminService;
use crate::errors::{ErrorKind, ServiceError};
use crate::rental_service::RentalService;

#[derive(Debug, Deserialize, Apiv2Schema)]
pub struct AccountBookPath {
    pub account_id: AccountId,
    pub book_id: BookId,
}

fn error_response(err: ServiceError) -> HttpResponse {
    let body = ErrorResponse {
        error: err.to_string(),
    };
    match err.kind() {
        ErrorKind::NotFound => HttpResponse::NotFound().json(body),
        ErrorKind::Conflict => HttpResponse::Conflict().json(body),
        ErrorKind::Forbidden => HttpResponse::Forbidden().json(body),
        ErrorKind::Unauthorized => HttpResponse::Unauthorized().json(body),
        ErrorKind::BadRequest => HttpResponse::BadRequest().json(body),
        ErrorKind::Internal => {
            tracing::error!("Request failed {}", err);
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[api_v2_operation]
pub async fn health() -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().finish())
}

#[api_v2_operation]
pub async fn login(
    account_service: Data<AccountService>,
    credentials: web::Json<LoginRequest>,
) -> Result<HttpResponse, Error> {
    let credentials = credentials.into_inner();
    Ok(
        match account_service
            .authenticate(&credentials.email, &credentials.password)
            .await
        {
            Ok(account) => HttpResponse::Ok().json(AccountSummary::from(account)),
            Err(err) => error_response(err),
        },
    )
}

#[api_v2_operation]
pub async fn get_all_books(rental_service: Data<RentalService>) -> Result<HttpResponse, Error> {
    Ok(match rental_service.list_books().await {
        Ok(books) => HttpResponse::Ok().json(books),
        Err(err) => error_response(err),
    })
}

#[api_v2_operation]
pub async fn get_book(
    rental_service: Data<RentalService>,
    book_id: web::Path<BookId>,
) -> Result<HttpResponse, Error> {
    Ok(match rental_service.get_book(book_id.into_inner()).await {
        Ok(book) => HttpResponse::Ok().json(book),
        Err(err) => error_response(err),
    })
}

#[api_v2_operation]
pub async fn get_rentals(
    rental_service: Data<RentalService>,
    account_id: web::Path<AccountId>,
) -> Result<HttpResponse, Error> {
    Ok(
        match rental_service.list_rentals(account_id.into_inner()).await {
            Ok(rentals) => HttpResponse::Ok().json(rentals),
            Err(err) => error_response(err),
        },
    )
}

#[api_v2_operation]
pub async fn start_rental(
    rental_service: Data<RentalService>,
    path: web::Path<AccountBookPath>,
) -> Result<HttpResponse, Error> {
    let AccountBookPath {
        account_id,
        book_id,
    } = path.into_inner();
    Ok(
        match rental_service.start_rental(book_id, account_id).await {
            Ok(rental) => HttpResponse::Created().json(rental),
            Err(err) => error_response(err),
        },
    )
}

#[api_v2_operation]
pub async fn end_rental(
    rental_service: Data<RentalService>,
    path: web::Path<AccountBookPath>,
) -> Result<HttpResponse, Error> {
    let AccountBookPath {
        account_id,
        book_id,
    } = path.into_inner();
    Ok(match rental_service.end_rental(book_id, account_id).await {
        Ok(()) => HttpResponse::Ok().finish(),
        Err(err) => error_response(err),
    })
}

#[api_v2_operation]
pub async fn register_book(
    account_service: Data<AccountService>,
    book_admin_service: Data<BookAdminService>,
    account_id: web::Path<AccountId>,
    book: web::Json<Book>,
) -> Result<HttpResponse, Error> {
    if let Err(err) = account_service.require_admin(account_id.into_inner()).await {
        return Ok(error_response(err));
    }

    Ok(match book_admin_service.register(book.into_inner()).await {
        Ok(book) => HttpResponse::Created()
            .append_header((LOCATION, format!("/api/book/{}", book.id)))
            .json(book),
        Err(err) => error_response(err),
    })
}

#[api_v2_operation]
pub async fn update_book(
    account_service: Data<AccountService>,
    book_admin_service: Data<BookAdminService>,
    path: web::Path<AccountBookPath>,
    patch: web::Json<BookPatch>,
) -> Result<HttpResponse, Error> {
    let AccountBookPath {
        account_id,
        book_id,
    } = path.into_inner();
    if let Err(err) = account_service.require_admin(account_id).await {
        return Ok(error_response(err));
    }

    Ok(
        match book_admin_service.update(book_id, patch.into_inner()).await {
            Ok(book_id) => HttpResponse::Ok().json(book_id),
            Err(err) => error_response(err),
        },
    )
}

#[api_v2_operation]
pub async fn delete_book(
    account_service: Data<AccountService>,
    book_admin_service: Data<BookAdminService>,
    path: web::Path<AccountBookPath>,
) -> Result<HttpResponse, Error> {
    let AccountBookPath {
        account_id,
        book_id,
    } = path.into_inner();
    if let Err(err) = account_service.require_admin(account_id).await {
        return Ok(error_response(err));
    }

    Ok(match book_admin_service.delete(book_id).await {
        Ok(book_id) => HttpResponse::Ok().json(book_id),
        Err(err) => error_response(err),
    })
}
