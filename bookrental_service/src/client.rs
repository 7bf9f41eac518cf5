use anyhow::Context;
use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::RetryTransientMiddleware;
use reqwest_tracing::TracingMiddleware;
use serde::de::DeserializeOwned;

use crate::api::{
    AccountId, AccountSummary, Book, BookId, BookPatch, BookWithRental, ErrorResponse,
    LoginRequest, Rental,
};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Request rejected with status {status}: {message}")]
    Rejected { status: StatusCode, message: String },

    #[error("Request failed {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    #[error("Invalid response {0}")]
    Response(#[from] reqwest::Error),
}

impl ClientError {
    /// Status code of a rejected request, None for transport failures
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

async fn rejected(response: reqwest::Response) -> ClientError {
    let status = response.status();
    let message = response
        .json::<ErrorResponse>()
        .await
        .map(|body| body.error)
        .unwrap_or_default();
    ClientError::Rejected { status, message }
}

async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    if response.status().is_success() {
        Ok(response.json().await?)
    } else {
        Err(rejected(response).await)
    }
}

pub struct BookRentalClient {
    url: String,
    client: ClientWithMiddleware,
}

impl BookRentalClient {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        let reqwest_client = reqwest::Client::builder()
            .build()
            .context("Failed to build reqwest client")?;
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(2);
        let client = ClientBuilder::new(reqwest_client)
            // Insert the tracing middleware
            .with(TracingMiddleware::default())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            url: url.to_string(),
            client,
        })
    }

    /// Calls POST /api/login endpoint
    pub async fn login(&self, email: &str, password: &str) -> Result<AccountSummary, ClientError> {
        let response = self
            .client
            .post(format!("{}/api/login", self.url))
            .json(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        parse_json(response).await
    }

    /// Calls GET /api/books endpoint
    pub async fn list_books(&self) -> Result<Vec<BookWithRental>, ClientError> {
        let response = self
            .client
            .get(format!("{}/api/books", self.url))
            .send()
            .await?;
        parse_json(response).await
    }

    /// Calls GET /api/book/{book_id} endpoint
    /// Returns None if the book is not in the catalog
    pub async fn get_book(&self, book_id: BookId) -> Result<Option<BookWithRental>, ClientError> {
        let response = self
            .client
            .get(format!("{}/api/book/{}", self.url, book_id))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            Ok(None)
        } else {
            parse_json(response).await.map(Some)
        }
    }

    /// Calls GET /api/account/{account_id}/rentals endpoint
    pub async fn list_rentals(&self, account_id: AccountId) -> Result<Vec<Rental>, ClientError> {
        let response = self
            .client
            .get(format!("{}/api/account/{}/rentals", self.url, account_id))
            .send()
            .await?;
        parse_json(response).await
    }

    /// Calls POST /api/account/{account_id}/rental/{book_id} endpoint
    pub async fn start_rental(
        &self,
        account_id: AccountId,
        book_id: BookId,
    ) -> Result<Rental, ClientError> {
        let response = self
            .client
            .post(format!(
                "{}/api/account/{}/rental/{}",
                self.url, account_id, book_id
            ))
            .send()
            .await?;
        parse_json(response).await
    }

    /// Calls DELETE /api/account/{account_id}/rental/{book_id} endpoint
    pub async fn end_rental(&self, account_id: AccountId, book_id: BookId) -> Result<(), ClientError> {
        let response = self
            .client
            .delete(format!(
                "{}/api/account/{}/rental/{}",
                self.url, account_id, book_id
            ))
            .send()
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(rejected(response).await)
        }
    }

    /// Calls POST /api/admin/{account_id}/book endpoint
    pub async fn register_book(&self, admin_id: AccountId, book: &Book) -> Result<Book, ClientError> {
        let response = self
            .client
            .post(format!("{}/api/admin/{}/book", self.url, admin_id))
            .json(book)
            .send()
            .await?;
        parse_json(response).await
    }

    /// Calls PATCH /api/admin/{account_id}/book/{book_id} endpoint
    pub async fn update_book(
        &self,
        admin_id: AccountId,
        book_id: BookId,
        patch: &BookPatch,
    ) -> Result<BookId, ClientError> {
        let response = self
            .client
            .patch(format!("{}/api/admin/{}/book/{}", self.url, admin_id, book_id))
            .json(patch)
            .send()
            .await?;
        parse_json(response).await
    }

    /// Calls DELETE /api/admin/{account_id}/book/{book_id} endpoint
    pub async fn delete_book(&self, admin_id: AccountId, book_id: BookId) -> Result<BookId, ClientError> {
        let response = self
            .client
            .delete(format!("{}/api/admin/{}/book/{}", self.url, admin_id, book_id))
            .send()
            .await?;
        parse_json(response).await
    }
}
