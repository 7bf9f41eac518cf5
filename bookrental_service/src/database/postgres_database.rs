use anyhow::Context;
use tokio_postgres::{Client, NoTls};

pub struct PostgresDatabaseConfig {
    pub hostname: String,
    pub username: String,
    pub password: String,
}

/// Connection shared by the postgres repositories
pub struct PostgresDatabase {
    pub(crate) client: Client,
}

impl PostgresDatabase {
    pub async fn init(config: PostgresDatabaseConfig) -> anyhow::Result<Self> {
        let connection_str = format!(
            "postgresql://{}:{}@{}",
            config.username, config.password, config.hostname
        );
        tracing::info!(hostname = %config.hostname, "Connecting to postgres");
        let (client, connection) = tokio_postgres::connect(&connection_str, NoTls)
            .await
            .context("Failed to start postgres")?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("Postgres connection error: {}", e);
            }
        });

        client
            .batch_execute(
                "
        CREATE TABLE IF NOT EXISTS account (
            id              SERIAL PRIMARY KEY,
            email           VARCHAR(255) NOT NULL UNIQUE,
            password        VARCHAR(255) NOT NULL,
            name            VARCHAR(255) NOT NULL,
            role_type       VARCHAR(16) NOT NULL
            )
        ",
            )
            .await
            .context("Failed to setup account table")?;

        client
            .batch_execute(
                "
        CREATE TABLE IF NOT EXISTS book (
            id              INTEGER PRIMARY KEY,
            title           VARCHAR(255) NOT NULL,
            author          VARCHAR(255) NOT NULL,
            release_date    DATE NOT NULL
            )
        ",
            )
            .await
            .context("Failed to setup book table")?;

        client
            .batch_execute(
                "
        CREATE TABLE IF NOT EXISTS rental (
            book_id         INTEGER PRIMARY KEY REFERENCES book (id) ON DELETE CASCADE,
            account_id      INTEGER NOT NULL REFERENCES account (id),
            rental_datetime TIMESTAMP NOT NULL,
            return_deadline TIMESTAMP NOT NULL
            )
        ",
            )
            .await
            .context("Failed to setup rental table")?;

        Ok(Self { client })
    }
}
