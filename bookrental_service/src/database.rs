pub use in_memory_database::InMemoryDatabase;
pub use postgres_database::{PostgresDatabase, PostgresDatabaseConfig};

mod in_memory_database;
mod postgres_database;
