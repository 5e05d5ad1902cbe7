use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use std::fmt;

pub mod friendship;
pub mod user;

pub type DbThreadPool = diesel::r2d2::Pool<ConnectionManager<PgConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<PgConnection>>;

pub fn create_db_thread_pool(database_uri: &str, max_db_connections: u32) -> DbThreadPool {
    let connection_manager = ConnectionManager::<PgConnection>::new(database_uri);
    diesel::r2d2::Pool::builder()
        .max_size(max_db_connections)
        .build(connection_manager)
        .expect("Failed to create DB thread pool")
}

#[derive(Debug)]
pub enum DaoError {
    DbThreadPoolFailure(r2d2::Error),
    QueryFailure(diesel::result::Error),
    CannotRunQuery(&'static str),
    WontRunQuery, // This error indicates that the DAO refuses to run a query
    NotPermitted, // The acting user is not allowed to perform the mutation
}

impl std::error::Error for DaoError {}

impl fmt::Display for DaoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DaoError::DbThreadPoolFailure(e) => {
                write!(f, "DaoError: Failed to obtain DB connection: {e}")
            }
            DaoError::QueryFailure(e) => {
                write!(f, "DaoError: Query failed: {e}")
            }
            DaoError::CannotRunQuery(msg) => {
                write!(f, "DaoError: Cannot run query: {msg}")
            }
            DaoError::WontRunQuery => {
                write!(f, "DaoError: DAO will not run query")
            }
            DaoError::NotPermitted => {
                write!(f, "DaoError: Acting user may not run query")
            }
        }
    }
}

impl From<r2d2::Error> for DaoError {
    fn from(error: r2d2::Error) -> Self {
        DaoError::DbThreadPoolFailure(error)
    }
}

impl From<diesel::result::Error> for DaoError {
    fn from(error: diesel::result::Error) -> Self {
        DaoError::QueryFailure(error)
    }
}

#[cfg(test)]
pub mod test_utils {
    use once_cell::sync::Lazy;
    use uuid::Uuid;

    use super::{create_db_thread_pool, user, DbThreadPool};
    use crate::request_io::InputNewUser;

    const DATABASE_URI_VAR: &str = "LINGO_DATABASE_URI";
    const MAX_CONNECTIONS_VAR: &str = "LINGO_DB_MAX_CONNECTIONS";

    pub static DB_THREAD_POOL: Lazy<DbThreadPool> = Lazy::new(|| {
        let database_uri = std::env::var(DATABASE_URI_VAR)
            .unwrap_or_else(|_| panic!("Environment variable {DATABASE_URI_VAR} must be set"));

        let max_connections = std::env::var(MAX_CONNECTIONS_VAR)
            .ok()
            .and_then(|count| count.parse().ok())
            .unwrap_or(48u32);

        create_db_thread_pool(&database_uri, max_connections)
    });

    pub fn db_thread_pool() -> &'static DbThreadPool {
        &DB_THREAD_POOL
    }

    pub fn unique_email() -> String {
        format!("dao-test-{}@lingo.test", rand::random::<u128>())
    }

    pub struct TestUser {
        pub id: Uuid,
        pub email: String,
    }

    /// Inserts an onboarded user with throwaway profile data.
    pub fn create_test_user(user_dao: &user::Dao) -> TestUser {
        let email = unique_email();

        let input = InputNewUser {
            full_name: String::from("Test User"),
            email: email.clone(),
            password: String::from("correct-horse-battery"),
        };

        let user = user_dao
            .create_user(&input, "test_password_hash", "https://avatars.lingo.test/1.png")
            .expect("Failed to create test user");

        user_dao
            .update_onboarding(
                user.id,
                &crate::request_io::InputOnboarding {
                    full_name: String::from("Test User"),
                    bio: String::from("Hello"),
                    native_language: String::from("English"),
                    learning_language: String::from("Spanish"),
                    location: String::from("Testville"),
                },
            )
            .expect("Failed to onboard test user");

        TestUser { id: user.id, email }
    }
}
