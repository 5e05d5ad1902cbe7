use base64::engine::general_purpose::STANDARD as b64;
use base64::Engine;
use once_cell::sync::Lazy;
use std::time::Duration;
use zeroize::Zeroize;

pub static CONF: Lazy<Config> = Lazy::new(|| match Config::from_env() {
    Ok(conf) => conf,
    Err(e) => {
        eprintln!("CONFIGURATION ERROR: {e}");
        std::process::exit(1);
    }
});

const DATABASE_URI_VAR: &str = "LINGO_DATABASE_URI";
const DB_MAX_CONNECTIONS_VAR: &str = "LINGO_DB_MAX_CONNECTIONS";

const TOKEN_SIGNING_KEY_VAR: &str = "LINGO_TOKEN_SIGNING_KEY_B64";
const PASSWORD_HASHING_KEY_VAR: &str = "LINGO_PASSWORD_HASHING_KEY_B64";
const CHAT_PROVIDER_SECRET_VAR: &str = "LINGO_CHAT_PROVIDER_SECRET_B64";

const HASH_LENGTH_VAR: &str = "LINGO_HASH_LENGTH";
const HASH_ITERATIONS_VAR: &str = "LINGO_HASH_ITERATIONS";
const HASH_MEM_COST_KIB_VAR: &str = "LINGO_HASH_MEM_COST_KIB";
const HASH_THREADS_VAR: &str = "LINGO_HASH_THREADS";
const HASH_SALT_LENGTH_VAR: &str = "LINGO_HASH_SALT_LENGTH";

const SESSION_LIFETIME_DAYS_VAR: &str = "LINGO_SESSION_LIFETIME_DAYS";
const CHAT_TOKEN_LIFETIME_HOURS_VAR: &str = "LINGO_CHAT_TOKEN_LIFETIME_HOURS";
const ACCEPTED_WINDOW_DAYS_VAR: &str = "LINGO_ACCEPTED_WINDOW_DAYS";

const CORS_ALLOWED_ORIGINS_VAR: &str = "LINGO_CORS_ALLOWED_ORIGINS";
const ACTIX_WORKER_COUNT_VAR: &str = "LINGO_ACTIX_WORKER_COUNT";
const SECURE_SESSION_COOKIE_VAR: &str = "LINGO_SECURE_SESSION_COOKIE";

const TOKEN_SIGNING_KEY_SIZE: usize = 64;
const PASSWORD_HASHING_KEY_SIZE: usize = 32;

#[derive(Zeroize)]
pub struct Keys {
    pub token_signing_key: [u8; TOKEN_SIGNING_KEY_SIZE],
    pub password_hashing_key: [u8; PASSWORD_HASHING_KEY_SIZE],
    pub chat_provider_secret: Vec<u8>,
}

impl Drop for Keys {
    fn drop(&mut self) {
        self.zeroize();
    }
}

pub struct Hashing {
    pub hash_length: u32,
    pub hash_iterations: u32,
    pub hash_mem_cost_kib: u32,
    pub hash_threads: u32,
    pub hash_salt_length: u32,
}

pub struct Lifetimes {
    pub session_token_lifetime: Duration,
    pub chat_token_lifetime: Duration,
    pub accepted_window: Duration,
}

pub struct Config {
    pub database_uri: String,
    pub db_max_connections: Option<u32>,

    pub keys: Keys,
    pub hashing: Hashing,
    pub lifetimes: Lifetimes,

    pub cors_allowed_origins: Vec<String>,
    pub actix_worker_count: Option<usize>,
    pub secure_session_cookie: bool,
}

impl Config {
    fn from_env() -> Result<Config, String> {
        let database_uri = required_var(DATABASE_URI_VAR)?;

        let token_signing_key =
            decode_key::<TOKEN_SIGNING_KEY_SIZE>(TOKEN_SIGNING_KEY_VAR)?;
        let password_hashing_key =
            decode_key::<PASSWORD_HASHING_KEY_SIZE>(PASSWORD_HASHING_KEY_VAR)?;

        let chat_provider_secret = b64
            .decode(required_var(CHAT_PROVIDER_SECRET_VAR)?)
            .map_err(|e| format!("Failed to base64 decode {CHAT_PROVIDER_SECRET_VAR}: {e}"))?;

        if chat_provider_secret.is_empty() {
            return Err(format!("{CHAT_PROVIDER_SECRET_VAR} must not be empty"));
        }

        Ok(Config {
            database_uri,
            db_max_connections: optional_var(DB_MAX_CONNECTIONS_VAR)?,

            keys: Keys {
                token_signing_key,
                password_hashing_key,
                chat_provider_secret,
            },

            hashing: Hashing {
                hash_length: var_or(HASH_LENGTH_VAR, 32)?,
                hash_iterations: var_or(HASH_ITERATIONS_VAR, 18)?,
                hash_mem_cost_kib: var_or(HASH_MEM_COST_KIB_VAR, 62500)?,
                hash_threads: var_or(HASH_THREADS_VAR, 2)?,
                hash_salt_length: var_or(HASH_SALT_LENGTH_VAR, 16)?,
            },

            lifetimes: Lifetimes {
                session_token_lifetime: Duration::from_secs(
                    var_or(SESSION_LIFETIME_DAYS_VAR, 7u64)? * 24 * 60 * 60,
                ),
                chat_token_lifetime: Duration::from_secs(
                    var_or(CHAT_TOKEN_LIFETIME_HOURS_VAR, 24u64)? * 60 * 60,
                ),
                accepted_window: Duration::from_secs(
                    var_or(ACCEPTED_WINDOW_DAYS_VAR, 7u64)? * 24 * 60 * 60,
                ),
            },

            cors_allowed_origins: std::env::var(CORS_ALLOWED_ORIGINS_VAR)
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|origin| origin.trim().to_string())
                        .filter(|origin| !origin.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            actix_worker_count: optional_var(ACTIX_WORKER_COUNT_VAR)?,
            secure_session_cookie: var_or(SECURE_SESSION_COOKIE_VAR, false)?,
        })
    }
}

fn required_var(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Environment variable {key} must be set"))
}

fn optional_var<T: std::str::FromStr>(key: &str) -> Result<Option<T>, String> {
    match std::env::var(key) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_| format!("Environment variable {key} has an invalid value")),
        Err(_) => Ok(None),
    }
}

fn var_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, String> {
    Ok(optional_var(key)?.unwrap_or(default))
}

fn decode_key<const SIZE: usize>(key_var: &str) -> Result<[u8; SIZE], String> {
    let key = b64
        .decode(required_var(key_var)?)
        .map_err(|e| format!("Failed to base64 decode {key_var}: {e}"))?;

    key.try_into()
        .map_err(|_| format!("{key_var} must have a size of {SIZE} bytes"))
}

// Forego lazy initialization so a bad configuration fails at startup
pub fn initialize() {
    Lazy::force(&CONF);
}
