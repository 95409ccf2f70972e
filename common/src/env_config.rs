use std::{env, str::FromStr, sync::Arc, time::Duration};

use crate::retry::RetryPolicy;

#[derive(Clone, Debug)]
/// Configuration struct for the server.
///
/// This struct holds all the necessary configuration parameters
/// required to initialize and run the server: storage connection details,
/// server host and port, number of worker threads, CORS settings,
/// logging preferences and the retry policy used for developer inserts.
pub struct Config {
    // environment
    pub environment: String, // development, testing or production
    /// The URL of the database to connect to. Without one the server keeps
    /// developers in memory.
    pub database_url: Option<String>,
    /// The hostname or IP address the server will bind to.
    pub server_host: String,
    /// The port number the server will listen on.
    pub server_port: u16,
    /// The number of worker threads to spawn for handling requests.
    pub num_workers: usize,
    /// The allowed origin for CORS (Cross-Origin Resource Sharing).
    pub cors_allowed_origin: String,
    /// A boolean indicating whether console logging is enabled.
    pub console_logging_enabled: bool,
    /// File the logger appends to.
    pub log_file: String,
    /// Names handed out to new developers as their integration engineer.
    pub integration_engineers: Vec<String>,
    /// Backoff applied when inserting a new developer.
    pub insert_retry: RetryPolicy,
}

impl Config {
    /// Creates a new `Config` instance from environment variables.
    ///
    /// # Environment Variables
    ///
    /// All optional (with defaults):
    /// - `ENVIRONMENT`: "development", "testing" or "production" (default: "development")
    /// - `DATABASE_URL`: Postgres connection string (default: none, in-memory store)
    /// - `IP`: Server host (default: "127.0.0.1")
    /// - `PORT`: Server port (default: 4000)
    /// - `WORKERS`: Number of worker threads (default: 4)
    /// - `CORS_ALLOWED_ORIGIN`: Allowed CORS origin (default: "*")
    /// - `ENABLE_CONSOLE_LOGGING`: Whether to enable console logging (default: true)
    /// - `LOG_FILE`: Log file path (default: "broome.log")
    /// - `INTEGRATION_ENGINEERS`: Comma-separated names (default: empty)
    /// - `INSERT_RETRY_MAX_ATTEMPTS`: Insert attempts before giving up (default: 5)
    /// - `INSERT_RETRY_INITIAL_MS`: First backoff delay in milliseconds (default: 100)
    /// - `INSERT_RETRY_MAX_MS`: Backoff delay cap in milliseconds (default: 2000)
    ///
    /// Values that fail to parse fall back to their defaults.
    pub fn from_env() -> Arc<Self> {
        dotenvy::dotenv().ok();

        let retry_defaults = RetryPolicy::default();

        Arc::new(Config {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            server_host: env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: parse_var("PORT", 4000),
            num_workers: parse_var("WORKERS", 4),
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "*".to_string()),
            console_logging_enabled: env::var("ENABLE_CONSOLE_LOGGING")
                .unwrap_or_else(|_| "true".to_string())
                .to_lowercase()
                == "true",
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "broome.log".to_string()),
            integration_engineers: split_list(
                &env::var("INTEGRATION_ENGINEERS").unwrap_or_default(),
            ),
            insert_retry: RetryPolicy {
                max_attempts: parse_var("INSERT_RETRY_MAX_ATTEMPTS", retry_defaults.max_attempts),
                initial_delay: Duration::from_millis(parse_var(
                    "INSERT_RETRY_INITIAL_MS",
                    retry_defaults.initial_delay.as_millis() as u64,
                )),
                max_delay: Duration::from_millis(parse_var(
                    "INSERT_RETRY_MAX_MS",
                    retry_defaults.max_delay.as_millis() as u64,
                )),
            },
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
