pub mod domain;
pub mod service;
pub mod storage;

pub mod config {
    use anyhow::Context;
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum StoreBackend {
        Postgres,
        Memory,
    }

    impl FromStr for StoreBackend {
        type Err = anyhow::Error;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s.trim().to_ascii_lowercase().as_str() {
                "postgres" => Ok(Self::Postgres),
                "memory" => Ok(Self::Memory),
                other => anyhow::bail!("unknown SUBMISSION_STORE: {other}"),
            }
        }
    }

    /// Connection settings for the submission store. Built once at startup and
    /// handed to the storage layer.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct DatabaseSettings {
        pub database_url: Option<String>,
        pub host: String,
        pub port: u16,
        pub user: String,
        pub password: String,
        pub name: String,
        pub max_connections: u32,
    }

    impl DatabaseSettings {
        /// `DATABASE_URL` wins over the individual parts.
        pub fn url(&self) -> String {
            match &self.database_url {
                Some(url) => url.clone(),
                None => format!(
                    "postgres://{}:{}@{}:{}/{}",
                    self.user, self.password, self.host, self.port, self.name
                ),
            }
        }

        pub fn redacted_url(&self) -> String {
            match &self.database_url {
                Some(_) => "DATABASE_URL".to_string(),
                None => format!(
                    "postgres://{}@{}:{}/{}",
                    self.user, self.host, self.port, self.name
                ),
            }
        }
    }

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub database: DatabaseSettings,
        pub port: u16,
        pub cors_allow_origin: Option<String>,
        pub submission_store: StoreBackend,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_lookup(|key| std::env::var(key).ok())
        }

        pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
            let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
            let text = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

            Ok(Self {
                database: DatabaseSettings {
                    database_url: var("DATABASE_URL"),
                    host: text("DB_HOST", "localhost"),
                    port: parse_or(var("DB_PORT"), "DB_PORT", 5432)?,
                    user: text("DB_USER", "postgres"),
                    password: text("DB_PASSWORD", "postgres"),
                    name: text("DB_NAME", "insurance_db"),
                    max_connections: parse_or(var("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", 5)?,
                },
                port: parse_or(var("PORT"), "PORT", 3000)?,
                cors_allow_origin: var("CORS_ALLOW_ORIGIN"),
                submission_store: parse_or(
                    var("SUBMISSION_STORE"),
                    "SUBMISSION_STORE",
                    StoreBackend::Postgres,
                )?,
                sentry_dsn: var("SENTRY_DSN"),
            })
        }
    }

    fn parse_or<T>(value: Option<String>, key: &str, default: T) -> anyhow::Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match value {
            Some(v) => v
                .trim()
                .parse::<T>()
                .map_err(|e| anyhow::anyhow!("{e}"))
                .with_context(|| format!("invalid {key}: {v}")),
            None => Ok(default),
        }
    }

}
