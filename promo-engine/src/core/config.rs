use std::path::PathBuf;

/// Engine configuration
///
/// # Environment variables
///
/// Every setting can be overridden through the environment:
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | /var/lib/atelier/promo | Working directory (database, logs) |
/// | SHIPPING_FEE | 5.90 | Flat shipping fee credited by free-shipping promotions |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | LOG_LEVEL | info | tracing level filter |
/// | LOG_DIR | (unset) | Daily-rolling log file directory; stderr only when unset |
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for the database and log files
    pub work_dir: String,
    /// Flat shipping fee. Free-shipping promotions discount this amount.
    /// Supplied by configuration, never stored on a promotion.
    pub shipping_fee: f64,
    /// Running environment: development | staging | production
    pub environment: String,
    /// Log level filter
    pub log_level: String,
    /// Optional log file directory
    pub log_dir: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset variables fall back to defaults
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR")
                .unwrap_or_else(|_| "/var/lib/atelier/promo".into()),
            shipping_fee: std::env::var("SHIPPING_FEE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5.90),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
        }
    }

    /// Override selected settings
    ///
    /// Commonly used in tests
    pub fn with_overrides(work_dir: impl Into<String>, shipping_fee: f64) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.shipping_fee = shipping_fee;
        config
    }

    /// Database file path: `work_dir`/database/promo.db
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database").join("promo.db")
    }

    /// Whether running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Whether running in development
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
