/// Currencies every new user starts with
pub const STARTER_CURRENCIES: [&str; 3] = ["USD", "EUR", "CNY"];

/// Currency of the welcome grant wallet
pub const WELCOME_GRANT_CURRENCY: &str = "USD";

/// Description recorded on welcome grant transactions
pub const WELCOME_GRANT_DESCRIPTION: &str = "welcome";

/// Description recorded on commission transactions
pub const COMMISSION_DESCRIPTION: &str = "commission";

/// Default external rate source endpoint
pub const DEFAULT_RATE_API_URL: &str = "https://api.ratesapi.io/api/latest";

/// Maximum attempts against the external rate source
pub const RATE_FETCH_ATTEMPTS: u32 = 5;

/// Base delay between rate fetch attempts, doubled on each retry
pub const RATE_FETCH_BACKOFF_MS: u64 = 300;

/// Per-request timeout for the external rate source
pub const RATE_FETCH_TIMEOUT_SECS: u64 = 10;
