//! Service configuration.

use serde::Deserialize;
use std::path::Path;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// PostgreSQL connection URL. Unset means orders are kept in memory.
    pub database_url: Option<String>,

    /// Public storefront URL, used for checkout redirects and product images.
    pub site_base_url: String,

    /// Stripe API key (optional).
    pub stripe_api_key: Option<String>,

    /// Stripe webhook signing secret (optional).
    pub stripe_webhook_secret: Option<String>,

    /// Stripe API base URL.
    pub stripe_api_base: String,

    /// Lower-case ISO code for checkout prices.
    pub store_currency: String,

    /// Countries the checkout collects shipping addresses for.
    pub shipping_countries: Vec<String>,

    /// Maximum age of a signed webhook, in seconds.
    pub webhook_tolerance_seconds: u64,

    /// Minimum days between today and a requested delivery date.
    pub min_delivery_lead_days: u32,

    /// Transactional email API key (optional).
    pub email_api_key: Option<String>,

    /// Transactional email API base URL.
    pub email_api_base: String,

    /// Sender for order emails.
    pub email_from: String,

    /// Recipient of new-order alerts (optional).
    pub business_email: Option<String>,

    /// Admin password (optional; admin endpoints are closed without it).
    pub admin_password: Option<String>,

    /// Secret for signing admin tokens (optional; admin endpoints are closed without it).
    pub admin_jwt_secret: Option<String>,

    /// Whether the admin cookie carries the `Secure` attribute.
    pub cookie_secure: bool,

    /// JSON product list to serve instead of the built-in catalog.
    pub catalog_path: Option<String>,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

/// Stripe secrets file structure.
#[derive(Debug, Deserialize)]
struct StripeSecrets {
    api_key: String,
    #[serde(default)]
    webhook_secret: Option<String>,
}

/// Email secrets file structure.
#[derive(Debug, Deserialize)]
struct EmailSecrets {
    api_key: String,
    #[serde(default)]
    business_email: Option<String>,
}

/// Admin secrets file structure.
#[derive(Debug, Deserialize)]
struct AdminSecrets {
    password: String,
    jwt_secret: String,
}

impl ServiceConfig {
    /// Load configuration from environment variables and secrets files.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let (stripe_api_key, stripe_webhook_secret) = load_stripe_secrets();
        let (email_api_key, business_email) = load_email_secrets();
        let (admin_password, admin_jwt_secret) = load_admin_secrets();

        Self {
            listen_addr: env_or("LISTEN_ADDR", defaults.listen_addr),
            database_url: env_opt("DATABASE_URL"),
            site_base_url: env_or("SITE_BASE_URL", defaults.site_base_url)
                .trim_end_matches('/')
                .to_string(),
            stripe_api_key,
            stripe_webhook_secret,
            stripe_api_base: env_or("STRIPE_API_BASE", defaults.stripe_api_base),
            store_currency: env_or("STORE_CURRENCY", defaults.store_currency).to_ascii_lowercase(),
            shipping_countries: env_list("SHIPPING_COUNTRIES")
                .map(|list| list.into_iter().map(|c| c.to_ascii_uppercase()).collect())
                .unwrap_or(defaults.shipping_countries),
            webhook_tolerance_seconds: env_parse("WEBHOOK_TOLERANCE_SECONDS")
                .unwrap_or(defaults.webhook_tolerance_seconds),
            min_delivery_lead_days: env_parse("MIN_DELIVERY_LEAD_DAYS")
                .unwrap_or(defaults.min_delivery_lead_days),
            email_api_key,
            email_api_base: env_or("EMAIL_API_BASE", defaults.email_api_base),
            email_from: env_or("EMAIL_FROM", defaults.email_from),
            business_email,
            admin_password,
            admin_jwt_secret,
            cookie_secure: env_parse("COOKIE_SECURE").unwrap_or(defaults.cookie_secure),
            catalog_path: env_opt("CATALOG_PATH"),
            cors_origins: env_list("CORS_ORIGINS").unwrap_or(defaults.cors_origins),
            max_body_bytes: env_parse("MAX_BODY_BYTES").unwrap_or(defaults.max_body_bytes),
            request_timeout_seconds: env_parse("REQUEST_TIMEOUT_SECONDS")
                .unwrap_or(defaults.request_timeout_seconds),
        }
    }

    /// Checkout success redirect. `{CHECKOUT_SESSION_ID}` is filled in by the provider.
    #[must_use]
    pub fn success_url(&self) -> String {
        format!("{}/success?session_id={{CHECKOUT_SESSION_ID}}", self.site_base_url)
    }

    /// Checkout cancel redirect.
    #[must_use]
    pub fn cancel_url(&self) -> String {
        format!("{}/cart", self.site_base_url)
    }

    /// Absolute URL for a product image. Absolute inputs are passed through.
    #[must_use]
    pub fn image_url(&self, image: &str) -> String {
        if image.starts_with("http://") || image.starts_with("https://") {
            image.to_string()
        } else if image.starts_with('/') {
            format!("{}{image}", self.site_base_url)
        } else {
            format!("{}/{image}", self.site_base_url)
        }
    }
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(name: &str, default: String) -> String {
    env_opt(name).unwrap_or(default)
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env_opt(name).and_then(|s| s.trim().parse().ok())
}

fn env_list(name: &str) -> Option<Vec<String>> {
    env_opt(name).map(|s| {
        s.split(',')
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect()
    })
}

const SECRET_DIRS: [&str; 3] = [".secrets", "justcakes/.secrets", "../.secrets"];

/// Load Stripe secrets from file or environment.
fn load_stripe_secrets() -> (Option<String>, Option<String>) {
    if let Some((path, secrets)) = find_secrets_file::<StripeSecrets>("stripe.json") {
        tracing::info!(path = %path, "Loaded Stripe secrets from file");
        return (Some(secrets.api_key), secrets.webhook_secret);
    }

    tracing::debug!("Stripe secrets file not found, using environment variables");
    (env_opt("STRIPE_API_KEY"), env_opt("STRIPE_WEBHOOK_SECRET"))
}

/// Load email secrets from file or environment.
fn load_email_secrets() -> (Option<String>, Option<String>) {
    if let Some((path, secrets)) = find_secrets_file::<EmailSecrets>("email.json") {
        tracing::info!(path = %path, "Loaded email secrets from file");
        return (
            Some(secrets.api_key),
            secrets.business_email.or_else(|| env_opt("BUSINESS_EMAIL")),
        );
    }

    tracing::debug!("Email secrets file not found, using environment variables");
    (env_opt("EMAIL_API_KEY"), env_opt("BUSINESS_EMAIL"))
}

/// Load admin credentials from file or environment.
fn load_admin_secrets() -> (Option<String>, Option<String>) {
    if let Some((path, secrets)) = find_secrets_file::<AdminSecrets>("admin.json") {
        tracing::info!(path = %path, "Loaded admin secrets from file");
        return (Some(secrets.password), Some(secrets.jwt_secret));
    }

    (env_opt("ADMIN_PASSWORD"), env_opt("ADMIN_JWT_SECRET"))
}

fn find_secrets_file<T: serde::de::DeserializeOwned>(file: &str) -> Option<(String, T)> {
    SECRET_DIRS.iter().find_map(|dir| {
        let path = format!("{dir}/{file}");
        load_secrets_file::<T>(&path).ok().map(|secrets| (path, secrets))
    })
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, std::io::Error> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            database_url: None,
            site_base_url: "http://localhost:3000".into(),
            stripe_api_key: None,
            stripe_webhook_secret: None,
            stripe_api_base: "https://api.stripe.com/v1".into(),
            store_currency: "usd".into(),
            shipping_countries: vec!["US".into(), "CA".into()],
            webhook_tolerance_seconds: 300,
            min_delivery_lead_days: 7,
            email_api_key: None,
            email_api_base: "https://api.resend.com".into(),
            email_from: "Just Cakes <orders@justcakes.com>".into(),
            business_email: None,
            admin_password: None,
            admin_jwt_secret: None,
            cookie_secure: false,
            catalog_path: None,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        }
    }
}
