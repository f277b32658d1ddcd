use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::fmt;
use std::time::Duration;
use zoom_api::pipeline::{DEFAULT_API_BASE_URL, DEFAULT_EXPIRED_TOKEN_PATTERN};
use zoom_api::{ClientOptions, Credentials, DEFAULT_TOKEN_URL};

/// Errors raised when the configuration can't produce usable credentials.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A required setting was not provided on the command line or in the environment.
    Missing(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(name) => write!(f, "Missing required setting: {}", name),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// The OAuth client ID of the Zoom app.
    #[arg(long, env)]
    zoom_client_id: Option<String>,

    /// The OAuth client secret of the Zoom app.
    #[arg(long, env)]
    zoom_client_secret: Option<String>,

    /// Account ID of a Server-to-Server OAuth app. Selects the account credentials grant.
    #[arg(long, env)]
    zoom_account_id: Option<String>,

    /// Authorization code from the user consent redirect.
    #[arg(long, env)]
    zoom_authorization_code: Option<String>,

    /// Redirect URI registered with the app, required with an authorization code.
    #[arg(long, env)]
    zoom_redirect_uri: Option<String>,

    /// A previously issued refresh token to resume a user-authorized connection.
    #[arg(long, env)]
    zoom_refresh_token: Option<String>,

    /// A pre-issued access token. Without a client ID it is used as-is and never refreshed.
    #[arg(long, env)]
    zoom_access_token: Option<String>,

    /// Base URL of the Zoom REST API.
    /// Override in tests to point at a mock server.
    #[arg(long, env, default_value = DEFAULT_API_BASE_URL)]
    pub zoom_api_base_url: String,

    /// URL of the Zoom OAuth token endpoint.
    #[arg(long, env, default_value = DEFAULT_TOKEN_URL)]
    pub zoom_token_url: String,

    /// Timeout in seconds applied to each HTTP call, retries included
    #[arg(long, env, default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Maximum retries for network errors, 5xx and 429 responses
    #[arg(long, env, default_value_t = 3)]
    pub max_transient_retries: u32,

    /// Regular expression matched against 401 error messages to detect an expired access token
    #[arg(long, env, default_value = DEFAULT_EXPIRED_TOKEN_PATTERN)]
    pub expired_token_pattern: String,

    /// Number of users to fetch per page
    #[arg(long, env, default_value_t = 30)]
    pub page_size: u32,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    /// Select the credential variant from the populated settings.
    ///
    /// Precedence: a bare access token, then Server-to-Server (account ID),
    /// then a stored refresh token, then an authorization code, and finally the
    /// client credentials grant.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        if let (Some(access_token), None) = (&self.zoom_access_token, &self.zoom_client_id) {
            return Ok(Credentials::access_token(access_token.clone()));
        }

        let client_id = self
            .zoom_client_id
            .clone()
            .ok_or(ConfigError::Missing("zoom_client_id"))?;
        let client_secret = self
            .zoom_client_secret
            .clone()
            .ok_or(ConfigError::Missing("zoom_client_secret"))?;

        if let Some(account_id) = &self.zoom_account_id {
            return Ok(Credentials::server_to_server(
                client_id,
                client_secret,
                account_id.clone(),
            ));
        }

        if let Some(refresh_token) = &self.zoom_refresh_token {
            return Ok(Credentials::refresh_token(
                client_id,
                client_secret,
                refresh_token.clone(),
                self.zoom_access_token.clone(),
            ));
        }

        if let Some(code) = &self.zoom_authorization_code {
            let redirect_uri = self
                .zoom_redirect_uri
                .clone()
                .ok_or(ConfigError::Missing("zoom_redirect_uri"))?;
            return Ok(Credentials::authorization_code(
                client_id,
                client_secret,
                code.clone(),
                redirect_uri,
                None,
            ));
        }

        Ok(Credentials::client_credentials(client_id, client_secret))
    }

    /// Client options derived from this configuration.
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions::new()
            .with_api_base_url(self.zoom_api_base_url.clone())
            .with_token_url(self.zoom_token_url.clone())
            .with_timeout(Duration::from_secs(self.request_timeout_secs))
            .with_max_transient_retries(self.max_transient_retries)
            .with_expired_token_pattern(self.expired_token_pattern.clone())
    }
}
