//! Connection credentials, one variant per supported OAuth grant type.

use secrecy::SecretString;

/// OAuth grant type used against the Zoom token endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantType {
    /// Server-to-Server OAuth app (`account_credentials`).
    AccountCredentials,
    AuthorizationCode,
    RefreshToken,
    ClientCredentials,
    /// A caller-managed access token; no grant is ever performed.
    None,
}

impl GrantType {
    /// Get the `grant_type` value sent to the token endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            GrantType::AccountCredentials => "account_credentials",
            GrantType::AuthorizationCode => "authorization_code",
            GrantType::RefreshToken => "refresh_token",
            GrantType::ClientCredentials => "client_credentials",
            GrantType::None => "none",
        }
    }
}

/// Credentials a client connects with.
///
/// Exactly one variant is active per client; it is chosen at construction and
/// never changes afterwards. Tokens obtained from it live in the token cache.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Server-to-Server OAuth: every refresh is a fresh account-credentials exchange.
    ServerToServer {
        client_id: String,
        client_secret: SecretString,
        account_id: String,
    },
    /// User-authorized OAuth app, first exchange uses the authorization code.
    AuthorizationCode {
        client_id: String,
        client_secret: SecretString,
        authorization_code: SecretString,
        redirect_uri: String,
        /// PKCE verifier, when the authorization request carried a challenge.
        code_verifier: Option<SecretString>,
    },
    /// Previously authorized connection resumed from a stored refresh token.
    RefreshToken {
        client_id: String,
        client_secret: SecretString,
        refresh_token: SecretString,
        /// Access token issued alongside the refresh token, if still known.
        access_token: Option<SecretString>,
    },
    /// Client-credentials grant (chatbot style apps).
    ClientCredentials {
        client_id: String,
        client_secret: SecretString,
    },
    /// Pre-supplied access token with no refresh capability.
    AccessToken { access_token: SecretString },
}

impl Credentials {
    /// Server-to-Server OAuth credentials.
    pub fn server_to_server(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        account_id: impl Into<String>,
    ) -> Self {
        Credentials::ServerToServer {
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
            account_id: account_id.into(),
        }
    }

    /// Authorization-code credentials, optionally with a PKCE verifier.
    pub fn authorization_code(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        authorization_code: impl Into<String>,
        redirect_uri: impl Into<String>,
        code_verifier: Option<String>,
    ) -> Self {
        Credentials::AuthorizationCode {
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
            authorization_code: SecretString::from(authorization_code.into()),
            redirect_uri: redirect_uri.into(),
            code_verifier: code_verifier.map(SecretString::from),
        }
    }

    /// Refresh-token credentials, optionally with the last known access token.
    pub fn refresh_token(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
        access_token: Option<String>,
    ) -> Self {
        Credentials::RefreshToken {
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
            refresh_token: SecretString::from(refresh_token.into()),
            access_token: access_token.map(SecretString::from),
        }
    }

    /// Client-credentials grant.
    pub fn client_credentials(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Credentials::ClientCredentials {
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
        }
    }

    /// A caller-managed access token.
    pub fn access_token(access_token: impl Into<String>) -> Self {
        Credentials::AccessToken {
            access_token: SecretString::from(access_token.into()),
        }
    }

    /// Grant type used for the initial exchange.
    pub fn grant_type(&self) -> GrantType {
        match self {
            Credentials::ServerToServer { .. } => GrantType::AccountCredentials,
            Credentials::AuthorizationCode { .. } => GrantType::AuthorizationCode,
            Credentials::RefreshToken { .. } => GrantType::RefreshToken,
            Credentials::ClientCredentials { .. } => GrantType::ClientCredentials,
            Credentials::AccessToken { .. } => GrantType::None,
        }
    }

    /// OAuth client id and secret, when the variant has them.
    pub fn client(&self) -> Option<(&str, &SecretString)> {
        match self {
            Credentials::ServerToServer {
                client_id,
                client_secret,
                ..
            }
            | Credentials::AuthorizationCode {
                client_id,
                client_secret,
                ..
            }
            | Credentials::RefreshToken {
                client_id,
                client_secret,
                ..
            }
            | Credentials::ClientCredentials {
                client_id,
                client_secret,
            } => Some((client_id.as_str(), client_secret)),
            Credentials::AccessToken { .. } => None,
        }
    }

    /// Returns true if new access tokens can be obtained without the caller.
    pub fn can_refresh(&self) -> bool {
        !matches!(self, Credentials::AccessToken { .. })
    }
}
