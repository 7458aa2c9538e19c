use std::sync::Arc;

use chrono::Utc;

use crate::request::IntrospectionRequest;
use crate::types::{ClientId, ClientSecret, IntrospectionUrl, RawToken, SiteUrl};
use crate::AuthType;

///
/// Selects how the raw token string handed to [`IntrospectionClient::introspect_token`] is to be
/// treated.
///
/// The kind is fixed once when the client is configured; it is never inferred per token from the
/// string shape. A client configured for opaque tokens treats even JWT-shaped strings as opaque,
/// and a client configured for JWTs introspects a non-JWT-shaped string exactly as it would an
/// opaque one rather than failing fast. No cryptographic verification is performed either way;
/// signature checking is a concern for a JWT library, not for introspection.
///
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TokenKind {
    /// The token is expected to be a JWT: three dot-separated base64url segments.
    #[default]
    Jwt,
    /// The token is an opaque string of unspecified structure.
    Opaque,
}

///
/// Stores the configuration for an OAuth2 token introspection client.
///
/// The configuration (credentials, endpoint, authentication mode, token kind) is immutable once
/// built, so a client can be shared freely: introspection calls issued concurrently through the
/// same client are fully independent, and the client itself requires no locking. `Clone` yields
/// a cheap handle to the same configuration; every [`AccessToken`](crate::AccessToken) the
/// client issues holds such a handle so that it can re-introspect itself later.
///
#[derive(Clone, Debug)]
pub struct IntrospectionClient {
    pub client_id: ClientId,
    pub client_secret: Option<ClientSecret>,
    pub introspection_url: IntrospectionUrl,
    pub auth_type: AuthType,
    pub token_kind: TokenKind,
}

impl IntrospectionClient {
    ///
    /// Initializes a token introspection client.
    ///
    /// # Arguments
    ///
    /// * `client_id` - Client ID used to authenticate every introspection request.
    /// * `client_secret` - Optional client secret. A client secret is generally used for private
    ///   (server-side) OAuth2 clients and omitted from public (client-side or native app) OAuth2
    ///   clients (see [RFC 8252](https://tools.ietf.org/html/rfc8252)).
    /// * `introspection_url` - The authorization server's
    ///   [RFC 7662](https://tools.ietf.org/html/rfc7662) introspection endpoint.
    ///
    pub fn new(
        client_id: ClientId,
        client_secret: Option<ClientSecret>,
        introspection_url: IntrospectionUrl,
    ) -> Self {
        IntrospectionClient {
            client_id,
            client_secret,
            introspection_url,
            auth_type: AuthType::BasicAuth,
            token_kind: TokenKind::Jwt,
        }
    }

    ///
    /// Initializes a client from a base site URL and an introspection path, the way providers
    /// commonly document their endpoints (e.g. site `https://auth.example.com` and path
    /// `/oauth/introspect`). The two are concatenated textually and the result must parse as a
    /// valid URL.
    ///
    pub fn from_site(
        client_id: ClientId,
        client_secret: Option<ClientSecret>,
        site: &SiteUrl,
        introspection_path: &str,
    ) -> Result<Self, url::ParseError> {
        let introspection_url =
            IntrospectionUrl::new(format!("{}{}", site.trim_end_matches('/'), introspection_path))?;

        Ok(Self::new(client_id, client_secret, introspection_url))
    }

    ///
    /// Configures the type of client authentication used for communicating with the authorization
    /// server.
    ///
    /// The default is to use HTTP Basic authentication, as recommended in
    /// [Section 2.3.1 of RFC 6749](https://tools.ietf.org/html/rfc6749#section-2.3.1). Note that
    /// if a client secret is omitted (i.e., `client_secret` is set to `None` when calling
    /// [`IntrospectionClient::new`]), [`AuthType::RequestBody`] is used regardless of the
    /// `auth_type` passed to this function.
    ///
    pub fn set_auth_type(mut self, auth_type: AuthType) -> Self {
        self.auth_type = auth_type;

        self
    }

    ///
    /// Configures whether raw token strings handed to this client are expected to be JWTs or
    /// opaque. See [`TokenKind`]. The default is [`TokenKind::Jwt`].
    ///
    pub fn set_token_kind(mut self, token_kind: TokenKind) -> Self {
        self.token_kind = token_kind;

        self
    }

    ///
    /// Query the authorization server's [RFC 7662 compatible](https://tools.ietf.org/html/rfc7662)
    /// introspection endpoint to determine the set of metadata for a previously received token.
    ///
    /// Every call performs a fresh network round trip when the returned request is submitted;
    /// the client holds no token cache and does not deduplicate concurrent identical calls.
    ///
    pub fn introspect_token<'a>(&'a self, token: &'a RawToken) -> IntrospectionRequest<'a> {
        IntrospectionRequest {
            token,
            token_type_hint: None,
            extra_params: Vec::new(),
            client: self,
            time_fn: Arc::new(Utc::now),
        }
    }
}
