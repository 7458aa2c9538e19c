//!
//! An extensible, strongly-typed client for OAuth2 token introspection
//! ([RFC 7662](https://tools.ietf.org/html/rfc7662)), tolerant of authorization servers whose
//! response shapes diverge from the RFC (e.g. Google-style `tokeninfo` payloads and minimal
//! Keycloak payloads).
//!
//! # Contents
//! * [Importing `oauth2-introspection`: selecting an HTTP client interface](#importing-oauth2-introspection-selecting-an-http-client-interface)
//! * [Getting started: introspecting a token](#getting-started-introspecting-a-token)
//!   * [Example: Synchronous (blocking) API](#example-synchronous-blocking-api)
//!   * [Example: Asynchronous API](#example-asynchronous-api)
//! * [Working with the returned token](#working-with-the-returned-token)
//!
//! # Importing `oauth2-introspection`: selecting an HTTP client interface
//!
//! This library offers a flexible HTTP client interface with two modes:
//!  * **Synchronous (blocking)**
//!  * **Asynchronous**
//!
//! For the HTTP client modes described above, the following HTTP client implementations can be
//! used:
//!  * **[`reqwest`]**
//!
//!    The `reqwest` HTTP client supports both the synchronous and asynchronous modes and is
//!    enabled by default.
//!
//!    Synchronous client: [`reqwest::http_client`]
//!
//!    Asynchronous client: [`reqwest::async_http_client`]
//!
//!  * **Custom**
//!
//!    In addition to the clients above, users may define their own HTTP clients, which must
//!    accept an [`HttpRequest`] and return an [`HttpResponse`] or error. Users writing their own
//!    clients may wish to disable the default `reqwest` dependency by specifying
//!    `default-features = false` in `Cargo.toml` (replacing `...` with the desired version of
//!    this crate):
//!    ```toml
//!    oauth2-introspection = { version = "...", default-features = false }
//!    ```
//!
//!    Synchronous HTTP clients should implement the following trait:
//!    ```rust,ignore
//!    FnOnce(HttpRequest) -> Result<HttpResponse, RE>
//!    where RE: std::error::Error + 'static
//!    ```
//!
//!    Asynchronous HTTP clients should implement the following trait:
//!    ```rust,ignore
//!    FnOnce(HttpRequest) -> F
//!    where
//!      F: Future<Output = Result<HttpResponse, RE>>,
//!      RE: std::error::Error + 'static
//!    ```
//!
//! # Getting started: introspecting a token
//!
//! Introspection submits a previously-received token to the authorization server's introspection
//! endpoint and returns an [`AccessToken`] carrying the server's verdict as an open
//! [`Principal`] claims map.
//!
//! ## Example: Synchronous (blocking) API
//!
//! This example works with the crate's default feature flags, which include `reqwest`.
//!
//! ```rust,no_run
//! use oauth2_introspection::{
//!     ClientId,
//!     ClientSecret,
//!     IntrospectionClient,
//!     IntrospectionUrl,
//!     RawToken,
//! };
//! # #[cfg(feature = "reqwest")]
//! use oauth2_introspection::reqwest::http_client;
//!
//! # #[cfg(feature = "reqwest")]
//! # fn err_wrapper() -> Result<(), Box<dyn std::error::Error>> {
//! let client = IntrospectionClient::new(
//!     ClientId::new("client-id".to_string()),
//!     Some(ClientSecret::new("client-secret".to_string())),
//!     IntrospectionUrl::new("https://auth.example.com/oauth/introspect".to_string())?,
//! );
//!
//! let token = client
//!     .introspect_token(&RawToken::new("mF_9.B5f-4.1JqM".to_string()))
//!     .set_token_type_hint("access_token")
//!     .request(http_client)?;
//!
//! if token.is_authorized("profile") {
//!     // the server granted the `profile` scope to this token
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Example: Asynchronous API
//!
//! The example below uses async/await:
//!
//! ```rust,no_run
//! use oauth2_introspection::{
//!     ClientId,
//!     ClientSecret,
//!     IntrospectionClient,
//!     IntrospectionUrl,
//!     RawToken,
//! };
//! # #[cfg(feature = "reqwest")]
//! use oauth2_introspection::reqwest::async_http_client;
//!
//! # #[cfg(feature = "reqwest")]
//! # async fn err_wrapper() -> Result<(), Box<dyn std::error::Error>> {
//! let client = IntrospectionClient::new(
//!     ClientId::new("client-id".to_string()),
//!     Some(ClientSecret::new("client-secret".to_string())),
//!     IntrospectionUrl::new("https://auth.example.com/oauth/introspect".to_string())?,
//! );
//!
//! let mut token = client
//!     .introspect_token(&RawToken::new("mF_9.B5f-4.1JqM".to_string()))
//!     .request_async(async_http_client)
//!     .await?;
//!
//! // Later, refresh the server's verdict in place.
//! token.introspect_async(async_http_client).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Working with the returned token
//!
//! The [`Principal`] held by an [`AccessToken`] deliberately preserves every field the server
//! returned under its original name, whichever of the known response shapes the server speaks.
//! Two derived fields are always maintained: `access_token` (the raw token string) and
//! `expires_at` (absolute expiry in epoch seconds, computed from `exp` or `expires_in` when
//! either is present).
//!
use std::error::Error;

use http::header::{HeaderMap, CONTENT_TYPE};
use http::status::StatusCode;
use url::Url;

mod client;
pub mod form;
mod principal;
pub mod request;
mod token;

///
/// HTTP client backed by the [reqwest](https://crates.io/crates/reqwest) crate.
/// Requires "reqwest" feature.
///
#[cfg(feature = "reqwest")]
pub mod reqwest;

#[cfg(test)]
mod tests;

pub mod types;

///
/// Public re-exports of types used for HTTP client interfaces.
///
pub use http;
pub use url;

pub use client::{IntrospectionClient, TokenKind};
pub use form::FormEncodingError;
pub use principal::Principal;
pub use request::IntrospectionRequest;
pub use token::AccessToken;
pub use types::{ClientId, ClientSecret, IntrospectionUrl, RawToken, Scope, SiteUrl};

const CONTENT_TYPE_JSON: &str = "application/json";
const CONTENT_TYPE_FORMENCODED: &str = "application/x-www-form-urlencoded";

///
/// Indicates whether requests to the authorization server should use basic authentication or
/// include the parameters in the request body for requests in which either is valid.
///
/// The default AuthType is *BasicAuth*, following the recommendation of
/// [Section 2.3.1 of RFC 6749](https://tools.ietf.org/html/rfc6749#section-2.3.1).
///
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum AuthType {
    /// The client_id and client_secret (if set) will be included as part of the request body.
    RequestBody,
    /// The client_id and client_secret will be included using the basic auth authentication scheme.
    BasicAuth,
}

///
/// An HTTP request.
///
#[derive(Clone, Debug)]
pub struct HttpRequest {
    // These are all owned values so that the request can safely be passed between
    // threads.
    /// URL to which the HTTP request is being made.
    pub url: Url,
    /// HTTP request method for this request.
    pub method: http::method::Method,
    /// HTTP request headers to send.
    pub headers: HeaderMap,
    /// HTTP request body (typically for POST requests only).
    pub body: Vec<u8>,
}

///
/// An HTTP response.
///
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// HTTP status code returned by the server.
    pub status_code: http::status::StatusCode,
    /// HTTP response headers returned by the server.
    pub headers: HeaderMap,
    /// HTTP response body returned by the server.
    pub body: Vec<u8>,
}

fn check_response_body<RE>(http_response: &HttpResponse) -> Result<(), IntrospectionError<RE>>
where
    RE: Error + 'static,
{
    // Validate that the response Content-Type is JSON.
    http_response
        .headers
        .get(CONTENT_TYPE)
        .map_or(Ok(()), |content_type|
            // Section 3.1.1.1 of RFC 7231 indicates that media types are case insensitive and
            // may be followed by optional whitespace and/or a parameter (e.g., charset).
            // See https://tools.ietf.org/html/rfc7231#section-3.1.1.1.
            if content_type.to_str().ok().filter(|ct| ct.to_lowercase().starts_with(CONTENT_TYPE_JSON)).is_none() {
                Err(
                    IntrospectionError::Other(
                        format!(
                            "Unexpected response Content-Type: {:?}, should be `{}`",
                            content_type,
                            CONTENT_TYPE_JSON
                        )
                    )
                )
            } else {
                Ok(())
            }
        )?;

    if http_response.body.is_empty() {
        return Err(IntrospectionError::Other(
            "Server returned empty response body".to_string(),
        ));
    }

    Ok(())
}

///
/// Error encountered while introspecting a token.
///
#[derive(Debug, thiserror::Error)]
pub enum IntrospectionError<RE>
where
    RE: Error + 'static,
{
    ///
    /// An error occurred while sending the request or receiving the response (e.g., network
    /// connectivity failed). Requests are never retried internally; retry policy belongs to
    /// the caller.
    ///
    #[error("Request failed")]
    Request(#[source] RE),
    ///
    /// The introspection endpoint answered with a non-success HTTP status. The status code is
    /// surfaced as-is; the response body is not interpreted.
    ///
    #[error("Server returned HTTP status {}", _0)]
    Http(StatusCode),
    ///
    /// Failed to parse the server response as a JSON object. The raw body is attached so that
    /// callers can inspect what the server actually sent.
    ///
    #[error("Failed to parse server response")]
    Parse(
        #[source] serde_path_to_error::Error<serde_json::error::Error>,
        Vec<u8>,
    ),
    ///
    /// Some other type of error occurred (e.g., an unexpected server response).
    ///
    #[error("Other error: {}", _0)]
    Other(String),
}
