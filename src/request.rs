//!
//! Construction and submission of introspection requests
//! ([RFC 7662 Section 2.1](https://tools.ietf.org/html/rfc7662#section-2.1)).
//!
use std::borrow::Cow;
use std::error::Error;
use std::future::Future;
use std::sync::Arc;

use base64::Engine;
use chrono::{DateTime, Utc};
use http::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde_json::map::Map;
use serde_json::Value;
use url::{form_urlencoded, Url};

use crate::client::IntrospectionClient;
use crate::form;
use crate::principal::Principal;
use crate::token::AccessToken;
use crate::types::{ClientId, ClientSecret, RawToken};
use crate::{
    check_response_body, AuthType, HttpRequest, HttpResponse, IntrospectionError,
    CONTENT_TYPE_FORMENCODED, CONTENT_TYPE_JSON,
};

fn endpoint_request<'a>(
    auth_type: &'a AuthType,
    client_id: &'a ClientId,
    client_secret: Option<&'a ClientSecret>,
    extra_params: &'a [(Cow<'a, str>, Cow<'a, str>)],
    url: &'a Url,
    params: Vec<(&'a str, &'a str)>,
) -> HttpRequest {
    let mut headers = HeaderMap::new();
    headers.append(ACCEPT, HeaderValue::from_static(CONTENT_TYPE_JSON));
    headers.append(
        CONTENT_TYPE,
        HeaderValue::from_static(CONTENT_TYPE_FORMENCODED),
    );

    let mut params: Vec<(&str, &str)> = params;
    match (auth_type, client_secret) {
        // Basic auth only makes sense when a client secret is provided. Otherwise, always pass the
        // client ID in the request body.
        (AuthType::BasicAuth, Some(secret)) => {
            // Section 2.3.1 of RFC 6749 requires separately url-encoding the id and secret
            // before using them as HTTP Basic auth username and password. Note that this is
            // not standard for ordinary Basic auth, so curl won't do it for us.
            let urlencoded_id: String =
                form_urlencoded::byte_serialize(client_id.as_bytes()).collect();
            let urlencoded_secret: String =
                form_urlencoded::byte_serialize(secret.secret().as_bytes()).collect();
            let b64_credential = base64::engine::general_purpose::STANDARD
                .encode(format!("{}:{}", &urlencoded_id, urlencoded_secret));
            headers.append(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Basic {}", &b64_credential)).unwrap(),
            );
        }
        (AuthType::RequestBody, _) | (AuthType::BasicAuth, None) => {
            params.push(("client_id", client_id));
            if let Some(client_secret) = client_secret {
                params.push(("client_secret", client_secret.secret()));
            }
        }
    }

    params.extend(extra_params.iter().map(|(k, v)| (k.as_ref(), v.as_ref())));

    let body = form::encode(params);

    HttpRequest {
        url: url.to_owned(),
        method: http::method::Method::POST,
        headers,
        body,
    }
}

fn endpoint_response<RE>(
    http_response: HttpResponse,
) -> Result<Map<String, Value>, IntrospectionError<RE>>
where
    RE: Error + 'static,
{
    check_response_status(&http_response)?;

    check_response_body(&http_response)?;

    let response_body = http_response.body.as_slice();
    serde_path_to_error::deserialize(&mut serde_json::Deserializer::from_slice(response_body))
        .map_err(|e| IntrospectionError::Parse(e, response_body.to_vec()))
}

fn check_response_status<RE>(
    http_response: &HttpResponse,
) -> Result<(), IntrospectionError<RE>>
where
    RE: Error + 'static,
{
    // Exactly one request is issued per call; a non-success status is surfaced to the caller
    // with no retry and without interpreting the error body.
    if http_response.status_code.as_u16() >= 300 {
        return Err(IntrospectionError::Http(http_response.status_code));
    }

    Ok(())
}

///
/// A request to introspect an access token.
///
/// See <https://tools.ietf.org/html/rfc7662#section-2.1>.
///
pub struct IntrospectionRequest<'a> {
    pub token: &'a RawToken,
    pub token_type_hint: Option<Cow<'a, str>>,
    pub extra_params: Vec<(Cow<'a, str>, Cow<'a, str>)>,

    pub(crate) client: &'a IntrospectionClient,
    pub(crate) time_fn: Arc<dyn Fn() -> DateTime<Utc> + Send + Sync + 'a>,
}

impl<'a> IntrospectionRequest<'a> {
    ///
    /// Sets the optional token_type_hint parameter.
    ///
    /// See <https://tools.ietf.org/html/rfc7662#section-2.1>.
    ///
    /// OPTIONAL.  A hint about the type of the token submitted for
    ///       introspection.  The protected resource MAY pass this parameter to
    ///       help the authorization server optimize the token lookup.  If the
    ///       server is unable to locate the token using the given hint, it MUST
    ///      extend its search across all of its supported token types.  An
    ///      authorization server MAY ignore this parameter, particularly if it
    ///      is able to detect the token type automatically.  Values for this
    ///      field are defined in the "OAuth Token Type Hints" registry defined
    ///      in OAuth Token Revocation [RFC7009](https://tools.ietf.org/html/rfc7009).
    ///
    pub fn set_token_type_hint<V>(mut self, value: V) -> Self
    where
        V: Into<Cow<'a, str>>,
    {
        self.token_type_hint = Some(value.into());

        self
    }

    ///
    /// Appends an extra param to the token introspection request.
    ///
    /// This method allows extensions to be used without direct support from
    /// this crate. If `name` conflicts with a parameter managed by this crate, the
    /// behavior is undefined. In particular, do not set parameters defined by
    /// [RFC 6749](https://tools.ietf.org/html/rfc6749) or
    /// [RFC 7662](https://tools.ietf.org/html/rfc7662).
    ///
    /// # Security Warning
    ///
    /// Callers should follow the security recommendations for any OAuth2 extensions used with
    /// this function, which are beyond the scope of
    /// [RFC 6749](https://tools.ietf.org/html/rfc6749).
    ///
    pub fn add_extra_param<N, V>(mut self, name: N, value: V) -> Self
    where
        N: Into<Cow<'a, str>>,
        V: Into<Cow<'a, str>>,
    {
        self.extra_params.push((name.into(), value.into()));
        self
    }

    ///
    /// Specifies a function for returning the current time. The time is consulted once per
    /// response to derive the `expires_at` claim from `expires_in`.
    ///
    /// Useful for deterministic tests.
    ///
    pub fn set_time_fn<T>(mut self, time_fn: T) -> Self
    where
        T: Fn() -> DateTime<Utc> + Send + Sync + 'a,
    {
        self.time_fn = Arc::new(time_fn);

        self
    }

    fn prepare_request(&self) -> HttpRequest {
        let mut params: Vec<(&str, &str)> = vec![("token", self.token.secret())];
        if let Some(ref token_type_hint) = self.token_type_hint {
            params.push(("token_type_hint", token_type_hint));
        }

        endpoint_request(
            &self.client.auth_type,
            &self.client.client_id,
            self.client.client_secret.as_ref(),
            &self.extra_params,
            self.client.introspection_url.url(),
            params,
        )
    }

    fn token_response<RE>(
        &self,
        http_response: HttpResponse,
    ) -> Result<AccessToken, IntrospectionError<RE>>
    where
        RE: Error + 'static,
    {
        let claims = endpoint_response(http_response)?;
        let principal = Principal::from_introspection(claims, self.token, (self.time_fn)());

        Ok(AccessToken::new(
            self.client.clone(),
            self.token.clone(),
            principal,
        ))
    }

    ///
    /// Synchronously sends the request to the authorization server and awaits a response.
    ///
    pub fn request<F, RE>(self, http_client: F) -> Result<AccessToken, IntrospectionError<RE>>
    where
        F: FnOnce(HttpRequest) -> Result<HttpResponse, RE>,
        RE: Error + 'static,
    {
        let http_response =
            http_client(self.prepare_request()).map_err(IntrospectionError::Request)?;
        self.token_response(http_response)
    }

    ///
    /// Asynchronously sends the request to the authorization server and returns a Future.
    ///
    pub async fn request_async<C, F, RE>(
        self,
        http_client: C,
    ) -> Result<AccessToken, IntrospectionError<RE>>
    where
        C: FnOnce(HttpRequest) -> F,
        F: Future<Output = Result<HttpResponse, RE>>,
        RE: Error + 'static,
    {
        let http_request = self.prepare_request();
        let http_response = http_client(http_request)
            .await
            .map_err(IntrospectionError::Request)?;
        self.token_response(http_response)
    }
}
