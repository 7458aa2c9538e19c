use std::error::Error;
use std::future::Future;

use crate::client::IntrospectionClient;
use crate::principal::Principal;
use crate::types::RawToken;
use crate::{HttpRequest, HttpResponse, IntrospectionError};

///
/// A token whose metadata has been verified against the authorization server.
///
/// An `AccessToken` is only ever produced by a successful introspection call. It wraps the raw
/// token string, the [`Principal`] the server's response normalized to, and a handle to the
/// issuing [`IntrospectionClient`] so that it can refresh its own verdict later via
/// [`introspect`](Self::introspect).
///
/// The held `Principal` is replaced wholesale by a later successful re-introspection and is
/// otherwise only changed through [`principal_mut`](Self::principal_mut). Sharing one
/// `AccessToken` across threads or tasks is the caller's business: re-introspection takes
/// `&mut self`, so concurrent refreshes require caller-side synchronization by construction.
///
#[derive(Clone, Debug)]
pub struct AccessToken {
    client: IntrospectionClient,
    token: RawToken,
    principal: Principal,
}

impl AccessToken {
    pub(crate) fn new(
        client: IntrospectionClient,
        token: RawToken,
        principal: Principal,
    ) -> Self {
        AccessToken {
            client,
            token,
            principal,
        }
    }

    ///
    /// The raw token string this object was created from.
    ///
    pub fn token(&self) -> &RawToken {
        &self.token
    }

    ///
    /// The client that issued this token object.
    ///
    pub fn client(&self) -> &IntrospectionClient {
        &self.client
    }

    ///
    /// The claims returned by the most recent introspection of this token.
    ///
    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    ///
    /// Mutable access to the held claims. Mutations are not isolated: they are visible to every
    /// subsequent read (including [`is_authorized`](Self::is_authorized)) until the next
    /// successful [`introspect`](Self::introspect) replaces the whole `Principal`.
    ///
    pub fn principal_mut(&mut self) -> &mut Principal {
        &mut self.principal
    }

    ///
    /// Consumes this token object, yielding its claims.
    ///
    pub fn into_principal(self) -> Principal {
        self.principal
    }

    ///
    /// Returns true if the given scope appears among the whitespace-delimited tokens of the
    /// Principal's `scope` claim. Accepts anything string-like, including the
    /// [`Scope`](crate::Scope) newtype.
    ///
    /// This is a purely local check against the claims from the last introspection; no network
    /// call is made. When the `scope` claim is absent (as with minimal Keycloak-style
    /// responses), this returns false for every input.
    ///
    pub fn is_authorized<S>(&self, scope: S) -> bool
    where
        S: AsRef<str>,
    {
        let scope = scope.as_ref();
        self.principal.scopes().any(|granted| granted == scope)
    }

    ///
    /// Re-introspects this token against the issuing client's endpoint, replacing the held
    /// [`Principal`] with the freshly returned one on success.
    ///
    /// On failure the held `Principal` is left exactly as it was and the error is returned; a
    /// partial result is never applied. May be called arbitrarily many times.
    ///
    pub fn introspect<F, RE>(&mut self, http_client: F) -> Result<(), IntrospectionError<RE>>
    where
        F: FnOnce(HttpRequest) -> Result<HttpResponse, RE>,
        RE: Error + 'static,
    {
        let fresh = self
            .client
            .introspect_token(&self.token)
            .request(http_client)?;
        self.principal = fresh.into_principal();

        Ok(())
    }

    ///
    /// Asynchronous variant of [`introspect`](Self::introspect).
    ///
    pub async fn introspect_async<C, F, RE>(
        &mut self,
        http_client: C,
    ) -> Result<(), IntrospectionError<RE>>
    where
        C: FnOnce(HttpRequest) -> F,
        F: Future<Output = Result<HttpResponse, RE>>,
        RE: Error + 'static,
    {
        let fresh = self
            .client
            .introspect_token(&self.token)
            .request_async(http_client)
            .await?;
        self.principal = fresh.into_principal();

        Ok(())
    }
}
