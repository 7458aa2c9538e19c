use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::map::Map;
use serde_json::Value;

use crate::types::RawToken;

///
/// Canonical claims describing the introspected token and its subject.
///
/// A `Principal` is deliberately an open map rather than a closed schema: RFC 7662-compliant
/// servers, Google-style servers, and Keycloak-style servers each return different field sets,
/// and every field is preserved under its original name so that consumers written against any of
/// those shapes find what they expect. Forcing the payloads into one renamed schema (e.g.
/// `aud` → `audience`) would break exactly those consumers.
///
/// Two derived fields are always maintained on top of the server's payload:
///
/// * `access_token`: the raw token string that was introspected.
/// * `expires_at`: absolute expiry in epoch seconds, taken verbatim from `exp` when present,
///   otherwise computed from `expires_in` relative to the time of the introspection response.
///   Once computed it is never re-derived for the lifetime of this `Principal`; a later
///   re-introspection replaces the whole map instead.
///
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal {
    claims: Map<String, Value>,
}

impl Principal {
    ///
    /// Builds a `Principal` from a raw introspection response body.
    ///
    /// This never fails: a degenerate payload with none of the expected fields simply yields a
    /// `Principal` containing only the injected `access_token`.
    ///
    pub(crate) fn from_introspection(
        mut claims: Map<String, Value>,
        token: &RawToken,
        now: DateTime<Utc>,
    ) -> Self {
        if let Some(exp) = claims.get("exp").cloned() {
            // `exp` is already absolute epoch seconds.
            claims.insert("expires_at".to_string(), exp);
        } else if let Some(expires_in) = claims.get("expires_in").and_then(Value::as_i64) {
            claims.insert(
                "expires_at".to_string(),
                Value::from(now.timestamp() + expires_in),
            );
        }

        claims.insert(
            "access_token".to_string(),
            Value::from(token.secret().as_str()),
        );

        Principal { claims }
    }

    ///
    /// Returns the value of the given claim, if present.
    ///
    pub fn get(&self, claim: &str) -> Option<&Value> {
        self.claims.get(claim)
    }

    ///
    /// Returns a mutable reference to the value of the given claim, if present.
    ///
    pub fn get_mut(&mut self, claim: &str) -> Option<&mut Value> {
        self.claims.get_mut(claim)
    }

    ///
    /// Inserts or replaces a claim, returning the previous value if there was one.
    ///
    pub fn insert<C>(&mut self, claim: C, value: Value) -> Option<Value>
    where
        C: Into<String>,
    {
        self.claims.insert(claim.into(), value)
    }

    ///
    /// Removes a claim, returning its value if it was present.
    ///
    pub fn remove(&mut self, claim: &str) -> Option<Value> {
        self.claims.remove(claim)
    }

    ///
    /// Returns true if the given claim is present.
    ///
    pub fn contains(&self, claim: &str) -> bool {
        self.claims.contains_key(claim)
    }

    ///
    /// Returns the full claims map.
    ///
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.claims
    }

    ///
    /// Returns the full claims map mutably. Mutations are visible to every later read of the
    /// same `Principal`; callers get a shared view, not a copy.
    ///
    pub fn as_map_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.claims
    }

    ///
    /// Iterates over all claims in the map.
    ///
    pub fn iter(&self) -> serde_json::map::Iter {
        self.claims.iter()
    }

    ///
    /// The `active` claim ([Section 2.2 of RFC 7662](https://tools.ietf.org/html/rfc7662#section-2.2)),
    /// if the server returned it as a boolean.
    ///
    pub fn active(&self) -> Option<bool> {
        self.get("active").and_then(Value::as_bool)
    }

    ///
    /// The space-delimited `scope` claim, if the server returned it as a string.
    ///
    pub fn scope(&self) -> Option<&str> {
        self.get("scope").and_then(Value::as_str)
    }

    ///
    /// Iterates over the individual scope tokens of the `scope` claim; empty when the claim is
    /// absent.
    ///
    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.scope().unwrap_or("").split_whitespace()
    }

    ///
    /// The derived `expires_at` claim: absolute expiry in epoch seconds. Absent when the server
    /// returned neither `exp` nor `expires_in`.
    ///
    pub fn expires_at(&self) -> Option<i64> {
        self.get("expires_at").and_then(Value::as_i64)
    }

    ///
    /// The injected `access_token` claim: the raw token string this `Principal` describes.
    ///
    pub fn access_token(&self) -> Option<&str> {
        self.get("access_token").and_then(Value::as_str)
    }

    ///
    /// The `username` claim, if the server returned one.
    ///
    pub fn username(&self) -> Option<&str> {
        self.get("username").and_then(Value::as_str)
    }

    ///
    /// The `client_id` claim, if the server returned one.
    ///
    pub fn client_id(&self) -> Option<&str> {
        self.get("client_id").and_then(Value::as_str)
    }
}
