//! Identity/token service client.
//!
//! [`IdentityService`] is the seam the session store talks through; the
//! production implementation is [`HttpIdentityClient`]. Tests substitute a
//! fake that counts calls.

use std::future::Future;
use std::time::Duration;

use qc_core::UserIdentity;
use serde_json::json;

use crate::credentials::CredentialPair;
use crate::error::AuthError;

/// Remote identity operations the session store depends on.
pub trait IdentityService: Send + Sync + 'static {
    /// Exchange an OAuth authorization code for a credential pair.
    fn exchange_code(
        &self,
        code: &str,
    ) -> impl Future<Output = Result<CredentialPair, AuthError>> + Send;

    /// Trade a refresh token for a new credential pair.
    fn refresh(
        &self,
        refresh_token: &str,
    ) -> impl Future<Output = Result<CredentialPair, AuthError>> + Send;

    /// Notify the service that the refresh token is no longer in use.
    fn logout(&self, refresh_token: &str) -> impl Future<Output = Result<(), AuthError>> + Send;

    /// Fetch the full user record for `user_id`.
    fn fetch_user(
        &self,
        user_id: &str,
        access_token: &str,
    ) -> impl Future<Output = Result<UserIdentity, AuthError>> + Send;
}

/// REST client for the identity service.
#[derive(Debug, Clone)]
pub struct HttpIdentityClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpIdentityClient {
    /// # Errors
    ///
    /// Returns `AuthError::Request` if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| AuthError::Request {
                operation: "build http client",
                source,
            })?;
        Ok(Self::with_client(http, base_url))
    }

    /// Reuse an existing `reqwest::Client`.
    #[must_use]
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Browser entry point for Google sign-in.
    #[must_use]
    pub fn google_login_url(&self, redirect_uri: &str, platform: &str) -> String {
        format!(
            "{}/auth/google?redirect_uri={}&platform={}",
            self.base_url,
            urlencoding::encode(redirect_uri),
            urlencoding::encode(platform)
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post_for_pair(
        &self,
        operation: &'static str,
        path: &str,
        body: serde_json::Value,
    ) -> Result<CredentialPair, AuthError> {
        let response = self
            .http
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .map_err(|source| AuthError::Request { operation, source })?;
        let response = ensure_success(response, operation).await?;
        response
            .json::<CredentialPair>()
            .await
            .map_err(|source| AuthError::Request { operation, source })
    }
}

impl IdentityService for HttpIdentityClient {
    async fn exchange_code(&self, code: &str) -> Result<CredentialPair, AuthError> {
        tracing::debug!("exchanging authorization code");
        self.post_for_pair("code exchange", "/auth/mobile/exchange", json!({ "code": code }))
            .await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<CredentialPair, AuthError> {
        tracing::debug!("refreshing access token");
        self.post_for_pair(
            "token refresh",
            "/auth/token/refresh",
            json!({ "refresh_token": refresh_token }),
        )
        .await
    }

    async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        let operation = "logout";
        let response = self
            .http
            .post(self.url("/auth/logout"))
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(|source| AuthError::Request { operation, source })?;
        ensure_success(response, operation).await?;
        Ok(())
    }

    async fn fetch_user(&self, user_id: &str, access_token: &str) -> Result<UserIdentity, AuthError> {
        let operation = "fetch user";
        let path = format!("/core/users/{}", urlencoding::encode(user_id));
        let response = self
            .http
            .get(self.url(&path))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|source| AuthError::Request { operation, source })?;
        let response = ensure_success(response, operation).await?;
        response
            .json::<UserIdentity>()
            .await
            .map_err(|source| AuthError::Request { operation, source })
    }
}

/// Pass successful responses through; turn anything else into `AuthError::Http`.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
    operation: &'static str,
) -> Result<reqwest::Response, AuthError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(AuthError::Http {
        operation,
        status,
        detail: error_detail(&body),
    })
}

/// Prefer the service's `detail`/`message` field over the raw body.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["detail", "message", "error"]
                .into_iter()
                .find_map(|key| value.get(key).and_then(|v| v.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use qc_core::Role;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> HttpIdentityClient {
        HttpIdentityClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn google_login_url_encodes_parameters() {
        let client = HttpIdentityClient::with_client(reqwest::Client::new(), "https://api.example.com/");
        assert_eq!(
            client.google_login_url("http://127.0.0.1:4000/callback", "admin"),
            "https://api.example.com/auth/google?redirect_uri=http%3A%2F%2F127.0.0.1%3A4000%2Fcallback&platform=admin"
        );
    }

    #[test]
    fn error_detail_prefers_structured_fields() {
        assert_eq!(error_detail(r#"{"detail":"Invalid code"}"#), "Invalid code");
        assert_eq!(error_detail(r#"{"message":"nope"}"#), "nope");
        assert_eq!(error_detail("  plain text \n"), "plain text");
    }

    #[tokio::test]
    async fn exchange_code_posts_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/mobile/exchange"))
            .and(body_json(json!({ "code": "abc" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "a1",
                "refresh_token": "r1",
                "token_type": "bearer",
                "user_id": 5
            })))
            .expect(1)
            .mount(&server)
            .await;

        let pair = client(&server).exchange_code("abc").await.unwrap();
        assert_eq!(pair.access_token, "a1");
        assert_eq!(pair.user_id.as_deref(), Some("5"));
    }

    #[tokio::test]
    async fn refresh_rejection_maps_to_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/token/refresh"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "detail": "Token revoked" })),
            )
            .mount(&server)
            .await;

        let err = client(&server).refresh("r1").await.unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert!(err.to_string().contains("Token revoked"));
    }

    #[tokio::test]
    async fn fetch_user_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/core/users/42"))
            .and(header("authorization", "Bearer a1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 42,
                "first_name": "Ada",
                "last_name": "Lovelace",
                "role": "finance",
                "status": "active",
                "is_creator": false
            })))
            .expect(1)
            .mount(&server)
            .await;

        let user = client(&server).fetch_user("42", "a1").await.unwrap();
        assert_eq!(user.id, "42");
        assert_eq!(user.role, Role::Finance);
        assert_eq!(user.display_name(), "Ada Lovelace");
    }

    #[tokio::test]
    async fn logout_reports_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .and(body_json(json!({ "refresh_token": "r1" })))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server).logout("r1").await.unwrap_err();
        assert_eq!(err.status(), Some(500));
    }
}
