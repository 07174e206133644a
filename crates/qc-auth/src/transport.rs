//! Authorized HTTP transport for console resources.
//!
//! Attaches the bearer token, refreshes once on `401` and retries. When the
//! refresh itself fails the session is invalidated and the caller gets
//! [`AuthError::SessionExpired`].

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::AuthError;
use crate::identity::{IdentityService, ensure_success};
use crate::session::SessionStore;

pub struct ApiClient<I> {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore<I>>,
}

impl<I: IdentityService> ApiClient<I> {
    /// # Errors
    ///
    /// Returns `AuthError::Request` if the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        session: Arc<SessionStore<I>>,
    ) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| AuthError::Request {
                operation: "build http client",
                source,
            })?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore<I>> {
        &self.session
    }

    /// `GET {base}{path}` with query parameters, decoded as JSON.
    ///
    /// # Errors
    ///
    /// `NoCredential` without a stored token, `SessionExpired` when the token
    /// cannot be refreshed, `Http`/`Request` for other failures.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, AuthError> {
        let operation = "GET";
        let path = with_query(path, query);
        let response = self
            .execute(operation, |http, url| http.get(url), &path)
            .await?;
        response
            .json::<T>()
            .await
            .map_err(|source| AuthError::Request { operation, source })
    }

    /// Send `body` as JSON with `method`, decoding a JSON response.
    ///
    /// # Errors
    ///
    /// See [`Self::get_json`].
    pub async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, AuthError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let operation = "send";
        let response = self
            .execute(
                operation,
                |http, url| http.request(method.clone(), url).json(body),
                path,
            )
            .await?;
        response
            .json::<T>()
            .await
            .map_err(|source| AuthError::Request { operation, source })
    }

    /// `DELETE {base}{path}`, ignoring any response body.
    ///
    /// # Errors
    ///
    /// See [`Self::get_json`].
    pub async fn delete(&self, path: &str) -> Result<(), AuthError> {
        self.execute("DELETE", |http, url| http.delete(url), path)
            .await
            .map(drop)
    }

    async fn execute<F>(
        &self,
        operation: &'static str,
        build: F,
        path: &str,
    ) -> Result<Response, AuthError>
    where
        F: Fn(&reqwest::Client, String) -> RequestBuilder,
    {
        let url = format!("{}{path}", self.base_url);
        let token = self.session.access_token().ok_or(AuthError::NoCredential)?;

        let response = self.send(operation, &build, &url, &token).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return ensure_success(response, operation).await;
        }

        tracing::debug!(%url, "401 from resource; refreshing access token");
        let token = match self.session.refresh_after_unauthorized(&token).await {
            Ok(token) => token,
            Err(error) => {
                tracing::warn!(%error, "token refresh failed; ending session");
                self.session
                    .invalidate(&format!("session expired: {error}"))
                    .await;
                return Err(AuthError::SessionExpired);
            }
        };

        let response = self.send(operation, &build, &url, &token).await?;
        ensure_success(response, operation).await
    }

    async fn send<F>(
        &self,
        operation: &'static str,
        build: &F,
        url: &str,
        token: &str,
    ) -> Result<Response, AuthError>
    where
        F: Fn(&reqwest::Client, String) -> RequestBuilder,
    {
        build(&self.http, url.to_string())
            .bearer_auth(token)
            .send()
            .await
            .map_err(|source| AuthError::Request { operation, source })
    }
}

fn with_query(path: &str, query: &[(&str, String)]) -> String {
    if query.is_empty() {
        return path.to_string();
    }
    let pairs = query
        .iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{path}?{pairs}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::tests::make_jwt;
    use crate::identity::HttpIdentityClient;
    use crate::token_store::{MemoryTokenStore, TokenStorage};
    use serde_json::{Value, json};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api(server: &MockServer, tokens: Arc<MemoryTokenStore>) -> ApiClient<HttpIdentityClient> {
        let identity = HttpIdentityClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
        let session = Arc::new(SessionStore::new(tokens, identity));
        ApiClient::new(&server.uri(), Duration::from_secs(5), session).unwrap()
    }

    #[test]
    fn query_pairs_are_encoded() {
        assert_eq!(with_query("/core/users", &[]), "/core/users");
        assert_eq!(
            with_query("/core/users", &[("limit", "20".into()), ("q", "a b".into())]),
            "/core/users?limit=20&q=a%20b"
        );
    }

    #[tokio::test]
    async fn no_token_means_no_request() {
        let server = MockServer::start().await;
        let client = api(&server, Arc::new(MemoryTokenStore::new()));
        let err = client.get_json::<Value>("/core/quests", &[]).await.unwrap_err();
        assert!(matches!(err, AuthError::NoCredential));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn retries_once_after_refresh() {
        let server = MockServer::start().await;
        let fresh = make_jwt(r#"{"sub":"1","v":2}"#);

        Mock::given(method("GET"))
            .and(path("/core/quests"))
            .and(header("authorization", "Bearer stale"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/token/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": fresh,
                "refresh_token": "r2"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/core/quests"))
            .and(header("authorization", format!("Bearer {fresh}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1 }])))
            .expect(1)
            .mount(&server)
            .await;

        let tokens = Arc::new(MemoryTokenStore::with_tokens(Some("stale"), Some("r1")));
        let client = api(&server, tokens.clone());
        let quests: Value = client.get_json("/core/quests", &[]).await.unwrap();
        assert_eq!(quests, json!([{ "id": 1 }]));
        assert_eq!(tokens.get_refresh_token().as_deref(), Some("r2"));
    }

    #[tokio::test]
    async fn failed_refresh_invalidates_session() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/core/users/9"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/token/refresh"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let tokens = Arc::new(MemoryTokenStore::with_tokens(Some("stale"), Some("r1")));
        let client = api(&server, tokens.clone());
        let err = client.delete("/core/users/9").await.unwrap_err();
        assert!(matches!(err, AuthError::SessionExpired));
        assert!(tokens.get_token().is_none());

        let session = client.session().snapshot();
        assert!(!session.is_authenticated);
        assert!(session.error.is_some_and(|e| e.starts_with("session expired")));
    }

    #[tokio::test]
    async fn other_statuses_map_to_http_errors() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/core/users/3"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({ "detail": "bad role" })))
            .mount(&server)
            .await;

        let tokens = Arc::new(MemoryTokenStore::with_tokens(Some("a"), Some("r")));
        let client = api(&server, tokens);
        let err = client
            .send_json::<_, Value>(Method::PATCH, "/core/users/3", &json!({ "role": "admin" }))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(422));
        assert!(err.to_string().contains("bad role"));
    }
}
