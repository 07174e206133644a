use std::time::{Duration, Instant};

use crate::error::AuthError;
use crate::identity::HttpIdentityClient;

const SUCCESS_PAGE: &str =
    "<html><body><h1>Signed in</h1><p>You can close this tab and return to the terminal.</p></body></html>";
const FAILURE_PAGE: &str =
    "<html><body><h1>Sign-in failed</h1><p>Check the terminal output.</p></body></html>";

/// Obtain an OAuth authorization code through the browser.
///
/// 1. Bind `tiny_http` to a random loopback port
/// 2. Put a random `state` nonce into the redirect and open the browser
/// 3. Wait for `/callback?code=...&state=...` (in `spawn_blocking`, `tiny_http::recv` blocks)
///
/// The caller exchanges the code through the session store.
///
/// # Errors
///
/// Returns `AuthError::BrowserFlow` if the server cannot bind, the provider
/// reports an error, the callback carries the wrong `state`, or the callback
/// times out.
pub async fn login_code(
    identity: &HttpIdentityClient,
    platform: &str,
    timeout: Duration,
) -> Result<String, AuthError> {
    let server = tiny_http::Server::http("127.0.0.1:0")
        .map_err(|e| AuthError::BrowserFlow(format!("failed to bind: {e}")))?;
    let port = server
        .server_addr()
        .to_ip()
        .map(|a| a.port())
        .ok_or_else(|| AuthError::BrowserFlow("no port".into()))?;

    let state = state_nonce()?;
    let redirect_uri = format!("http://127.0.0.1:{port}/callback?state={state}");
    let login_url = identity.google_login_url(&redirect_uri, platform);

    eprintln!("Opening browser to: {login_url}");
    if let Err(error) = open::that(&login_url) {
        tracing::warn!(%error, "failed to open browser");
        eprintln!("Open the URL above manually, then return here.");
    }

    tokio::task::spawn_blocking(move || wait_for_code(&server, timeout, &state))
        .await
        .map_err(|e| AuthError::BrowserFlow(format!("spawn_blocking join: {e}")))?
}

/// 16 random bytes, hex encoded.
fn state_nonce() -> Result<String, AuthError> {
    let mut bytes = [0u8; 16];
    getrandom::fill(&mut bytes)
        .map_err(|e| AuthError::BrowserFlow(format!("failed to generate state nonce: {e}")))?;
    Ok(bytes.iter().map(|b| format!("{b:02x}")).collect())
}

/// Block until the callback server receives `/callback?code=...` carrying
/// `expected_state`.
///
/// Requests for other paths (favicon, preflight) and callbacks without a
/// code or error are answered and ignored. A code with a missing or foreign
/// `state` fails the flow.
fn wait_for_code(
    server: &tiny_http::Server,
    timeout: Duration,
    expected_state: &str,
) -> Result<String, AuthError> {
    let deadline = Instant::now() + timeout;
    let timed_out = || {
        AuthError::BrowserFlow(format!(
            "browser callback timed out after {}s",
            timeout.as_secs()
        ))
    };

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(timed_out());
        }

        let request = match server.recv_timeout(remaining) {
            Ok(Some(request)) => request,
            Ok(None) => return Err(timed_out()),
            Err(e) => return Err(AuthError::BrowserFlow(format!("recv error: {e}"))),
        };

        let url = request.url().to_string();
        let Some(query) = url.strip_prefix("/callback?") else {
            let _ = request.respond(tiny_http::Response::from_string("").with_status_code(204));
            continue;
        };

        match parse_callback(query)? {
            Callback::Code { code, state } => {
                if state.as_deref() != Some(expected_state) {
                    let _ = request.respond(html(FAILURE_PAGE).with_status_code(400));
                    return Err(AuthError::BrowserFlow(
                        "callback state does not match this login attempt".into(),
                    ));
                }
                let _ = request.respond(html(SUCCESS_PAGE));
                return Ok(code);
            }
            Callback::Error(reason) => {
                let _ = request.respond(html(FAILURE_PAGE).with_status_code(400));
                return Err(AuthError::BrowserFlow(format!("provider returned: {reason}")));
            }
            Callback::Pending => {
                let _ = request.respond(tiny_http::Response::from_string("").with_status_code(204));
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Callback {
    Code { code: String, state: Option<String> },
    Error(String),
    Pending,
}

fn parse_callback(query: &str) -> Result<Callback, AuthError> {
    let mut code = None;
    let mut state = None;
    let mut error = None;
    for pair in query.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        let value = urlencoding::decode(value)
            .map_err(|e| AuthError::BrowserFlow(format!("URL decode: {e}")))?
            .into_owned();
        match key {
            "code" if !value.is_empty() => code = Some(value),
            "state" => state = Some(value),
            "error" => error = Some(value),
            _ => {}
        }
    }
    Ok(match (code, error) {
        (Some(code), _) => Callback::Code { code, state },
        (None, Some(reason)) => Callback::Error(reason),
        (None, None) => Callback::Pending,
    })
}

fn html(body: &str) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let response = tiny_http::Response::from_string(body);
    match tiny_http::Header::from_bytes("Content-Type", "text/html; charset=utf-8") {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_code() {
        assert_eq!(
            parse_callback("code=4%2F0Ab&scope=email&state=f00d").unwrap(),
            Callback::Code {
                code: "4/0Ab".into(),
                state: Some("f00d".into()),
            }
        );
    }

    #[test]
    fn parses_provider_error() {
        assert_eq!(
            parse_callback("error=access_denied").unwrap(),
            Callback::Error("access_denied".into())
        );
    }

    #[test]
    fn empty_code_keeps_waiting() {
        assert_eq!(parse_callback("code=&state=x").unwrap(), Callback::Pending);
        assert_eq!(parse_callback("").unwrap(), Callback::Pending);
    }

    #[test]
    fn callback_server_ignores_unrelated_requests() {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();

        let client = std::thread::spawn(move || {
            use std::io::{Read, Write};
            for path in ["/favicon.ico", "/callback?code=abc123&state=s1"] {
                let mut stream = std::net::TcpStream::connect(("127.0.0.1", port)).unwrap();
                write!(stream, "GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
                    .unwrap();
                let mut buf = String::new();
                let _ = stream.read_to_string(&mut buf);
            }
        });

        let code = wait_for_code(&server, Duration::from_secs(5), "s1").unwrap();
        assert_eq!(code, "abc123");
        client.join().unwrap();
    }

    #[test]
    fn times_out_without_callback() {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let err = wait_for_code(&server, Duration::from_millis(50), "s1").unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn callback_without_matching_state_is_rejected() {
        for path in ["/callback?code=injected", "/callback?code=abc&state=other"] {
            let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
            let port = server.server_addr().to_ip().unwrap().port();

            let client = std::thread::spawn(move || {
                use std::io::{Read, Write};
                let mut stream = std::net::TcpStream::connect(("127.0.0.1", port)).unwrap();
                write!(stream, "GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
                    .unwrap();
                let mut buf = String::new();
                let _ = stream.read_to_string(&mut buf);
                buf
            });

            let err = wait_for_code(&server, Duration::from_secs(5), "s1").unwrap_err();
            assert!(err.to_string().contains("state"), "{path}: {err}");
            assert!(client.join().unwrap().contains("400"));
        }
    }

    #[test]
    fn state_nonce_is_random_hex() {
        let first = state_nonce().unwrap();
        let second = state_nonce().unwrap();
        assert_eq!(first.len(), 32);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(first, second);
    }
}
