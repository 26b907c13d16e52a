//! Low-level HTTP client — `FxMarketHttp`.
//!
//! Generic verbs over the REST API. Every authenticated call goes through
//! [`FxMarketHttp::send`], which attaches the session's bearer token and
//! absorbs access-token expiry:
//!
//! 1. the request is sent with the current access token;
//! 2. on `401`, the session either hands back a token that was renewed after
//!    the request went out, or starts (or joins) the single in-flight refresh;
//! 3. the request is replayed once with the renewed token. A `401` on the
//!    replay is returned to the caller unchanged.
//!
//! A failed refresh tears the session down and every waiting request fails
//! with [`AuthError::SessionTerminated`]. Auth endpoints use
//! [`FxMarketHttp::post_anonymous`] and bypass all of this.

use crate::auth::session::{RefreshOutcome, Renewal, Session};
use crate::auth::{RefreshRequest, RefreshResponse};
use crate::error::{AuthError, ErrorResponse, HttpError, SdkError};
use crate::http::retry::RetryPolicy;

use futures_util::future::{self, Either, FutureExt};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Low-level HTTP client for the FxMarket REST API.
#[derive(Clone)]
pub struct FxMarketHttp {
    api_url: String,
    client: Client,
    session: Arc<Session>,
    refresh_timeout: Duration,
    read_retry: RetryPolicy,
}

impl FxMarketHttp {
    pub fn new(
        api_url: &str,
        session: Arc<Session>,
        request_timeout: Duration,
        refresh_timeout: Duration,
        read_retry: RetryPolicy,
    ) -> Result<Self, SdkError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .pool_max_idle_per_host(10)
            .build()
            .map_err(HttpError::from)?;

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            client,
            session,
            refresh_timeout,
            read_retry,
        })
    }

    /// Origin plus API prefix, e.g. `http://localhost:3000/api`.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    // ── Verbs ────────────────────────────────────────────────────────────

    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, SdkError> {
        let retry = self.read_retry.clone();
        self.send(Method::GET, url, None::<&()>, retry).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, SdkError> {
        self.send(Method::POST, url, Some(body), RetryPolicy::None)
            .await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        url: &str,
        body: Option<&B>,
    ) -> Result<T, SdkError> {
        self.send(Method::PATCH, url, body, RetryPolicy::None).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, SdkError> {
        self.send(Method::PUT, url, Some(body), RetryPolicy::None)
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, url: &str) -> Result<T, SdkError> {
        self.send(Method::DELETE, url, None::<&()>, RetryPolicy::None)
            .await
    }

    /// POST without a bearer token and without session handling.
    pub async fn post_anonymous<T: DeserializeOwned, B: Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, HttpError> {
        self.do_request(&Method::POST, url, Some(body), None).await
    }

    // ── Session continuity ───────────────────────────────────────────────

    /// Issue an authenticated request, renewing the session once on `401`.
    pub async fn send<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
        retry: RetryPolicy,
    ) -> Result<T, SdkError> {
        let sent_with = self.session.access_token().await;

        match self
            .request_with_retry(&method, url, body, &retry, sent_with.as_deref())
            .await
        {
            Err(HttpError::Unauthorized) => {}
            other => return Ok(other?),
        }

        tracing::debug!(%method, url, "access token rejected");
        let token = self.renew_access(sent_with.as_deref()).await?;

        tracing::debug!(%method, url, "replaying with renewed token");
        Ok(self
            .request_with_retry(&method, url, body, &retry, Some(&token))
            .await?)
    }

    async fn renew_access(&self, rejected: Option<&str>) -> Result<String, SdkError> {
        let http = self.clone();
        let renewal = self
            .session
            .renewal(rejected, move |refresh_token, epoch| {
                http.run_refresh(refresh_token, epoch).boxed()
            })
            .await;

        match renewal {
            Renewal::Ready(token) => Ok(token),
            Renewal::Pending(flight) => flight
                .await
                .map_err(|reason| AuthError::SessionTerminated(reason).into()),
            // The session ended while this request was out.
            Renewal::NoSession if rejected.is_some() => {
                Err(AuthError::SessionTerminated("session ended".to_string()).into())
            }
            Renewal::NoSession => Err(HttpError::Unauthorized.into()),
        }
    }

    /// Body of the shared refresh future. Runs once per refresh.
    async fn run_refresh(self, refresh_token: String, epoch: u64) -> RefreshOutcome {
        tracing::info!("access token expired, refreshing session");

        let url = format!("{}/auth/refresh", self.api_url);
        let body = RefreshRequest { refresh_token };
        let outcome = with_deadline(
            self.do_request::<RefreshResponse, _>(&Method::POST, &url, Some(&body), None),
            self.refresh_timeout,
        )
        .await
        .and_then(|result| result);

        match outcome {
            Ok(resp) => {
                if self
                    .session
                    .install_access_token(epoch, resp.access_token.clone())
                    .await
                {
                    tracing::info!("session refreshed");
                    Ok(resp.access_token)
                } else {
                    Err("session ended while refreshing".to_string())
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "session refresh failed");
                self.session.terminate(epoch).await;
                Err(e.to_string())
            }
        }
    }

    // ── Transport ────────────────────────────────────────────────────────

    async fn request_with_retry<T: DeserializeOwned, B: Serialize>(
        &self,
        method: &Method,
        url: &str,
        body: Option<&B>,
        retry: &RetryPolicy,
        token: Option<&str>,
    ) -> Result<T, HttpError> {
        let Some(config) = retry.config() else {
            return self.do_request(method, url, body, token).await;
        };

        let mut last_error = None;

        for attempt in 0..=config.max_retries {
            match self.do_request::<T, B>(method, url, body, token).await {
                Ok(resp) => return Ok(resp),
                Err(e) if config.should_retry(&e) => {
                    if attempt < config.max_retries {
                        let delay = config.delay_for(attempt, &e);
                        tracing::debug!(
                            attempt = attempt + 1,
                            max = config.max_retries,
                            delay_ms = delay.as_millis() as u64,
                            "Retrying request to {}",
                            url
                        );
                        futures_timer::Delay::new(delay).await;
                    }
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(HttpError::MaxRetriesExceeded {
            attempts: config.max_retries + 1,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }

    async fn do_request<T: DeserializeOwned, B: Serialize>(
        &self,
        method: &Method,
        url: &str,
        body: Option<&B>,
        token: Option<&str>,
    ) -> Result<T, HttpError> {
        let mut req = self.client.request(method.clone(), url);

        if let Some(token) = token {
            req = req.bearer_auth(token);
        }

        if let Some(b) = body {
            req = req.json(b);
        }

        let resp = req.send().await?;
        let status = resp.status();

        if status.is_success() {
            let bytes = resp.bytes().await?;
            // DELETE and PATCH endpoints may answer with an empty body.
            let parsed = if bytes.iter().all(|b| b.is_ascii_whitespace()) {
                serde_json::from_slice(b"null")?
            } else {
                serde_json::from_slice(&bytes)?
            };
            return Ok(parsed);
        }

        let retry_after_ms = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(|secs| secs * 1000);
        let body_text = resp.text().await.unwrap_or_default();

        Err(match status {
            StatusCode::UNAUTHORIZED => HttpError::Unauthorized,
            StatusCode::FORBIDDEN => HttpError::Forbidden(ErrorResponse::message_or(&body_text)),
            StatusCode::NOT_FOUND => HttpError::NotFound(ErrorResponse::message_or(&body_text)),
            StatusCode::TOO_MANY_REQUESTS => HttpError::RateLimited { retry_after_ms },
            s if s.is_client_error() => {
                HttpError::BadRequest(ErrorResponse::message_or(&body_text))
            }
            s => HttpError::ServerError {
                status: s.as_u16(),
                body: body_text,
            },
        })
    }
}

impl std::fmt::Debug for FxMarketHttp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FxMarketHttp")
            .field("api_url", &self.api_url)
            .field("refresh_timeout", &self.refresh_timeout)
            .finish_non_exhaustive()
    }
}

/// Resolve `fut`, or fail with [`HttpError::Timeout`] after `limit`.
async fn with_deadline<F: Future>(fut: F, limit: Duration) -> Result<F::Output, HttpError> {
    let fut = std::pin::pin!(fut);
    match future::select(fut, futures_timer::Delay::new(limit)).await {
        Either::Left((output, _)) => Ok(output),
        Either::Right(((), _)) => Err(HttpError::Timeout),
    }
}
