//! Auth sub-client — login, logout, session validation, user profile.

use crate::auth::{LoginRequest, Profile, RegisterRequest, TokenPair};
use crate::client::FxMarketClient;
use crate::error::{AuthError, HttpError, SdkError};

/// Sub-client for authentication operations.
pub struct Auth<'a> {
    pub(crate) client: &'a FxMarketClient,
}

impl<'a> Auth<'a> {
    /// Log in with username and password and return the user's profile.
    ///
    /// Stores the token pair in the session (and its token store), then
    /// hydrates the profile from `GET /api/auth/me`. Bad credentials surface
    /// as [`AuthError::LoginFailed`].
    pub async fn login(&self, username: &str, password: &str) -> Result<Profile, SdkError> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let url = format!("{}/auth/login", self.client.http.api_url());

        let tokens: TokenPair = match self.client.http.post_anonymous(&url, &request).await {
            Ok(tokens) => tokens,
            Err(HttpError::Unauthorized) => {
                return Err(AuthError::LoginFailed("invalid credentials".to_string()).into())
            }
            Err(HttpError::BadRequest(msg) | HttpError::NotFound(msg)) => {
                return Err(AuthError::LoginFailed(msg).into())
            }
            Err(e) => return Err(e.into()),
        };

        self.client
            .http
            .session()
            .init(tokens.access_token, tokens.refresh_token)
            .await;
        tracing::info!(username, "logged in");

        self.check_session().await
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, request: &RegisterRequest) -> Result<serde_json::Value, SdkError> {
        let url = format!("{}/auth/register", self.client.http.api_url());
        Ok(self.client.http.post_anonymous(&url, request).await?)
    }

    /// Validate the current session and return the full user profile.
    ///
    /// Goes through the regular authenticated path, so an expired access
    /// token is refreshed transparently. On failure the cached profile is
    /// cleared and the error returned.
    pub async fn check_session(&self) -> Result<Profile, SdkError> {
        let url = format!("{}/auth/me", self.client.http.api_url());

        let profile: Profile = match self.client.http.get(&url).await {
            Ok(profile) => profile,
            Err(e) => {
                *self.client.profile.write().await = None;
                return Err(e);
            }
        };

        *self.client.profile.write().await = Some(profile.clone());
        Ok(profile)
    }

    /// Resume a persisted session at startup.
    ///
    /// Returns `Ok(None)` when there is nothing to resume or the stored
    /// session has been rejected (in which case it is torn down). Transport
    /// failures are returned and leave the stored tokens alone.
    pub async fn restore(&self) -> Result<Option<Profile>, SdkError> {
        if !self.client.http.session().restore().await? {
            return Ok(None);
        }

        match self.check_session().await {
            Ok(profile) => Ok(Some(profile)),
            Err(e)
                if e.is_session_terminated()
                    || matches!(e, SdkError::Http(HttpError::Unauthorized)) =>
            {
                tracing::info!(error = %e, "stored session rejected");
                self.client.http.session().teardown().await;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Log out locally: drop both tokens, the stored record and the profile.
    pub async fn logout(&self) {
        self.client.http.session().teardown().await;
        *self.client.profile.write().await = None;
        tracing::info!("logged out");
    }

    /// Cached profile from the last successful `login`/`check_session`.
    pub async fn profile(&self) -> Option<Profile> {
        self.client.profile.read().await.clone()
    }

    /// Check if currently authenticated (cached profile and a live session).
    ///
    /// For a server-validated check, use `check_session()` instead.
    pub async fn is_authenticated(&self) -> bool {
        self.client.profile.read().await.is_some() && self.client.http.session().is_active().await
    }
}
