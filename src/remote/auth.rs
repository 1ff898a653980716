use std::sync::LazyLock;

use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use uuid::Uuid;

use super::StoreError;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

/// The identity the service resolved for a session.
#[derive(Debug, Clone, Deserialize)]
pub struct UserIdentity {
    pub id: Uuid,
    pub email: String,
}

/// A signed-in session: bearer token plus the resolved identity.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user: UserIdentity,
}

/// Client for the hosted auth endpoint (password grant, sign-out, whoami).
#[derive(Clone)]
pub struct AuthClient {
    base_url: String,
    service_key: String,
    http: Client,
}

impl AuthClient {
    pub fn new(base_url: &str, service_key: &str) -> Result<Self, StoreError> {
        let http = Client::builder().build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
            http,
        })
    }

    /// Exchange email and password for a session.
    ///
    /// The email shape is validated locally; a malformed address never
    /// reaches the network.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, StoreError> {
        if !EMAIL_RE.is_match(email) {
            return Err(StoreError::validation("email", "not a valid address"));
        }
        if password.is_empty() {
            return Err(StoreError::validation("password", "must not be empty"));
        }

        let resp = self
            .http
            .post(format!("{}/auth/v1/token", self.base_url))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.service_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(StoreError::Service {
                context: "sign_in",
                status,
                body,
            });
        }

        let session: Session = serde_json::from_str(&body)?;
        log::info!("Signed in as {}", session.user.email);
        Ok(session)
    }

    /// Resolve the identity behind an access token. An expired or revoked
    /// token is not an error; it simply yields no identity.
    pub async fn current_user(
        &self,
        access_token: &str,
    ) -> Result<Option<UserIdentity>, StoreError> {
        let resp = self
            .http
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.service_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Ok(None);
        }

        let body = resp.text().await?;
        if !status.is_success() {
            return Err(StoreError::Service {
                context: "current_user",
                status,
                body,
            });
        }

        Ok(Some(serde_json::from_str(&body)?))
    }

    /// Invalidate the session on the service side.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), StoreError> {
        let resp = self
            .http
            .post(format!("{}/auth/v1/logout", self.base_url))
            .header("apikey", &self.service_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = resp.status();
        // An already-dead token is as signed-out as it gets.
        if status.is_success() || status == StatusCode::UNAUTHORIZED {
            log::info!("Signed out");
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        Err(StoreError::Service {
            context: "sign_out",
            status,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape_is_checked() {
        assert!(EMAIL_RE.is_match("anna@example.com"));
        assert!(EMAIL_RE.is_match("a.b+c@mail.example.org"));
        assert!(!EMAIL_RE.is_match("anna"));
        assert!(!EMAIL_RE.is_match("anna@"));
        assert!(!EMAIL_RE.is_match("anna@host"));
        assert!(!EMAIL_RE.is_match("an na@example.com"));
    }

    #[test]
    fn session_deserializes_service_payload() {
        let body = r#"{
            "access_token": "tok",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "ref",
            "user": { "id": "4b1c6d2e-9f5a-4d0b-8a4e-1d2c3b4a5f60", "email": "anna@example.com", "role": "authenticated" }
        }"#;
        let session: Session = serde_json::from_str(body).unwrap();
        assert_eq!(session.access_token, "tok");
        assert_eq!(session.user.email, "anna@example.com");
    }
}
