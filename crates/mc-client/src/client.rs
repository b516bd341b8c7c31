//! Authenticated HTTP client for the mail service

use mc_common::LoginRequest;
use mc_credentials::CredentialStore;
use reqwest::header::ACCEPT;
use reqwest::Method;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::MailApi;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::response::ResponseBody;

/// Single entry point for every remote call.
///
/// The credential store is read while each request is built: a present token
/// is sent as `Authorization: Bearer <token>`, an absent one sends no
/// authorization header at all. Nothing is retried.
#[derive(Clone)]
pub struct ApiClient {
    config: Arc<ClientConfig>,
    http_client: reqwest::Client,
    credentials: Arc<dyn CredentialStore>,
}

impl ApiClient {
    pub fn new(config: ClientConfig, credentials: Arc<dyn CredentialStore>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        info!(
            base_url = %config.base_url,
            credential_store = credentials.name(),
            "ApiClient initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            http_client,
            credentials,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    /// Execute one request and normalize the outcome.
    ///
    /// A body, when given, is sent as JSON with a JSON content type.
    pub async fn request<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<ResponseBody>
    where
        B: Serialize + ?Sized,
    {
        let url = self.config.url(path);
        let mut request = self
            .http_client
            .request(method.clone(), &url)
            .header(ACCEPT, "application/json");

        if let Some(body) = body {
            request = request.json(body);
        }

        let token = self.credentials.get().await;
        if let Some(token) = &token {
            request = request.bearer_auth(token);
        }

        debug!(
            %method,
            path,
            has_body = body.is_some(),
            has_credential = token.is_some(),
            "Sending request"
        );

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let error = ClientError::from_transport(e);
                warn!(%method, path, error = %error, "Request did not complete");
                return Err(error);
            }
        };

        let status = response.status();
        let body = ResponseBody::read(response).await?;

        if status.is_success() {
            debug!(%method, path, status = status.as_u16(), "Request succeeded");
            Ok(body)
        } else {
            let error = ClientError::from_status(status, &body);
            warn!(
                %method,
                path,
                status = status.as_u16(),
                error = %error,
                "Request failed"
            );
            Err(error)
        }
    }

    /// Log in and store the returned credential
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<()> {
        let response = self
            .login(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;

        let token = response
            .access_token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ClientError::InvalidResponse("missing accessToken".to_string()))?;

        self.credentials.set(&token).await;
        info!("Signed in");
        Ok(())
    }

    /// Drop the stored credential
    pub async fn sign_out(&self) {
        self.credentials.clear().await;
        info!("Signed out");
    }

    pub async fn is_authenticated(&self) -> bool {
        self.credentials.is_authenticated().await
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.config.base_url)
            .field("credential_store", &self.credentials.name())
            .finish()
    }
}
