//! Fastly account API client
//!
//! Users live on the plain REST surface; invitations live on a JSON:API
//! surface with its own envelope and content type. Both authenticate with
//! the `Fastly-Key` header.

use crate::directory::AccountDirectory;
use crate::error::{FastlyError, Result};
use crate::model::{Invitation, RemoteUser, Role, UserUpdate};
use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use usermgt_config::ProviderConfig;

const USER_AGENT: &str = concat!("usermgt/", env!("CARGO_PKG_VERSION"));
const JSON_API: &str = "application/vnd.api+json";

/// Fastly account API client
#[derive(Clone)]
pub struct FastlyClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for FastlyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastlyClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl FastlyClient {
    /// Create a client from provider configuration
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or(FastlyError::MissingApiKey)?;

        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT);
        if config.force_http2 {
            builder = builder.http2_prior_knowledge();
        }
        let client = builder
            .build()
            .map_err(|e| FastlyError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// The user the API key belongs to
    pub async fn current_user(&self) -> Result<RemoteUser> {
        let request = self.client.get(self.url("/current_user"));
        self.fetch(request, None).await
    }

    /// Send a request and fail on non-2xx. A 404 becomes `NotFound(target)`
    /// when the request addressed a specific object.
    async fn send(
        &self,
        request: RequestBuilder,
        target: Option<&str>,
    ) -> Result<reqwest::Response> {
        let response = request.header("Fastly-Key", &self.api_key).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::NOT_FOUND
            && let Some(target) = target
        {
            return Err(FastlyError::NotFound(target.to_string()));
        }
        tracing::debug!("Fastly API error {}: {}", status, body);
        Err(FastlyError::Remote {
            status: status.as_u16(),
            body,
        })
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        target: Option<&str>,
    ) -> Result<T> {
        let response = self.send(request, target).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| FastlyError::Decode(e.to_string()))
    }

    fn json_api(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(reqwest::header::CONTENT_TYPE, JSON_API)
            .header(reqwest::header::ACCEPT, JSON_API)
    }
}

#[async_trait]
impl AccountDirectory for FastlyClient {
    async fn current_account_id(&self) -> Result<String> {
        let user = self.current_user().await?;
        if user.customer_id.is_empty() {
            return Err(FastlyError::Decode(
                "current_user response has no customer_id".to_string(),
            ));
        }
        Ok(user.customer_id)
    }

    async fn list_users(&self, account_id: &str) -> Result<Vec<RemoteUser>> {
        let request = self
            .client
            .get(self.url(&format!("/customer/{}/users", account_id)));
        self.fetch(request, None).await
    }

    async fn get_user(&self, user_id: &str) -> Result<RemoteUser> {
        let request = self.client.get(self.url(&format!("/user/{}", user_id)));
        self.fetch(request, Some(&format!("user {}", user_id))).await
    }

    async fn update_user(&self, user_id: &str, update: &UserUpdate) -> Result<RemoteUser> {
        let request = self
            .client
            .put(self.url(&format!("/user/{}", user_id)))
            .json(update);
        self.fetch(request, Some(&format!("user {}", user_id))).await
    }

    async fn delete_user(&self, user_id: &str) -> Result<()> {
        let request = self.client.delete(self.url(&format!("/user/{}", user_id)));
        self.send(request, Some(&format!("user {}", user_id)))
            .await?;
        Ok(())
    }

    async fn list_invitations(&self) -> Result<Vec<Invitation>> {
        let request = self.json_api(self.client.get(self.url("/invitations")));
        let envelope: InvitationListResponse = self.fetch(request, None).await?;
        Ok(envelope.data.into_iter().map(Invitation::from).collect())
    }

    async fn create_invitation(
        &self,
        email: &str,
        role: Role,
        account_id: &str,
    ) -> Result<Invitation> {
        let body = InvitationRequest::new(email, role, account_id);
        // Content type must be set before `json` or reqwest adds application/json
        let request = self
            .json_api(self.client.post(self.url("/invitations")))
            .json(&body);
        let envelope: InvitationResponse = self.fetch(request, None).await?;
        Ok(envelope.data.into())
    }

    async fn delete_invitation(&self, invitation_id: &str) -> Result<()> {
        let request = self.json_api(
            self.client
                .delete(self.url(&format!("/invitations/{}", invitation_id))),
        );
        match self
            .send(request, Some(&format!("invitation {}", invitation_id)))
            .await
        {
            Ok(_) => Ok(()),
            // Expired invitations disappear on their own
            Err(FastlyError::NotFound(_)) => {
                tracing::debug!("Invitation {} already gone", invitation_id);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

// ============ API Types ============

#[derive(Debug, Serialize)]
struct InvitationRequest {
    data: InvitationRequestData,
}

#[derive(Debug, Serialize)]
struct InvitationRequestData {
    #[serde(rename = "type")]
    r#type: &'static str,
    attributes: InvitationRequestAttributes,
    relationships: InvitationRelationships,
}

#[derive(Debug, Serialize)]
struct InvitationRequestAttributes {
    email: String,
    limit_services: bool,
    role: Role,
}

#[derive(Debug, Serialize)]
struct InvitationRelationships {
    customer: CustomerRelationship,
}

#[derive(Debug, Serialize)]
struct CustomerRelationship {
    data: ResourceIdentifier,
}

#[derive(Debug, Serialize)]
struct ResourceIdentifier {
    id: String,
    #[serde(rename = "type")]
    r#type: &'static str,
}

impl InvitationRequest {
    fn new(email: &str, role: Role, account_id: &str) -> Self {
        Self {
            data: InvitationRequestData {
                r#type: "invitation",
                attributes: InvitationRequestAttributes {
                    email: email.to_string(),
                    limit_services: false,
                    role,
                },
                relationships: InvitationRelationships {
                    customer: CustomerRelationship {
                        data: ResourceIdentifier {
                            id: account_id.to_string(),
                            r#type: "customer",
                        },
                    },
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct InvitationResponse {
    data: ApiInvitation,
}

#[derive(Debug, Deserialize)]
struct InvitationListResponse {
    #[serde(default)]
    data: Vec<ApiInvitation>,
}

#[derive(Debug, Deserialize)]
struct ApiInvitation {
    id: String,
    #[serde(default)]
    attributes: ApiInvitationAttributes,
}

#[derive(Debug, Default, Deserialize)]
struct ApiInvitationAttributes {
    #[serde(default)]
    email: String,
    #[serde(default)]
    role: String,
    #[serde(default)]
    status_code: i64,
}

impl From<ApiInvitation> for Invitation {
    fn from(inv: ApiInvitation) -> Self {
        Self {
            id: inv.id,
            email: inv.attributes.email,
            role: inv.attributes.role,
            status_code: inv.attributes.status_code,
        }
    }
}
