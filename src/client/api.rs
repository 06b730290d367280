use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use uuid::Uuid;

use crate::client::error::{ClientError, ClientResult};
use crate::handlers::{DeleteProjectResponse, ProjectListResponse, ProjectResponse};
use crate::models::{CreateProject, Project, UpdateProject};

/// Transport used by the store to reach the project service
#[async_trait]
pub trait ProjectsApi: Send + Sync {
    async fn list(&self) -> ClientResult<Vec<Project>>;

    async fn create(&self, draft: &CreateProject) -> ClientResult<Project>;

    /// `Ok(None)` when the project does not exist
    async fn get(&self, id: Uuid) -> ClientResult<Option<Project>>;

    async fn update(&self, id: Uuid, patch: &UpdateProject) -> ClientResult<Project>;

    async fn delete(&self, id: Uuid) -> ClientResult<()>;
}

/// Connection settings for [`HttpProjectsApi`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Session token sent as `Authorization: Bearer`
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            token: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// HTTP transport speaking the `/api/projects` JSON protocol
pub struct HttpProjectsApi {
    client: Client,
    config: ClientConfig,
}

impl HttpProjectsApi {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        let builder = self.client.request(method, url);
        match &self.config.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> ClientResult<T> {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(api_error(response, fallback).await);
        }
        Ok(response.json::<T>().await?)
    }
}

/// Build an error from a failed response, preferring the server's message
async fn api_error(response: Response, fallback: &str) -> ClientError {
    let status = response.status().as_u16();
    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.error)
        .unwrap_or_else(|| fallback.to_string());

    ClientError::Api { status, message }
}

#[async_trait]
impl ProjectsApi for HttpProjectsApi {
    async fn list(&self) -> ClientResult<Vec<Project>> {
        let body: ProjectListResponse = self
            .send(
                self.request(Method::GET, "/api/projects"),
                "Failed to load projects",
            )
            .await?;
        Ok(body.projects)
    }

    async fn create(&self, draft: &CreateProject) -> ClientResult<Project> {
        let body: ProjectResponse = self
            .send(
                self.request(Method::POST, "/api/projects").json(draft),
                "Failed to create project",
            )
            .await?;
        Ok(body.project)
    }

    async fn get(&self, id: Uuid) -> ClientResult<Option<Project>> {
        let response = self
            .request(Method::GET, &format!("/api/projects/{}", id))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(api_error(response, "Failed to fetch project").await);
        }

        let body: ProjectResponse = response.json().await?;
        Ok(Some(body.project))
    }

    async fn update(&self, id: Uuid, patch: &UpdateProject) -> ClientResult<Project> {
        let body: ProjectResponse = self
            .send(
                self.request(Method::PUT, &format!("/api/projects/{}", id))
                    .json(patch),
                "Failed to update project",
            )
            .await?;
        Ok(body.project)
    }

    async fn delete(&self, id: Uuid) -> ClientResult<()> {
        let _: DeleteProjectResponse = self
            .send(
                self.request(Method::DELETE, &format!("/api/projects/{}", id)),
                "Failed to delete project",
            )
            .await?;
        Ok(())
    }
}
