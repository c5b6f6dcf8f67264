//! Typed client for the TaskFlow API: wraps every route, attaches the bearer
//! token once a login succeeded, and normalizes envelope errors.

pub mod session;
pub mod state;
pub mod translate;

use crate::models::{
    Envelope, LoginRequest, LoginResponse, NewProject, NewTask, ProjectDto, ProjectPatch,
    RegisterRequest, TaskDto, TaskPatch, UserDto,
};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with `success:false`; carries the envelope message.
    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("unexpected response shape")]
    MalformedResponse,

    #[error("{0}")]
    Refused(String),
}

pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        ApiClient {
            http: Client::new(),
            base_url: base_url.into(),
            token: None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Restore a token from a previous session.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Option<T>, ClientError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .json::<Envelope<serde_json::Value>>()
                .await
                .map(|envelope| envelope.message)
                .unwrap_or_else(|_| status.to_string());
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|_| ClientError::MalformedResponse)?;
        Ok(envelope.data)
    }

    async fn send_expecting<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        self.send(request)
            .await?
            .ok_or(ClientError::MalformedResponse)
    }

    // ==================== auth ====================

    /// On success the issued token is kept and attached to every later call.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<UserDto, ClientError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self
            .send_expecting(self.http.post(self.url("/api/login")).json(&body))
            .await?;
        self.token = Some(response.token);
        Ok(response.user)
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<UserDto, ClientError> {
        let body = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        };
        self.send_expecting(self.http.post(self.url("/api/register")).json(&body))
            .await
    }

    // ==================== tasks ====================

    pub async fn get_tasks(&self, limit: Option<i64>) -> Result<Vec<TaskDto>, ClientError> {
        let path = match limit {
            Some(limit) => format!("/api/tasks?limit={limit}"),
            None => "/api/tasks".to_string(),
        };
        self.send_expecting(self.http.get(self.url(&path))).await
    }

    pub async fn get_task(&self, id: i64) -> Result<TaskDto, ClientError> {
        self.send_expecting(self.http.get(self.url(&format!("/api/tasks/{id}"))))
            .await
    }

    pub async fn create_task(&self, task: &NewTask) -> Result<TaskDto, ClientError> {
        self.send_expecting(self.http.post(self.url("/api/tasks")).json(task))
            .await
    }

    pub async fn update_task(&self, id: i64, patch: &TaskPatch) -> Result<TaskDto, ClientError> {
        self.send_expecting(
            self.http
                .put(self.url(&format!("/api/tasks/{id}")))
                .json(patch),
        )
        .await
    }

    pub async fn delete_task(&self, id: i64) -> Result<(), ClientError> {
        self.send::<serde_json::Value>(self.http.delete(self.url(&format!("/api/tasks/{id}"))))
            .await?;
        Ok(())
    }

    // ==================== projects ====================

    pub async fn get_projects(&self) -> Result<Vec<ProjectDto>, ClientError> {
        self.send_expecting(self.http.get(self.url("/api/projects")))
            .await
    }

    pub async fn get_project(&self, id: i64) -> Result<ProjectDto, ClientError> {
        self.send_expecting(self.http.get(self.url(&format!("/api/projects/{id}"))))
            .await
    }

    pub async fn create_project(&self, project: &NewProject) -> Result<ProjectDto, ClientError> {
        self.send_expecting(self.http.post(self.url("/api/projects")).json(project))
            .await
    }

    pub async fn update_project(
        &self,
        id: i64,
        patch: &ProjectPatch,
    ) -> Result<ProjectDto, ClientError> {
        self.send_expecting(
            self.http
                .put(self.url(&format!("/api/projects/{id}")))
                .json(patch),
        )
        .await
    }

    pub async fn delete_project(&self, id: i64) -> Result<(), ClientError> {
        self.send::<serde_json::Value>(
            self.http.delete(self.url(&format!("/api/projects/{id}"))),
        )
        .await?;
        Ok(())
    }
}
