use crate::domain::task::{CreateTask, Task, UpdateTask};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Error, Debug)]
pub enum ClientError {
    /// Server-provided message from a non-2xx response.
    #[error("{0}")]
    Api(String),
    /// Rejected locally before any network call.
    #[error("{0}")]
    Validation(String),
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Signed-in identity as stored by the client after signup/signin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Server task surface as seen by the client. Abstracted behind a trait so
/// the store can be exercised without a running server.
#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn list_tasks(&self) -> Result<Vec<Task>, ClientError>;
    async fn create_task(&self, req: &CreateTask) -> Result<Task, ClientError>;
    async fn update_task(&self, id: &str, req: &UpdateTask) -> Result<Task, ClientError>;
    async fn delete_task(&self, id: &str) -> Result<(), ClientError>;
}

/// Pulls the server-provided message out of the uniform error body, falling
/// back to the HTTP status when the body is not the expected shape.
async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let message = resp
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|body| {
            body.get("error")
                .and_then(|v| v.as_str())
                .map(str::to_owned)
        })
        .unwrap_or_else(|| format!("Request failed with status {status}"));
    Err(ClientError::Api(message))
}

/// Unauthenticated auth calls: signup and signin bootstrap a [`Session`].
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
}

impl AuthClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    #[instrument(skip(self, password))]
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, ClientError> {
        let resp = self
            .http
            .post(format!("{}/api/users/signup", self.base_url))
            .json(&serde_json::json!({
                "name": name,
                "email": email,
                "password": password,
            }))
            .send()
            .await?;
        let session = check(resp).await?.json::<Session>().await?;
        debug!(user_id = %session.id, "Signed up");
        Ok(session)
    }

    #[instrument(skip(self, password))]
    pub async fn signin(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        let resp = self
            .http
            .post(format!("{}/api/users/signin", self.base_url))
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await?;
        let session = check(resp).await?.json::<Session>().await?;
        debug!(user_id = %session.id, "Signed in");
        Ok(session)
    }

    #[instrument(skip(self, token))]
    pub async fn profile(&self, token: &str) -> Result<Profile, ClientError> {
        let resp = self
            .http
            .get(format!("{}/api/users/profile", self.base_url))
            .bearer_auth(token)
            .send()
            .await?;
        Ok(check(resp).await?.json::<Profile>().await?)
    }
}

/// Bearer-authenticated task CRUD over HTTP.
pub struct HttpTaskApi {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpTaskApi {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    pub fn for_session(base_url: impl Into<String>, session: &Session) -> Self {
        Self::new(base_url, session.token.clone())
    }
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    async fn list_tasks(&self) -> Result<Vec<Task>, ClientError> {
        let resp = self
            .http
            .get(format!("{}/api/tasks", self.base_url))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Ok(check(resp).await?.json::<Vec<Task>>().await?)
    }

    async fn create_task(&self, req: &CreateTask) -> Result<Task, ClientError> {
        let resp = self
            .http
            .post(format!("{}/api/tasks", self.base_url))
            .bearer_auth(&self.token)
            .json(req)
            .send()
            .await?;
        Ok(check(resp).await?.json::<Task>().await?)
    }

    async fn update_task(&self, id: &str, req: &UpdateTask) -> Result<Task, ClientError> {
        let resp = self
            .http
            .put(format!("{}/api/tasks/{id}", self.base_url))
            .bearer_auth(&self.token)
            .json(req)
            .send()
            .await?;
        Ok(check(resp).await?.json::<Task>().await?)
    }

    async fn delete_task(&self, id: &str) -> Result<(), ClientError> {
        let resp = self
            .http
            .delete(format!("{}/api/tasks/{id}", self.base_url))
            .bearer_auth(&self.token)
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }
}
