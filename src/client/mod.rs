pub mod forms;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::auth::dto::{LoginRequest, PublicUser, RegisterRequest};
use crate::events::dto::{
    ContributeRequest, ContributeResponse, DeleteResponse, EventListResponse, EventResponse,
    UpdateEventRequest,
};
use self::forms::EventForm;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error status; `message` is the server's
    /// `{"error": …}` text, surfaced verbatim.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("image exceeds the 5 MB upload limit")]
    ImageTooLarge,
}

/// Typed client for the REST surface. Carries its own cookie store, so the
/// HTTP-only session cookie set by `login` travels with every later call.
///
/// Identity is process-local and only known after an explicit `login` in
/// this session; nothing probes the server for session state at startup.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Option<PublicUser>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self {
            http,
            base_url,
            session: None,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    pub fn session(&self) -> Option<&PublicUser> {
        self.session.as_ref()
    }

    /// Registration does not log the new user in; the flow continues with an
    /// explicit `login`.
    pub async fn register(&self, request: &RegisterRequest) -> Result<PublicUser, ClientError> {
        let res = self
            .http
            .post(self.url("/register"))
            .json(request)
            .send()
            .await?;
        into_result(res).await
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<PublicUser, ClientError> {
        let res = self
            .http
            .post(self.url("/login"))
            .json(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        let user: PublicUser = into_result(res).await?;
        self.session = Some(user.clone());
        Ok(user)
    }

    pub async fn logout(&mut self) -> Result<bool, ClientError> {
        let res = self.http.post(self.url("/logout")).send().await?;
        let ok: bool = into_result(res).await?;
        self.session = None;
        Ok(ok)
    }

    pub async fn profile(&self) -> Result<PublicUser, ClientError> {
        let res = self.http.get(self.url("/profile")).send().await?;
        into_result(res).await
    }

    pub async fn events(
        &self,
        page: i64,
        limit: i64,
        tags: Option<&str>,
        active: Option<bool>,
    ) -> Result<EventListResponse, ClientError> {
        let mut query: Vec<(&str, String)> =
            vec![("page", page.to_string()), ("limit", limit.to_string())];
        if let Some(tags) = tags {
            query.push(("tags", tags.to_string()));
        }
        if let Some(active) = active {
            query.push(("isActive", active.to_string()));
        }
        let res = self
            .http
            .get(self.url("/events"))
            .query(&query)
            .send()
            .await?;
        into_result(res).await
    }

    pub async fn event(&self, id: &str) -> Result<EventResponse, ClientError> {
        let res = self
            .http
            .get(self.url(&format!("/events/{id}")))
            .send()
            .await?;
        into_result(res).await
    }

    pub async fn my_events(&self) -> Result<Vec<EventResponse>, ClientError> {
        let res = self.http.get(self.url("/my-events")).send().await?;
        into_result(res).await
    }

    pub async fn create_event(&self, form: EventForm) -> Result<EventResponse, ClientError> {
        let multipart = form.into_multipart()?;
        let res = self
            .http
            .post(self.url("/events"))
            .multipart(multipart)
            .send()
            .await?;
        into_result(res).await
    }

    pub async fn update_event(
        &self,
        id: &str,
        request: &UpdateEventRequest,
    ) -> Result<EventResponse, ClientError> {
        let res = self
            .http
            .put(self.url(&format!("/events/{id}")))
            .json(request)
            .send()
            .await?;
        into_result(res).await
    }

    pub async fn delete_event(&self, id: &str) -> Result<DeleteResponse, ClientError> {
        let res = self
            .http
            .delete(self.url(&format!("/events/{id}")))
            .send()
            .await?;
        into_result(res).await
    }

    /// Contributions go out without any session requirement.
    pub async fn contribute(
        &self,
        id: &str,
        amount: f64,
    ) -> Result<ContributeResponse, ClientError> {
        let res = self
            .http
            .patch(self.url(&format!("/events/{id}/contribute")))
            .json(&ContributeRequest {
                amount: Some(amount),
            })
            .send()
            .await?;
        into_result(res).await
    }
}

async fn into_result<T: DeserializeOwned>(res: reqwest::Response) -> Result<T, ClientError> {
    let status = res.status();
    if status.is_success() {
        Ok(res.json().await?)
    } else {
        let body = res.text().await.unwrap_or_default();
        Err(decode_error_body(status.as_u16(), &body))
    }
}

fn decode_error_body(status: u16, body: &str) -> ClientError {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        error: String,
    }
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| {
            if body.is_empty() {
                format!("request failed with status {status}")
            } else {
                body.to_string()
            }
        });
    ClientError::Api { status, message }
}
