//! Minimal PocketBase REST client covering the record and auth endpoints the
//! dashboard uses.

use crate::models::{AuthResponse, ListResult};
use crate::session::AuthStore;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    /// PocketBase reports missing records and missing collections alike,
    /// either as a 404 or with a "wasn't found" message.
    pub fn is_not_found(&self) -> bool {
        match self {
            ClientError::Api { status, message } => {
                *status == StatusCode::NOT_FOUND.as_u16() || message.contains("wasn't found")
            }
            ClientError::Transport(err) => err.status() == Some(StatusCode::NOT_FOUND),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Clone)]
pub struct PocketBase {
    http: Client,
    base_url: String,
    auth: AuthStore,
}

impl PocketBase {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_auth(base_url, AuthStore::default())
    }

    pub fn with_auth(base_url: impl Into<String>, auth: AuthStore) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            base_url,
            auth,
        }
    }

    /// Same connection pool and server, authenticated through `auth`.
    pub fn authed(&self, auth: AuthStore) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            auth,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth_store(&self) -> &AuthStore {
        &self.auth
    }

    fn records_url(&self, collection: &str) -> String {
        format!("{}/api/collections/{collection}/records", self.base_url)
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match self.auth.token() {
            Some(token) => builder.header(reqwest::header::AUTHORIZATION, token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder.send().await?;
        let response = check(response).await?;
        Ok(response.json().await?)
    }

    pub async fn get_one<T: DeserializeOwned>(&self, collection: &str, id: &str) -> Result<T, ClientError> {
        debug!(collection, id, "pocketbase get_one");
        let url = format!("{}/{id}", self.records_url(collection));
        self.send(self.request(Method::GET, url)).await
    }

    pub async fn create<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        collection: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        debug!(collection, "pocketbase create");
        let url = self.records_url(collection);
        self.send(self.request(Method::POST, url).json(body)).await
    }

    pub async fn update<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        collection: &str,
        id: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        debug!(collection, id, "pocketbase update");
        let url = format!("{}/{id}", self.records_url(collection));
        self.send(self.request(Method::PATCH, url).json(body)).await
    }

    pub async fn get_list<T: DeserializeOwned>(
        &self,
        collection: &str,
        page: u32,
        per_page: u32,
        sort: &str,
    ) -> Result<ListResult<T>, ClientError> {
        debug!(collection, page, per_page, "pocketbase get_list");
        let url = self.records_url(collection);
        let query = [
            ("page", page.to_string()),
            ("perPage", per_page.to_string()),
            ("sort", sort.to_string()),
            ("skipTotal", "1".to_string()),
        ];
        self.send(self.request(Method::GET, url).query(&query)).await
    }

    /// Authenticates against an auth collection and stores the token for
    /// subsequent requests.
    pub async fn auth_with_password(
        &self,
        collection: &str,
        identity: &str,
        password: &str,
    ) -> Result<AuthResponse, ClientError> {
        let url = format!("{}/api/collections/{collection}/auth-with-password", self.base_url);
        let body = serde_json::json!({ "identity": identity, "password": password });
        let auth: AuthResponse = self.send(self.http.post(url).json(&body)).await?;
        self.auth.save(auth.token.clone(), Some(auth.record.clone()));
        Ok(auth)
    }
}

async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<ApiErrorBody>().await {
        Ok(body) if !body.message.is_empty() => body.message,
        _ => status.canonical_reason().unwrap_or("request failed").to_string(),
    };
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16, message: &str) -> ClientError {
        ClientError::Api {
            status,
            message: message.to_string(),
        }
    }

    #[test]
    fn not_found_by_status_or_message() {
        assert!(api(404, "anything").is_not_found());
        assert!(api(400, "Collection context wasn't found.").is_not_found());
        assert!(!api(400, "Failed to create record.").is_not_found());
        assert!(!api(500, "boom").is_not_found());
    }

    #[test]
    fn base_url_trims_trailing_slash() {
        let client = PocketBase::new("http://localhost:8091/");
        assert_eq!(client.base_url(), "http://localhost:8091");
        assert_eq!(
            client.records_url("counters"),
            "http://localhost:8091/api/collections/counters/records"
        );
    }
}
