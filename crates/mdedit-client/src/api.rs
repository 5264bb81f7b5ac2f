//! Typed access to the document backend.
//!
//! [`DocumentApi`] is the seam every controller talks through;
//! [`RemoteDocumentClient`] is the HTTP implementation. Each call is one
//! round trip. Failures are logged here and returned as [`ClientError`]
//! values, never panics.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::COOKIE;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use uuid::Uuid;

use mdedit_shared::constants::{
    COOKIE_AUTH_SESSION, PATH_DOCUMENTS, PATH_DOCUMENTS_ALL, PATH_DOCUMENTS_CREATE,
    PATH_DOCUMENTS_DELETE, PATH_DOCUMENTS_UPDATE, PATH_USERS_ME,
};
use mdedit_shared::protocol::{CreateDocumentRequest, UpdateDocumentRequest};
use mdedit_shared::{Document, MdEditError, User};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// Remote document operations used by the controllers.
#[async_trait]
pub trait DocumentApi: Send + Sync {
    async fn list_documents(&self) -> Result<Vec<Document>>;

    async fn fetch_document(&self, uuid: Uuid) -> Result<Document>;

    /// Create an empty document owned by the authenticated user.
    async fn create_document(&self, title: &str) -> Result<Document>;

    async fn update_document(&self, uuid: Uuid, title: &str, content: &str) -> Result<Document>;

    async fn delete_document(&self, uuid: Uuid) -> Result<()>;

    /// `None` whenever the session is not usable, for whatever reason.
    async fn check_identity(&self) -> Option<User>;

    /// Replace the session credentials. `None` logs out.
    fn set_session(&self, token: Option<String>);
}

/// HTTP client for the document backend, authenticated by session cookie.
pub struct RemoteDocumentClient {
    http: reqwest::Client,
    base_url: String,
    session: RwLock<Option<String>>,
    /// Owner stamped on created documents; learned from the identity check.
    owner: RwLock<Option<Uuid>>,
}

impl RemoteDocumentClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.server_url.trim_end_matches('/').to_string(),
            session: RwLock::new(config.session_token.clone()),
            owner: RwLock::new(None),
        })
    }

    pub fn has_session(&self) -> bool {
        self.session.read().map(|s| s.is_some()).unwrap_or(false)
    }

    pub fn owner(&self) -> Option<Uuid> {
        self.owner.read().ok().and_then(|o| *o)
    }

    fn set_owner(&self, owner: Option<Uuid>) {
        if let Ok(mut guard) = self.owner.write() {
            *guard = owner;
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_session(&self, req: RequestBuilder) -> RequestBuilder {
        let token = self.session.read().ok().and_then(|s| s.clone());
        match token {
            Some(token) => req.header(COOKIE, format!("{COOKIE_AUTH_SESSION}={token}")),
            None => req,
        }
    }

    /// Send the request and return the raw body of a 2xx response.
    async fn execute(&self, req: RequestBuilder) -> Result<Vec<u8>> {
        let resp = self.with_session(req).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::from_status(status.as_u16()));
        }
        Ok(resp.bytes().await?.to_vec())
    }

    async fn execute_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let body = self.execute(req).await?;
        let value = serde_json::from_slice(&body).map_err(MdEditError::from)?;
        Ok(value)
    }
}

fn logged<T>(op: &'static str, result: Result<T>) -> Result<T> {
    if let Err(ref e) = result {
        match e {
            ClientError::NotAuthenticated => info!(op, "Request rejected: not authenticated"),
            e => warn!(op, error = %e, "Request failed"),
        }
    }
    result
}

#[async_trait]
impl DocumentApi for RemoteDocumentClient {
    async fn list_documents(&self) -> Result<Vec<Document>> {
        let req = self.http.get(self.url(PATH_DOCUMENTS_ALL));
        let docs: Result<Vec<Document>> = self.execute_json(req).await;
        if let Ok(ref docs) = docs {
            debug!(count = docs.len(), "Fetched document list");
        }
        logged("list_documents", docs)
    }

    async fn fetch_document(&self, uuid: Uuid) -> Result<Document> {
        let req = self.http.get(self.url(&format!("{PATH_DOCUMENTS}/{uuid}")));
        logged("fetch_document", self.execute_json(req).await)
    }

    async fn create_document(&self, title: &str) -> Result<Document> {
        let Some(owner) = self.owner() else {
            return logged("create_document", Err(ClientError::NotAuthenticated));
        };

        let body = CreateDocumentRequest::new(title, owner, Utc::now());
        info!(uuid = %body.uuid, title = %body.title, "Creating document");

        let req = self.http.post(self.url(PATH_DOCUMENTS_CREATE)).json(&body);
        logged("create_document", self.execute_json(req).await)
    }

    async fn update_document(&self, uuid: Uuid, title: &str, content: &str) -> Result<Document> {
        let body = UpdateDocumentRequest {
            uuid,
            title: title.to_string(),
            content: content.to_string(),
            updated_at: Utc::now(),
        };
        debug!(uuid = %uuid, len = content.len(), "Updating document");

        let req = self
            .http
            .put(self.url(&format!("{PATH_DOCUMENTS_UPDATE}/{uuid}")))
            .json(&body);
        logged("update_document", self.execute_json(req).await)
    }

    async fn delete_document(&self, uuid: Uuid) -> Result<()> {
        let req = self
            .http
            .delete(self.url(&format!("{PATH_DOCUMENTS_DELETE}/{uuid}")));
        let result = self.execute(req).await.map(|_| ());
        if result.is_ok() {
            info!(uuid = %uuid, "Document deleted");
        }
        logged("delete_document", result)
    }

    async fn check_identity(&self) -> Option<User> {
        if !self.has_session() {
            info!("No session cookie, not authenticated");
            self.set_owner(None);
            return None;
        }

        let req = self.http.get(self.url(PATH_USERS_ME));
        match logged("check_identity", self.execute_json::<User>(req).await) {
            Ok(user) => {
                info!(user = %user.uuid, username = %user.username, "Authenticated");
                self.set_owner(Some(user.uuid));
                Some(user)
            }
            Err(_) => {
                self.set_owner(None);
                None
            }
        }
    }

    fn set_session(&self, token: Option<String>) {
        if token.is_none() {
            self.set_owner(None);
        }
        if let Ok(mut guard) = self.session.write() {
            *guard = token;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use axum::extract::{Path, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{delete, get, post, put};
    use axum::{Json, Router};
    use tokio::sync::Mutex;

    use super::*;

    const TOKEN: &str = "3b0d2c9e-5f0b-4d64-8c41-2a0f6f0f9a11";

    #[derive(Clone)]
    struct Backend {
        user: User,
        docs: Arc<Mutex<HashMap<Uuid, Document>>>,
        hits: Arc<AtomicUsize>,
    }

    impl Backend {
        fn authorize(&self, headers: &HeaderMap) -> std::result::Result<(), StatusCode> {
            self.hits.fetch_add(1, Ordering::SeqCst);
            let cookie = headers
                .get("cookie")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("");
            if cookie == format!("auth_session={TOKEN}") {
                Ok(())
            } else {
                Err(StatusCode::UNAUTHORIZED)
            }
        }
    }

    async fn me(
        State(b): State<Backend>,
        headers: HeaderMap,
    ) -> std::result::Result<Json<User>, StatusCode> {
        b.authorize(&headers)?;
        Ok(Json(b.user.clone()))
    }

    async fn all(
        State(b): State<Backend>,
        headers: HeaderMap,
    ) -> std::result::Result<Json<Vec<Document>>, StatusCode> {
        b.authorize(&headers)?;
        Ok(Json(b.docs.lock().await.values().cloned().collect()))
    }

    async fn one(
        State(b): State<Backend>,
        headers: HeaderMap,
        Path(uuid): Path<Uuid>,
    ) -> std::result::Result<Json<Document>, StatusCode> {
        b.authorize(&headers)?;
        b.docs
            .lock()
            .await
            .get(&uuid)
            .cloned()
            .map(Json)
            .ok_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    async fn create(
        State(b): State<Backend>,
        headers: HeaderMap,
        Json(req): Json<CreateDocumentRequest>,
    ) -> std::result::Result<Json<Document>, StatusCode> {
        b.authorize(&headers)?;
        let doc = req.to_document();
        b.docs.lock().await.insert(doc.uuid, doc.clone());
        Ok(Json(doc))
    }

    async fn update(
        State(b): State<Backend>,
        headers: HeaderMap,
        Path(uuid): Path<Uuid>,
        Json(req): Json<UpdateDocumentRequest>,
    ) -> std::result::Result<Json<Document>, StatusCode> {
        b.authorize(&headers)?;
        let mut docs = b.docs.lock().await;
        let doc = docs.get_mut(&uuid).ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;
        doc.title = req.title;
        doc.content = req.content;
        doc.updated_at = Some(req.updated_at);
        Ok(Json(doc.clone()))
    }

    async fn remove(
        State(b): State<Backend>,
        headers: HeaderMap,
        Path(uuid): Path<Uuid>,
    ) -> std::result::Result<Json<Document>, StatusCode> {
        b.authorize(&headers)?;
        b.docs
            .lock()
            .await
            .remove(&uuid)
            .map(Json)
            .ok_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    async fn spawn_backend() -> (SocketAddr, Backend) {
        let backend = Backend {
            user: User {
                uuid: Uuid::new_v4(),
                username: "ada".into(),
                email: "ada@example.com".into(),
                created_at: None,
                updated_at: None,
            },
            docs: Arc::new(Mutex::new(HashMap::new())),
            hits: Arc::new(AtomicUsize::new(0)),
        };

        let app = Router::new()
            .route("/users/me", get(me))
            .route("/documents/all", get(all))
            .route("/documents/:uuid", get(one))
            .route("/documents/create", post(create))
            .route("/documents/update/:uuid", put(update))
            .route("/documents/delete/:uuid", delete(remove))
            .with_state(backend.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (addr, backend)
    }

    fn client_for(addr: SocketAddr, token: Option<&str>) -> RemoteDocumentClient {
        let config = ClientConfig {
            server_url: format!("http://{addr}"),
            session_token: token.map(str::to_string),
            request_timeout: Duration::from_secs(5),
            ..ClientConfig::default()
        };
        RemoteDocumentClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_identity_requires_session() {
        let (addr, backend) = spawn_backend().await;

        let anonymous = client_for(addr, None);
        assert!(anonymous.check_identity().await.is_none());
        assert_eq!(backend.hits.load(Ordering::SeqCst), 0);

        let wrong = client_for(addr, Some("nope"));
        assert!(wrong.check_identity().await.is_none());
        assert!(wrong.owner().is_none());

        let client = client_for(addr, Some(TOKEN));
        let user = client.check_identity().await.unwrap();
        assert_eq!(user.username, "ada");
        assert_eq!(client.owner(), Some(backend.user.uuid));
    }

    #[tokio::test]
    async fn test_create_without_identity_sends_nothing() {
        let (addr, backend) = spawn_backend().await;
        let client = client_for(addr, Some(TOKEN));

        let err = client.create_document("x").await.unwrap_err();
        assert!(matches!(err, ClientError::NotAuthenticated));
        assert_eq!(backend.hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_document_crud() {
        let (addr, backend) = spawn_backend().await;
        let client = client_for(addr, Some(TOKEN));
        client.check_identity().await.unwrap();

        let created = client.create_document("Groceries").await.unwrap();
        assert_eq!(created.owner_uuid, Some(backend.user.uuid));
        assert!(created.content.is_empty());

        let fetched = client.fetch_document(created.uuid).await.unwrap();
        assert_eq!(fetched.title, "Groceries");

        let updated = client
            .update_document(created.uuid, "Groceries", "- eggs")
            .await
            .unwrap();
        assert_eq!(updated.content, "- eggs");
        let again = client
            .update_document(created.uuid, "Groceries", "- eggs")
            .await
            .unwrap();
        assert_eq!(again.content, updated.content);

        assert_eq!(client.list_documents().await.unwrap().len(), 1);

        client.delete_document(created.uuid).await.unwrap();
        assert!(client.list_documents().await.unwrap().is_empty());
        assert!(matches!(
            client.fetch_document(created.uuid).await,
            Err(ClientError::Status { status: 500 })
        ));
    }

    #[tokio::test]
    async fn test_expired_session_is_not_authenticated() {
        let (addr, _backend) = spawn_backend().await;
        let client = client_for(addr, Some("expired"));
        assert!(matches!(
            client.list_documents().await,
            Err(ClientError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let app = Router::new().route("/documents/all", get(|| async { "not json" }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = client_for(addr, Some(TOKEN));
        assert!(matches!(
            client.list_documents().await,
            Err(ClientError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(addr, Some(TOKEN));
        assert!(matches!(
            client.list_documents().await,
            Err(ClientError::Network(_))
        ));
        assert!(client.check_identity().await.is_none());
    }

    #[tokio::test]
    async fn test_logout_forgets_owner() {
        let (addr, _backend) = spawn_backend().await;
        let client = client_for(addr, Some(TOKEN));
        client.check_identity().await.unwrap();

        client.set_session(None);
        assert!(!client.has_session());
        assert!(client.owner().is_none());
    }
}
