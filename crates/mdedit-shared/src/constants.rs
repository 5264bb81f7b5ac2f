use std::time::Duration;

/// Application name
pub const APP_NAME: &str = "Markdown Edit";

/// Name of the cookie carrying the backend session id
pub const COOKIE_AUTH_SESSION: &str = "auth_session";

/// Identity check endpoint
pub const PATH_USERS_ME: &str = "/users/me";

/// Document endpoints (the `{uuid}` suffix is appended by the client)
pub const PATH_DOCUMENTS_ALL: &str = "/documents/all";
pub const PATH_DOCUMENTS: &str = "/documents";
pub const PATH_DOCUMENTS_CREATE: &str = "/documents/create";
pub const PATH_DOCUMENTS_UPDATE: &str = "/documents/update";
pub const PATH_DOCUMENTS_DELETE: &str = "/documents/delete";

/// Browser-facing auth pages on the backend
pub const PATH_AUTH_LOGIN: &str = "/auth/google/login";
pub const PATH_AUTH_LOGOUT: &str = "/auth/logout";

/// Quiet period before an edit is persisted
pub const AUTOSAVE_DELAY: Duration = Duration::from_millis(500);

/// How long the "document deleted" notice stays up
pub const NOTICE_DURATION: Duration = Duration::from_millis(3000);

/// Default backend base URL (local development)
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

/// Default markdown render endpoint used for HTML export
pub const DEFAULT_RENDER_URL: &str = "https://api.github.com/markdown";

pub const MSG_DOCUMENT_DELETED: &str = "Document deleted successfully!";
pub const MSG_NO_DOCUMENTS: &str = "You must create a document first!";
