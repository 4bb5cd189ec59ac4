//! Core Platera library (API client, session, route guard, config).

pub mod config;
pub mod error;
pub mod form;
pub mod guard;
pub mod http;
pub mod refresh;
pub mod resources;
pub mod session;
pub mod store;

pub use error::{ApiError, ApiErrorKind, ApiResult};
pub use form::{FilePart, FormData};
pub use http::{ApiClient, ApiResponse, RequestBody, RequestOptions, SessionEvent};
pub use session::{AuthState, Session};
pub use store::{FileStore, MemoryStore, TokenStore};
