pub mod context;
pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;

pub use context::{AppState, AuthContext};
pub use error::ApiError;
pub use router::api_router;
