mod error;
mod handlers;
mod router;
mod types;

pub use error::bad_json;
pub use router::handle_request;
pub use types::{AppState, Request};
pub use handlers::core::select_workspace;
