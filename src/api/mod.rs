pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiJson};
pub use routes::create_router;
pub use state::AppState;
