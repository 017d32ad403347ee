pub mod guard;
pub mod handlers;
pub mod request;
pub mod response;
pub mod router;
pub mod state;

pub use request::TodoRequest;
pub use response::ApiResponse;
pub use router::{handle, route, Route};
pub use state::AppState;
