pub mod channels;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod stream;

pub use error::ErrorResponse;
pub use routes::create_router;
