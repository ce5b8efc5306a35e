pub mod models;
pub mod response;
pub mod routes;

pub use routes::create_router;
