pub mod handlers;
pub mod jobs;
pub mod middleware;
pub mod resolve;
pub mod routes;
pub mod search;

#[cfg(test)]
pub mod testing;

pub use routes::create_router;
