mod body;
mod client_ip;
mod csrf;
mod error;
mod handlers;
mod routes;

pub use body::JsonOrForm;
pub use client_ip::ClientIp;
pub use csrf::csrf_protect;
pub use error::AppError;
pub use routes::{AppState, auth_routes, router};
