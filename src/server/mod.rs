mod catalog;
pub mod dto;
mod extract;
mod lists;
pub mod response;
mod router;
mod session;
mod sharing;

pub use router::{AppState, create_router};
