mod server;

pub use server::{MAX_SESSION_TTL_MINUTES, SameSitePolicy, ServerConfig, SessionConfig};
