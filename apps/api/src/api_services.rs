mod database;
mod redis_connection;
mod sessions;
mod state_builder;

pub use database::connect_and_migrate;
pub use redis_connection::connect_redis;
pub use sessions::{build_memory_session_layer, build_postgres_session_layer};
pub use state_builder::{StoreHandle, build_app_state};
