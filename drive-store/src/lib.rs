pub mod app_config;
pub mod backend;
pub mod catalog_cache;
pub mod memory;
pub mod paths;
pub mod redis_repo;

pub use app_config::Config;
pub use backend::BackendClient;
pub use catalog_cache::CatalogCache;
pub use memory::MemorySessionStore;
pub use redis_repo::RedisClient;
