// Declare modules within the adapters directory
pub mod clock;
pub mod in_memory_cache;
pub mod in_memory_identity;
pub mod in_memory_tenant_store;
pub mod postgres_identity;
pub mod postgres_tenant_store;
pub mod redis_cache;

pub use clock::{FixedClock, SystemClock};
pub use in_memory_cache::InMemoryCache;
pub use in_memory_identity::InMemoryIdentityProvider;
pub use in_memory_tenant_store::InMemoryTenantStore;
pub use postgres_identity::PostgresIdentityProvider;
pub use postgres_tenant_store::PostgresTenantStore;
pub use redis_cache::RedisCache;
