pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod memory;
pub mod profile_repo;
pub mod redis_repo;
pub mod trip_repo;

pub use booking_repo::PgBookingRepository;
pub use database::DbClient;
pub use memory::MemoryBackend;
pub use profile_repo::PgProfileRepository;
pub use redis_repo::RedisProgressStore;
pub use trip_repo::PgTripRepository;
