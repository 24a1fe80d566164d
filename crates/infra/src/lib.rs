//! Infrastructure layer: storage adapters for every port, schema bootstrap and
//! admin seeding.

pub mod memory;
pub mod postgres;
pub mod seed;

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use seed::{AdminSeed, seed_admin};
