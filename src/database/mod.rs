pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use memory::MemoryPlanetStore;
pub use models::planet::{Planet, PlanetData};
pub use postgres::PgPlanetStore;
pub use store::{PlanetStore, StoreError};
