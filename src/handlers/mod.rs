pub mod health;
pub mod photo;
pub mod planet_id;
pub mod planets;

pub use planet_id::PlanetId;
