//! Geolocation for DayMate: resolves the ephemeral "current" location from
//! configured coordinates or an IP lookup service.

pub mod location;
pub mod types;

pub use location::Geolocator;
pub use types::Coords;
