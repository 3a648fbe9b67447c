use daymate_api::LocationRecord;
use daymate_geo::Coords;
use serde::{Deserialize, Serialize};

/// Fixed id of the device location entry.
pub const CURRENT_ID: &str = "current";

/// Label of the device location entry.
pub const CURRENT_LABEL: &str = "Current Location";

/// Where a location comes from and who owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationSource {
    /// Recomputed from the device every session, never persisted.
    Current,
    /// Owned by the account, persisted by the backend.
    Saved,
    /// Owned by this device, persisted in local storage.
    Guest,
}

impl LocationSource {
    /// Tab ordering weight: current, then saved, then guest.
    pub fn weight(self) -> u8 {
        match self {
            Self::Current => 0,
            Self::Saved => 1,
            Self::Guest => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Current => "Current",
            Self::Saved => "Saved",
            Self::Guest => "Guest",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub id: String,
    pub label: String,
    pub lat: f64,
    pub lon: f64,
    pub source: LocationSource,
}

impl Location {
    pub fn current(coords: Coords) -> Self {
        Self {
            id: CURRENT_ID.to_string(),
            label: CURRENT_LABEL.to_string(),
            lat: coords.lat,
            lon: coords.lon,
            source: LocationSource::Current,
        }
    }

    /// A new device-owned location with a locally unique id.
    pub fn guest(label: String, lat: f64, lon: f64) -> Self {
        Self {
            id: format!("guest-{}", uuid::Uuid::new_v4()),
            label,
            lat,
            lon,
            source: LocationSource::Guest,
        }
    }

    pub fn saved(record: LocationRecord) -> Self {
        Self {
            id: record.id,
            label: record.label,
            lat: record.lat,
            lon: record.lon,
            source: LocationSource::Saved,
        }
    }

    pub fn coords(&self) -> Coords {
        Coords::new(self.lat, self.lon)
    }
}

/// Persisted shape of a guest location; the source is re-derived on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestRecord {
    pub id: String,
    pub label: String,
    pub lat: f64,
    pub lon: f64,
}

impl From<&Location> for GuestRecord {
    fn from(loc: &Location) -> Self {
        Self {
            id: loc.id.clone(),
            label: loc.label.clone(),
            lat: loc.lat,
            lon: loc.lon,
        }
    }
}

impl From<GuestRecord> for Location {
    fn from(record: GuestRecord) -> Self {
        Self {
            id: record.id,
            label: record.label,
            lat: record.lat,
            lon: record.lon,
            source: LocationSource::Guest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guest_ids_are_prefixed_and_unique() {
        let a = Location::guest("A".into(), 1.0, 2.0);
        let b = Location::guest("A".into(), 1.0, 2.0);
        assert!(a.id.starts_with("guest-"));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn guest_record_has_no_source_field() {
        let loc = Location::guest("Office".into(), 23.8, 90.4);
        let json = serde_json::to_value(GuestRecord::from(&loc)).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 4);
        assert!(!obj.contains_key("source"));
    }

    #[test]
    fn current_location_uses_fixed_id() {
        let loc = Location::current(Coords::new(1.0, 2.0));
        assert_eq!(loc.id, CURRENT_ID);
        assert_eq!(loc.source, LocationSource::Current);
    }
}
