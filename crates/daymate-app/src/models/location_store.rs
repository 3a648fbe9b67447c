//! The unioned location list and the active selection.
//!
//! Visible list: `[current?] ++ (authenticated ? saved : guest)`. The store
//! only does in-memory bookkeeping and guest persistence; backend calls for
//! saved locations are made by the owner before mutating the store.

use daymate_auth::{LocalStore, GUEST_LOCATIONS_KEY};
use daymate_core::StorageError;
use daymate_geo::Coords;

use super::location::{GuestRecord, Location, LocationSource, CURRENT_ID};

#[derive(Debug)]
pub struct LocationStore {
    storage: LocalStore,
    current: Option<Location>,
    saved: Vec<Location>,
    guest: Vec<Location>,
    active_id: Option<String>,
}

impl LocationStore {
    /// Load the persisted guest list. Unreadable data is logged and treated
    /// as an empty list.
    pub fn load(storage: LocalStore) -> Self {
        let guest = match storage.get_json::<Vec<GuestRecord>>(GUEST_LOCATIONS_KEY) {
            Ok(records) => records
                .unwrap_or_default()
                .into_iter()
                .map(Location::from)
                .collect(),
            Err(e) => {
                tracing::error!("Failed to parse guest locations: {}", e);
                Vec::new()
            }
        };

        Self {
            storage,
            current: None,
            saved: Vec::new(),
            guest,
            active_id: None,
        }
    }

    pub fn set_current(&mut self, coords: Coords) {
        self.current = Some(Location::current(coords));
    }

    /// The visible list in insertion order.
    pub fn visible(&self, authenticated: bool) -> Vec<&Location> {
        let owned = if authenticated { &self.saved } else { &self.guest };
        self.current.iter().chain(owned.iter()).collect()
    }

    /// The visible list in tab order: current, saved, guest; ties keep
    /// insertion order.
    pub fn tabs(&self, authenticated: bool) -> Vec<&Location> {
        let mut tabs = self.visible(authenticated);
        tabs.sort_by_key(|loc| loc.source.weight());
        tabs
    }

    pub fn find(&self, id: &str, authenticated: bool) -> Option<&Location> {
        self.visible(authenticated).into_iter().find(|loc| loc.id == id)
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn active(&self, authenticated: bool) -> Option<&Location> {
        self.active_id
            .as_deref()
            .and_then(|id| self.find(id, authenticated))
    }

    /// Make `id` active. No-op (returns false) if it isn't visible.
    pub fn select(&mut self, id: &str, authenticated: bool) -> bool {
        if self.find(id, authenticated).is_none() {
            tracing::debug!("Ignoring selection of unknown location {}", id);
            return false;
        }
        self.active_id = Some(id.to_string());
        true
    }

    /// Keep the active id if still visible, otherwise fall back to the first
    /// entry, or none when the list is empty. Returns true if it changed.
    pub fn reconcile(&mut self, authenticated: bool) -> bool {
        let still_visible = self
            .active_id
            .as_deref()
            .map_or(false, |id| self.find(id, authenticated).is_some());
        if still_visible {
            return false;
        }

        let next = self
            .visible(authenticated)
            .first()
            .map(|loc| loc.id.clone());
        let changed = next != self.active_id;
        if changed {
            tracing::debug!("Active location {:?} -> {:?}", self.active_id, next);
        }
        self.active_id = next;
        changed
    }

    /// Append a backend-created record and make it active.
    pub fn insert_saved(&mut self, location: Location) {
        self.saved.retain(|loc| loc.id != location.id);
        self.active_id = Some(location.id.clone());
        self.saved.push(location);
    }

    /// Replace the saved list wholesale with fresh backend data.
    pub fn replace_saved(&mut self, locations: Vec<Location>) {
        self.saved = locations;
    }

    /// Append a device-owned location, make it active and persist the list.
    ///
    /// The location stays in memory even when persisting fails.
    pub fn insert_guest(&mut self, location: Location) -> Result<(), StorageError> {
        self.active_id = Some(location.id.clone());
        self.guest.push(location);
        self.persist_guests()
    }

    /// Remove a saved or guest location. The current location is never
    /// removed. Clears the active selection if it pointed at `id`; guest
    /// removals are persisted.
    pub fn remove(&mut self, id: &str) -> Result<Option<Location>, StorageError> {
        if id == CURRENT_ID {
            return Ok(None);
        }

        let mut removed = None;
        if let Some(pos) = self.saved.iter().position(|loc| loc.id == id) {
            removed = Some(self.saved.remove(pos));
        } else if let Some(pos) = self.guest.iter().position(|loc| loc.id == id) {
            removed = Some(self.guest.remove(pos));
        }

        if removed.is_some() && self.active_id.as_deref() == Some(id) {
            self.active_id = None;
        }

        match &removed {
            Some(loc) if loc.source == LocationSource::Guest => {
                self.persist_guests()?;
            }
            _ => {}
        }
        Ok(removed)
    }

    /// Forget saved locations (sign-out). Guest locations are untouched.
    pub fn clear_saved(&mut self) {
        self.saved.clear();
    }

    pub fn guest_records(&self) -> Vec<GuestRecord> {
        self.guest.iter().map(GuestRecord::from).collect()
    }

    fn persist_guests(&self) -> Result<(), StorageError> {
        self.storage
            .set_json(GUEST_LOCATIONS_KEY, &self.guest_records())
    }
}
