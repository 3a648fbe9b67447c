//! Weather and news for the active location.
//!
//! Every fetch is tagged with the location id it was issued for and a
//! generation number. A result is published only if it is the latest fetch
//! and its location is still active; anything else is stale and dropped.

use daymate_api::{NewsSnapshot, WeatherSnapshot};
use tokio_util::sync::CancellationToken;

/// Outcome of offering a fetch result to [`RemoteData::accept`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accept {
    /// Latest fetch for the active location; publish it.
    Current,
    /// Superseded or for a location that is no longer active.
    Stale,
}

#[derive(Debug, Default)]
pub struct RemoteData {
    weather: Option<WeatherSnapshot>,
    news: Option<NewsSnapshot>,
    shown_for: Option<String>,
    requested_for: Option<String>,
    generation: u64,
    loading: bool,
    cancel: Option<CancellationToken>,
}

impl RemoteData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch for `location_id`, cancelling the previous one.
    ///
    /// Switching to a different location drops the snapshot being shown so
    /// the old location's data is never displayed under the new one. A
    /// repeat fetch for the same location keeps the snapshot until the new
    /// result arrives.
    pub fn begin(&mut self, location_id: &str) -> (u64, CancellationToken) {
        if let Some(previous) = self.cancel.take() {
            previous.cancel();
        }
        if self.shown_for.as_deref() != Some(location_id) {
            self.clear_snapshot();
        }

        self.generation += 1;
        self.loading = true;
        self.requested_for = Some(location_id.to_string());

        let token = CancellationToken::new();
        self.cancel = Some(token.clone());
        (self.generation, token)
    }

    /// Decide whether a result may be published, given the active id now.
    pub fn accept(&self, location_id: &str, generation: u64, active_id: Option<&str>) -> Accept {
        if generation == self.generation && active_id == Some(location_id) {
            Accept::Current
        } else {
            Accept::Stale
        }
    }

    /// Publish a fresh pair for `location_id`.
    pub fn apply(&mut self, location_id: &str, weather: WeatherSnapshot, news: NewsSnapshot) {
        self.weather = Some(weather);
        self.news = Some(news);
        self.shown_for = Some(location_id.to_string());
        self.settle();
    }

    /// The latest fetch failed. The prior snapshot (for the same location)
    /// is left as it was.
    pub fn fail(&mut self) {
        self.settle();
    }

    /// A stale result arrived. If it was the latest fetch, nothing else is
    /// pending and loading stops.
    pub fn discard(&mut self, generation: u64) {
        if generation == self.generation {
            self.settle();
        }
    }

    /// No active location: drop everything and stop any fetch in flight.
    pub fn clear(&mut self) {
        if let Some(previous) = self.cancel.take() {
            previous.cancel();
        }
        // Bump so in-flight results can't match
        self.generation += 1;
        self.loading = false;
        self.requested_for = None;
        self.clear_snapshot();
    }

    fn settle(&mut self) {
        self.loading = false;
        self.cancel = None;
    }

    fn clear_snapshot(&mut self) {
        self.weather = None;
        self.news = None;
        self.shown_for = None;
    }

    pub fn weather(&self) -> Option<&WeatherSnapshot> {
        self.weather.as_ref()
    }

    pub fn news(&self) -> Option<&NewsSnapshot> {
        self.news.as_ref()
    }

    /// Location the displayed snapshot belongs to.
    pub fn shown_for(&self) -> Option<&str> {
        self.shown_for.as_deref()
    }

    /// Location of the latest fetch issued.
    pub fn requested_for(&self) -> Option<&str> {
        self.requested_for.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pair(tag: &str) -> (WeatherSnapshot, NewsSnapshot) {
        (
            WeatherSnapshot(json!({ "name": tag })),
            NewsSnapshot(json!({ "articles": [] })),
        )
    }

    #[test]
    fn superseded_generation_is_stale() {
        let mut data = RemoteData::new();
        let (g1, t1) = data.begin("l1");
        let (g2, _t2) = data.begin("l2");

        assert!(t1.is_cancelled());
        assert_eq!(data.accept("l1", g1, Some("l2")), Accept::Stale);
        assert_eq!(data.accept("l2", g2, Some("l2")), Accept::Current);
    }

    #[test]
    fn inactive_location_is_stale_even_if_latest() {
        let mut data = RemoteData::new();
        let (g, _) = data.begin("l1");
        assert_eq!(data.accept("l1", g, Some("l2")), Accept::Stale);
        assert_eq!(data.accept("l1", g, None), Accept::Stale);
    }

    #[test]
    fn switching_location_hides_old_snapshot() {
        let mut data = RemoteData::new();
        data.begin("l1");
        let (w, n) = pair("one");
        data.apply("l1", w, n);
        assert_eq!(data.shown_for(), Some("l1"));

        data.begin("l2");
        assert!(data.weather().is_none());
        assert!(data.is_loading());
    }

    #[test]
    fn failed_refresh_keeps_snapshot_for_same_location() {
        let mut data = RemoteData::new();
        data.begin("l1");
        let (w, n) = pair("one");
        data.apply("l1", w, n);

        data.begin("l1");
        data.fail();
        assert!(!data.is_loading());
        assert_eq!(data.weather().unwrap().0["name"], "one");
    }

    #[test]
    fn clear_invalidates_in_flight() {
        let mut data = RemoteData::new();
        let (g, token) = data.begin("l1");
        data.clear();

        assert!(token.is_cancelled());
        assert_eq!(data.accept("l1", g, Some("l1")), Accept::Stale);
        assert!(!data.is_loading());
    }
}
