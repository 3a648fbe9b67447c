use daymate_api::PlanHistoryEntry;

/// Past plans shown on the history screen. At most one entry is expanded.
#[derive(Debug, Default)]
pub struct PlanHistory {
    entries: Vec<PlanHistoryEntry>,
    loading: bool,
    expanded: Option<String>,
}

impl PlanHistory {
    pub fn begin(&mut self) {
        self.loading = true;
        self.expanded = None;
    }

    /// Store fetched entries newest first. Entries whose timestamp can't be
    /// parsed sort last, in the order the backend sent them.
    pub fn finish(&mut self, mut entries: Vec<PlanHistoryEntry>) {
        entries.sort_by(|a, b| b.created_at_utc().cmp(&a.created_at_utc()));
        self.entries = entries;
        self.loading = false;
    }

    pub fn fail(&mut self) {
        self.entries.clear();
        self.loading = false;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Expand `id`, or collapse it if it is already expanded. Returns false
    /// for unknown ids.
    pub fn toggle(&mut self, id: &str) -> bool {
        if !self.entries.iter().any(|e| e.id == id) {
            return false;
        }
        if self.expanded.as_deref() == Some(id) {
            self.expanded = None;
        } else {
            self.expanded = Some(id.to_string());
        }
        true
    }

    pub fn entries(&self) -> &[PlanHistoryEntry] {
        &self.entries
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.as_deref() == Some(id)
    }
}
