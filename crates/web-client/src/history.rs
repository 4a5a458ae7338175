//! Browser history stack with back/forward.

use crate::panel::Panel;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub panel: Panel,
    pub url: String,
}

impl HistoryEntry {
    pub fn new(panel: Panel) -> Self {
        Self {
            panel,
            url: format!("#{}", panel.id()),
        }
    }
}

/// Entries plus a cursor. `push` discards anything forward of the cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowserHistory {
    entries: Vec<HistoryEntry>,
    cursor: usize,
}

impl BrowserHistory {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn push(&self, panel: Panel) -> Self {
        let keep = if self.entries.is_empty() { 0 } else { self.cursor + 1 };
        let mut entries = self.entries[..keep].to_vec();
        entries.push(HistoryEntry::new(panel));
        Self {
            cursor: entries.len() - 1,
            entries,
        }
    }

    /// Step back. Returns the new history and the entry landed on.
    pub fn back(&self) -> Option<(Self, &HistoryEntry)> {
        let cursor = self.cursor.checked_sub(1)?;
        let entry = self.entries.get(cursor)?;
        Some((self.at(cursor), entry))
    }

    pub fn forward(&self) -> Option<(Self, &HistoryEntry)> {
        let cursor = self.cursor + 1;
        let entry = self.entries.get(cursor)?;
        Some((self.at(cursor), entry))
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.cursor)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn at(&self, cursor: usize) -> Self {
        Self {
            entries: self.entries.clone(),
            cursor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_records_hash_urls() {
        let history = BrowserHistory::new().push(Panel::Home).push(Panel::Faq);
        assert_eq!(history.len(), 2);
        assert_eq!(history.current().map(|e| e.url.as_str()), Some("#faq"));
    }

    #[test]
    fn back_and_forward_stop_at_the_ends() {
        let history = BrowserHistory::new().push(Panel::Home).push(Panel::Rewards);
        assert!(history.forward().is_none());

        let (back, entry) = history.back().unwrap();
        assert_eq!(entry.panel, Panel::Home);
        assert!(back.back().is_none());

        let (_, entry) = back.forward().unwrap();
        assert_eq!(entry.panel, Panel::Rewards);
    }

    #[test]
    fn push_after_back_truncates_forward_entries() {
        let history = BrowserHistory::new()
            .push(Panel::Home)
            .push(Panel::Rewards)
            .push(Panel::Faq);
        let (back, _) = history.back().unwrap();
        let branched = back.push(Panel::Auth);
        assert_eq!(branched.len(), 3);
        assert!(branched.forward().is_none());
        assert_eq!(branched.current().map(|e| e.panel), Some(Panel::Auth));
    }
}
