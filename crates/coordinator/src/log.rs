//! Append-only conversation log.

use carelink_common::ConversationEntry;

/// Ordered record of every entry produced in a conversation.
///
/// Only the coordinator appends; readers get snapshots. Entries are never
/// edited or removed.
#[derive(Debug, Default, Clone)]
pub struct ConversationLog {
    entries: Vec<ConversationEntry>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, clamping its timestamp so the log never goes back in time.
    pub(crate) fn append(&mut self, mut entry: ConversationEntry) {
        if let Some(last) = self.entries.last() {
            entry.created_at = entry.created_at.max(last.created_at);
        }
        self.entries.push(entry);
    }

    /// Owned snapshot of the whole log.
    pub fn all(&self) -> Vec<ConversationEntry> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&ConversationEntry> {
        self.entries.last()
    }

    /// The last `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> &[ConversationEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    /// Owned copies of the entries from `index` on. Empty past the end.
    pub fn since(&self, index: usize) -> Vec<ConversationEntry> {
        self.entries.get(index..).map(<[_]>::to_vec).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConversationEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_never_decrease() {
        let mut log = ConversationLog::new();
        let mut first = ConversationEntry::user("first");
        first.created_at = u64::MAX - 1;
        log.append(first);
        log.append(ConversationEntry::coordinator("second"));

        let all = log.all();
        assert_eq!(all.len(), 2);
        assert!(all[1].created_at >= all[0].created_at);
        assert_eq!(all[1].text(), "second");
    }

    #[test]
    fn recent_returns_tail_in_order() {
        let mut log = ConversationLog::new();
        for i in 0..5 {
            log.append(ConversationEntry::user(format!("m{i}")));
        }
        let tail: Vec<String> = log.recent(2).iter().map(|e| e.text()).collect();
        assert_eq!(tail, vec!["m3", "m4"]);
        assert_eq!(log.recent(10).len(), 5);
        assert!(log.recent(0).is_empty());
    }

    #[test]
    fn since_returns_only_the_tail() {
        let mut log = ConversationLog::new();
        for i in 0..4 {
            log.append(ConversationEntry::user(format!("m{i}")));
        }
        let tail: Vec<String> = log.since(2).iter().map(|e| e.text()).collect();
        assert_eq!(tail, vec!["m2", "m3"]);
        assert_eq!(log.since(0).len(), 4);
        assert!(log.since(4).is_empty());
        assert!(log.since(9).is_empty());
    }

    #[test]
    fn snapshots_are_detached() {
        let mut log = ConversationLog::new();
        log.append(ConversationEntry::user("hi"));
        let snapshot = log.all();
        log.append(ConversationEntry::coordinator("hello"));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(log.len(), 2);
        assert_eq!(log.last().map(|e| e.text()), Some("hello".to_string()));
    }
}
