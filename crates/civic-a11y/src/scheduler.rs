//! Speech re-delivery timers
//!
//! After cancelling in-flight speech the coordinator waits a few
//! milliseconds before speaking again. The wait is a timer entry here, fired
//! by the host's event loop through `take_due`.

/// Utterance waiting for its delivery time
#[derive(Debug, Clone, PartialEq)]
pub struct PendingUtterance {
    pub id: u32,
    pub text: String,
    pub due_ms: u64,
}

/// One-shot timers for delayed speech
#[derive(Debug, Default)]
pub struct SpeechScheduler {
    next_id: u32,
    pending: Vec<PendingUtterance>,
}

impl SpeechScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `text` for `due_ms`, replacing anything not yet delivered
    pub fn schedule(&mut self, text: &str, due_ms: u64) -> u32 {
        self.next_id = self.next_id.wrapping_add(1);
        self.pending.clear();
        self.pending.push(PendingUtterance {
            id: self.next_id,
            text: text.to_string(),
            due_ms,
        });
        self.next_id
    }

    /// Drop every pending utterance
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Remove and return utterances whose time has come, earliest first
    pub fn take_due(&mut self, now_ms: u64) -> Vec<PendingUtterance> {
        let (mut due, rest): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|p| p.due_ms <= now_ms);
        self.pending = rest;
        due.sort_by_key(|p| p.due_ms);
        due
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending(&self) -> &[PendingUtterance] {
        &self.pending
    }

    /// Milliseconds until the next timer fires (0 if one is overdue)
    pub fn time_until_next(&self, now_ms: u64) -> Option<u64> {
        self.pending.iter().map(|p| p.due_ms.saturating_sub(now_ms)).min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_due() {
        let mut scheduler = SpeechScheduler::new();
        scheduler.schedule("Hello", 110);
        assert!(scheduler.take_due(105).is_empty());
        assert_eq!(scheduler.time_until_next(105), Some(5));

        let due = scheduler.take_due(110);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].text, "Hello");
        assert!(!scheduler.has_pending());
        assert_eq!(scheduler.time_until_next(110), None);
    }

    #[test]
    fn test_schedule_replaces_undelivered() {
        let mut scheduler = SpeechScheduler::new();
        let first = scheduler.schedule("first", 10);
        let second = scheduler.schedule("second", 20);
        assert_ne!(first, second);
        assert_eq!(scheduler.pending().len(), 1);
        assert_eq!(scheduler.pending()[0].id, second);
        assert_eq!(scheduler.take_due(100)[0].text, "second");
    }

    #[test]
    fn test_clear() {
        let mut scheduler = SpeechScheduler::new();
        scheduler.schedule("x", 10);
        scheduler.clear();
        assert!(!scheduler.has_pending());
        assert!(scheduler.take_due(u64::MAX).is_empty());
    }
}
