//! First-contact detection for direct conversations.
//!
//! Process-lifetime set of users who already got the welcome notice. Not persisted:
//! a restart makes everyone "unseen" again.

use crate::domain::UserId;
use dashmap::DashSet;

/// Tracks users who have seen the onboarding instructions.
#[derive(Debug, Default)]
pub struct SessionTracker {
    seen: DashSet<UserId>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true exactly once per user: the first time they are observed.
    ///
    /// Insert and test are a single shard-locked operation, so concurrent first messages
    /// from one user yield exactly one `true`.
    pub fn mark_and_check_first_contact(&self, user: UserId) -> bool {
        self.seen.insert(user)
    }

    pub fn has_seen(&self, user: UserId) -> bool {
        self.seen.contains(&user)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_first_contact_only_once() {
        let tracker = SessionTracker::new();
        assert!(!tracker.has_seen(UserId(7)));
        assert!(tracker.mark_and_check_first_contact(UserId(7)));
        assert!(!tracker.mark_and_check_first_contact(UserId(7)));
        assert!(!tracker.mark_and_check_first_contact(UserId(7)));
        assert!(tracker.has_seen(UserId(7)));
    }

    #[test]
    fn test_users_are_independent() {
        let tracker = SessionTracker::new();
        assert!(tracker.mark_and_check_first_contact(UserId(1)));
        assert!(tracker.mark_and_check_first_contact(UserId(2)));
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn test_fresh_tracker_forgets_everyone() {
        let first = SessionTracker::new();
        assert!(first.mark_and_check_first_contact(UserId(1)));
        let restarted = SessionTracker::new();
        assert!(restarted.is_empty());
        assert!(restarted.mark_and_check_first_contact(UserId(1)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_contact_single_winner() {
        let tracker = Arc::new(SessionTracker::new());
        let mut handles = Vec::new();
        for _ in 0..32 {
            let tracker = Arc::clone(&tracker);
            handles.push(tokio::spawn(async move {
                tracker.mark_and_check_first_contact(UserId(42))
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }

        assert_eq!(winners, 1);
        assert!(tracker.has_seen(UserId(42)));
        assert_eq!(tracker.len(), 1);
    }
}
