use temple_engine::KeyValueStore;

use crate::config::HIGHSCORE_KEY;

/// Best score so far; a missing or garbled value counts as 0.
pub fn load(store: &dyn KeyValueStore) -> u64 {
    store.get_u64(HIGHSCORE_KEY).unwrap_or(0)
}

/// Persist `score` if it beats the stored best. Returns true when it did.
pub fn record(store: &mut dyn KeyValueStore, score: u64) -> bool {
    if score <= load(store) {
        return false;
    }
    store.set(HIGHSCORE_KEY, &score.to_string());
    log::info!("new high score {score}");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use temple_engine::MemoryStore;

    #[test]
    fn only_better_scores_are_written() {
        let mut store = MemoryStore::new();
        assert_eq!(load(&store), 0);
        assert!(record(&mut store, 120));
        assert!(!record(&mut store, 80));
        assert!(!record(&mut store, 120));
        assert_eq!(load(&store), 120);
        assert_eq!(store.get(HIGHSCORE_KEY).as_deref(), Some("120"));
    }

    #[test]
    fn garbage_reads_as_zero() {
        let mut store = MemoryStore::new();
        store.set(HIGHSCORE_KEY, "lots");
        assert_eq!(load(&store), 0);
    }
}
