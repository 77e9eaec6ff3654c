use super::MetricsSnapshot;
use std::sync::{Arc, RwLock};

/// Holds the latest snapshot. The ingestion worker is the only writer,
/// any number of request handlers read concurrently.
///
/// Snapshots are immutable once stored; `update` swaps the whole value, so a
/// reader always sees one complete snapshot.
pub struct SnapshotStore {
    current: RwLock<Arc<MetricsSnapshot>>,
}

impl SnapshotStore {
    pub fn new(initial: MetricsSnapshot) -> Self {
        SnapshotStore {
            current: RwLock::new(Arc::new(initial)),
        }
    }

    pub fn update(&self, snapshot: MetricsSnapshot) {
        let snapshot = Arc::new(snapshot);
        // a poisoned lock still holds a complete snapshot
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        *current = snapshot;
    }

    pub fn get(&self) -> Arc<MetricsSnapshot> {
        let current = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&current)
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        SnapshotStore::new(MetricsSnapshot::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn uniform_snapshot(v: f64) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: v.to_string(),
            current_power_consumption: v,
            inst_volt_l1: v,
            inst_volt_l2: v,
            inst_volt_l3: v,
            inst_current_l1: v,
            inst_current_l2: v,
            inst_current_l3: v,
            gas_delivered: v,
            power_delivered_tariff1: v,
            power_delivered_tariff2: v,
        }
    }

    #[test]
    fn test_get_returns_latest() {
        let store = SnapshotStore::new(uniform_snapshot(0.0));
        assert_eq!(store.get().gas_delivered, 0.0);
        store.update(uniform_snapshot(7.0));
        assert_eq!(*store.get(), uniform_snapshot(7.0));
    }

    #[test]
    fn test_old_handle_is_independent() {
        let store = SnapshotStore::new(uniform_snapshot(1.0));
        let before = store.get();
        store.update(uniform_snapshot(2.0));
        assert_eq!(before.inst_volt_l1, 1.0);
        assert_eq!(store.get().inst_volt_l1, 2.0);
    }

    #[test]
    fn test_default_store_is_zeroed() {
        let store = SnapshotStore::default();
        let snapshot = store.get();
        assert!(!snapshot.timestamp.is_empty());
        assert_eq!(snapshot.power_delivered_tariff1, 0.0);
    }

    #[test]
    fn test_readers_never_see_mixed_snapshots() {
        let store = Arc::new(SnapshotStore::new(uniform_snapshot(0.0)));

        let writer_store = Arc::clone(&store);
        let writer = thread::spawn(move || {
            for i in 1..=2000 {
                writer_store.update(uniform_snapshot(i as f64));
            }
        });

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..2000 {
                        let s = store.get();
                        let v = s.current_power_consumption;
                        assert_eq!(s.timestamp, v.to_string());
                        assert_eq!(*s, uniform_snapshot(v));
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(store.get().gas_delivered, 2000.0);
    }
}
