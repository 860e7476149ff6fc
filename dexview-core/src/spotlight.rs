///! Random "spotlight" selection state
///!
///! The spotlight card shows one randomly chosen record. The id lives here,
///! owned by the component for its whole lifetime, with the random source
///! injected so tests can make selection deterministic.

use std::sync::Arc;

use rand::Rng;
use tokio::sync::RwLock;

/// Ids are drawn from 1..=CEILING; the upstream catalog is sparse above
/// that range.
pub const SPOTLIGHT_ID_CEILING: u32 = 1000;

/// Source of spotlight ids.
pub trait RandomIdSource: Send + Sync {
    fn next_id(&self) -> u32;
}

/// Uniform draw over `1..=max`.
pub struct UniformIdSource {
    max: u32,
}

impl UniformIdSource {
    pub fn new(max: u32) -> Self {
        Self { max: max.max(1) }
    }
}

impl Default for UniformIdSource {
    fn default() -> Self {
        Self::new(SPOTLIGHT_ID_CEILING)
    }
}

impl RandomIdSource for UniformIdSource {
    fn next_id(&self) -> u32 {
        rand::rng().random_range(1..=self.max)
    }
}

/// Holder of the currently spotlighted id.
///
/// The first read rolls an id lazily; it then stays stable until an explicit
/// reroll, so re-renders of the surrounding view do not churn the selection.
pub struct Spotlight {
    source: Arc<dyn RandomIdSource>,
    current: RwLock<Option<u32>>,
}

impl Spotlight {
    pub fn new(source: Arc<dyn RandomIdSource>) -> Self {
        Self {
            source,
            current: RwLock::new(None),
        }
    }

    /// The current spotlight id, rolling one on first use.
    pub async fn current(&self) -> u32 {
        if let Some(id) = *self.current.read().await {
            return id;
        }
        let mut slot = self.current.write().await;
        // A concurrent first read may have rolled already.
        if let Some(id) = *slot {
            return id;
        }
        let id = self.source.next_id();
        *slot = Some(id);
        id
    }

    /// Pick a fresh id and make it current.
    pub async fn reroll(&self) -> u32 {
        let id = self.source.next_id();
        *self.current.write().await = Some(id);
        tracing::debug!("spotlight rerolled to id {}", id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct SequenceSource {
        next: AtomicU32,
    }

    impl RandomIdSource for SequenceSource {
        fn next_id(&self) -> u32 {
            self.next.fetch_add(1, Ordering::SeqCst)
        }
    }

    #[tokio::test]
    async fn test_first_read_rolls_then_stays_stable() {
        let spotlight = Spotlight::new(Arc::new(SequenceSource {
            next: AtomicU32::new(7),
        }));
        assert_eq!(spotlight.current().await, 7);
        assert_eq!(spotlight.current().await, 7);
        assert_eq!(spotlight.current().await, 7);
    }

    #[tokio::test]
    async fn test_reroll_advances_the_selection() {
        let spotlight = Spotlight::new(Arc::new(SequenceSource {
            next: AtomicU32::new(1),
        }));
        assert_eq!(spotlight.current().await, 1);
        assert_eq!(spotlight.reroll().await, 2);
        assert_eq!(spotlight.current().await, 2);
    }

    #[test]
    fn test_uniform_source_respects_ceiling() {
        let source = UniformIdSource::new(5);
        for _ in 0..100 {
            let id = source.next_id();
            assert!((1..=5).contains(&id));
        }
    }
}
