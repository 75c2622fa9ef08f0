use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Default)]
struct Slot {
    generation: u64,
    // Some only while the scheduled task is still waiting out its delay
    pending: Option<JoinHandle<()>>,
}

/// A single replace-on-supersede task slot.
///
/// Scheduling aborts whatever is still waiting in the slot. Work that has
/// already started after its delay is never interrupted.
#[derive(Clone, Default)]
pub struct Debouncer {
    slot: Arc<Mutex<Slot>>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule<F>(&self, delay: Duration, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let slot = self.slot.clone();
        let mut guard = self.slot.lock();
        if let Some(prev) = guard.pending.take() {
            prev.abort();
        }
        guard.generation += 1;
        let generation = guard.generation;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut s = slot.lock();
                if s.generation != generation {
                    return;
                }
                s.pending = None;
            }
            work.await;
        });
        guard.pending = Some(handle);
    }

    pub fn cancel(&self) {
        let mut guard = self.slot.lock();
        if let Some(prev) = guard.pending.take() {
            prev.abort();
        }
        guard.generation += 1;
    }

    pub fn is_pending(&self) -> bool {
        self.slot.lock().pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter_task(c: &Arc<AtomicUsize>, add: usize) -> impl Future<Output = ()> + Send + 'static {
        let c = c.clone();
        async move {
            c.fetch_add(add, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_work_never_runs() {
        let d = Debouncer::new();
        let hits = Arc::new(AtomicUsize::new(0));
        d.schedule(Duration::from_millis(500), counter_task(&hits, 1));
        tokio::time::sleep(Duration::from_millis(300)).await;
        d.schedule(Duration::from_millis(500), counter_task(&hits, 10));
        assert!(d.is_pending());
        tokio::time::sleep(Duration::from_millis(499)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 10);
        assert!(!d.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_pending_work() {
        let d = Debouncer::new();
        let hits = Arc::new(AtomicUsize::new(0));
        d.schedule(Duration::from_millis(200), counter_task(&hits, 1));
        d.cancel();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn started_work_is_not_interrupted() {
        let d = Debouncer::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        d.schedule(Duration::from_millis(100), async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            h.fetch_add(1, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_millis(150)).await;
        d.schedule(Duration::from_millis(100), counter_task(&hits, 10));
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 11);
    }
}
