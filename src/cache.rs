use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::debug;

use crate::views::{OrderDetail, OrdersOverview};

struct Cached<T> {
    value: T,
    fetched_at: Instant,
}

impl<T: Clone> Cached<T> {
    fn fresh(&self, max_age: Duration) -> Option<T> {
        (self.fetched_at.elapsed() < max_age).then(|| self.value.clone())
    }
}

/// Rendered overview and order views. Entries expire after `max_age` and are
/// dropped whenever an order is written.
///
/// Writers bump a generation counter; a view computed from a read that started
/// before the bump is not stored, so an in-flight read cannot put a stale view
/// back after invalidation.
pub struct ViewCache {
    max_age: Duration,
    generation: AtomicU64,
    overview: RwLock<Option<Cached<OrdersOverview>>>,
    orders: RwLock<HashMap<i64, Cached<OrderDetail>>>,
}

impl ViewCache {
    pub fn new(max_age: Duration) -> Self {
        Self {
            max_age,
            generation: AtomicU64::new(0),
            overview: RwLock::new(None),
            orders: RwLock::new(HashMap::new()),
        }
    }

    /// Token to pass to the `store_*` methods; take it before reading from the store.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub async fn overview(&self) -> Option<OrdersOverview> {
        let guard = self.overview.read().await;
        guard.as_ref().and_then(|cached| cached.fresh(self.max_age))
    }

    pub async fn store_overview(&self, generation: u64, overview: OrdersOverview) -> bool {
        let mut guard = self.overview.write().await;
        if generation != self.generation() {
            debug!(generation, "discarding overview computed before invalidation");
            return false;
        }
        *guard = Some(Cached {
            value: overview,
            fetched_at: Instant::now(),
        });
        true
    }

    pub async fn order(&self, id: i64) -> Option<OrderDetail> {
        let guard = self.orders.read().await;
        guard.get(&id).and_then(|cached| cached.fresh(self.max_age))
    }

    pub async fn store_order(&self, generation: u64, id: i64, detail: OrderDetail) -> bool {
        let mut guard = self.orders.write().await;
        if generation != self.generation() {
            debug!(order_id = id, generation, "discarding order view computed before invalidation");
            return false;
        }
        guard.retain(|_, cached| cached.fetched_at.elapsed() < self.max_age);
        guard.insert(
            id,
            Cached {
                value: detail,
                fetched_at: Instant::now(),
            },
        );
        true
    }

    /// Drops the overview and the view of `id` after a write to that order.
    pub async fn invalidate_order(&self, id: i64) {
        let mut overview = self.overview.write().await;
        let mut orders = self.orders.write().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        *overview = None;
        orders.remove(&id);
        debug!(order_id = id, "invalidated cached order views");
    }
}
