use std::fmt;

/// A handle to an instance owned by an [`InstancePool`][crate::InstancePool].
///
/// Keys are returned when an instance is activated and can be used to deactivate it again or to
/// access the instance while it remains in the pool.
///
/// # Foreign and stale keys
///
/// Every key remembers the pool that issued it. A key from a different pool is never treated as a
/// member of this pool, even if it refers to the same storage position.
///
/// A key remains valid until the instance it refers to is destroyed by a shrinking resize. After
/// that, the pool treats the key as not belonging to the pool, even if the storage position it
/// pointed to has since been reused by a newly spawned instance.
///
/// # Example
///
/// ```rust
/// use instance_pool::{Instance, InstancePool};
///
/// struct Spark;
///
/// impl Instance for Spark {
///     type Placement = ();
///
///     fn place(&mut self, _placement: ()) {}
/// }
///
/// let mut pool = InstancePool::builder()
///     .pool_size(2)
///     .factory(|_| Spark)
///     .build();
///
/// let key = pool.activate().unwrap();
/// assert!(pool.is_active(key));
///
/// // Keys are `Copy` and can be stored wherever the caller keeps track of live instances.
/// let stored = key;
/// assert_eq!(pool.deactivate(stored), Some(key));
/// assert!(!pool.is_active(key));
/// ```
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct InstanceKey {
    pool_id: u64,
    index: usize,
    generation: u32,
}

impl InstanceKey {
    #[must_use]
    pub(crate) fn new(pool_id: u64, index: usize, generation: u32) -> Self {
        Self {
            pool_id,
            index,
            generation,
        }
    }

    #[must_use]
    pub(crate) fn pool_id(self) -> u64 {
        self.pool_id
    }

    #[must_use]
    pub(crate) fn index(self) -> usize {
        self.index
    }

    #[must_use]
    pub(crate) fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "InstanceKey({}v{}@{})",
            self.index, self.generation, self.pool_id
        )
    }
}
