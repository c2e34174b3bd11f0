use std::any::type_name;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace};

use crate::sequence::{Evicted, SlotSequence, Stamp};
use crate::{Instance, InstanceKey, InstancePoolBuilder, Signal, SpawnInfo};

pub(crate) type Factory<T> = Box<dyn FnMut(SpawnInfo<'_>) -> T>;

/// Global counter for generating unique pool IDs.
static POOL_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generates a unique pool ID, used to tell keys of different pools apart.
fn generate_pool_id() -> u64 {
    POOL_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// A pool of reusable instances that are activated and deactivated on demand.
///
/// The pool keeps an ordered sequence of slots, each holding an instance created by a
/// caller-supplied factory and an active/inactive flag. Activating takes the first inactive slot in
/// sequence order. Deactivating moves the slot to the tail of the sequence, so the front of the
/// sequence always holds the slots that have been idle (or active) the longest.
///
/// # Overflow
///
/// When an activation finds no inactive slot, the pool applies its overflow policies in order:
///
/// 1. **Additive overflow** - if the pool size is below [`additive_overflow_max()`][1], the pool
///    grows by [`additive_overflow_amount()`][2] slots (capped at the maximum) and retries. Slots
///    added this way are not removed when demand drops; only an explicit [`resize()`][3] shrinks
///    the pool.
/// 2. **Destructive overflow** - if enabled, the instance that has been active the longest is
///    deactivated and reused.
/// 3. Otherwise the activation is refused and `None` is returned.
///
/// # Notifications
///
/// The pool emits three signals: [`on_size_changed()`][4], [`on_activated()`][5] and
/// [`on_deactivated()`][6]. Listeners run synchronously as part of the operation that triggered
/// them and cannot call back into the pool.
///
/// # Thread safety
///
/// The pool is single-threaded. It holds the factory and listeners as non-`Send` closures, so it
/// can be neither shared nor moved between threads.
///
/// # Example
///
/// ```rust
/// use instance_pool::{Instance, InstancePool};
///
/// struct Enemy {
///     spawn_point: u32,
/// }
///
/// impl Instance for Enemy {
///     type Placement = u32;
///
///     fn place(&mut self, placement: u32) {
///         self.spawn_point = placement;
///     }
/// }
///
/// let mut pool = InstancePool::builder()
///     .name("Enemy")
///     .pool_size(2)
///     .factory(|_| Enemy { spawn_point: 0 })
///     .build();
///
/// let first = pool.activate_at(7).unwrap();
/// let second = pool.activate_at(9).unwrap();
/// assert_eq!(pool.get(first).unwrap().spawn_point, 7);
///
/// // The pool is exhausted and no overflow policy is enabled.
/// assert_eq!(pool.activate(), None);
///
/// pool.deactivate(second);
/// assert_eq!(pool.activate(), Some(second));
/// ```
///
/// [1]: Self::additive_overflow_max
/// [2]: Self::additive_overflow_amount
/// [3]: Self::resize
/// [4]: Self::on_size_changed
/// [5]: Self::on_activated
/// [6]: Self::on_deactivated
pub struct InstancePool<T: Instance> {
    /// Stamped into every key this pool hands out. Keys carrying a different ID are not members.
    pool_id: u64,

    name: String,

    pool_size: usize,
    additive_overflow_amount: usize,
    additive_overflow_max: usize,
    destructive_overflow: bool,

    factory: Factory<T>,

    /// Storage of the slots. A slot keeps its entry for its whole lifetime; entries of destroyed
    /// slots are vacant until reused by a newly spawned slot, at which point the generation of the
    /// entry has been bumped so stale keys no longer match.
    entries: Vec<Entry<T>>,

    /// Indexes of vacant entries in `entries`.
    vacant: Vec<usize>,

    /// The order of the occupied entries.
    sequence: SlotSequence,

    size_changed: Signal,
    activated: Signal,
    deactivated: Signal,
}

struct Entry<T> {
    generation: u32,
    slot: Option<Slot<T>>,
}

struct Slot<T> {
    instance: T,
    name: String,
    stamp: Stamp,
    active: bool,
}

impl<T: Instance> InstancePool<T> {
    /// Creates an empty pool and then grows it to `pool_size`.
    pub(crate) fn new_inner(
        name: String,
        pool_size: usize,
        additive_overflow_amount: usize,
        additive_overflow_max: usize,
        destructive_overflow: bool,
        factory: Factory<T>,
    ) -> Self {
        let mut pool = Self {
            pool_id: generate_pool_id(),
            name,
            pool_size: 0,
            additive_overflow_amount,
            additive_overflow_max,
            destructive_overflow,
            factory,
            entries: Vec::new(),
            vacant: Vec::new(),
            sequence: SlotSequence::new(),
            size_changed: Signal::new(),
            activated: Signal::new(),
            deactivated: Signal::new(),
        };

        // Also raises the overflow ceiling to at least the initial size.
        pool.resize(pool_size);

        debug!(
            pool = %pool.name,
            pool_size = pool.pool_size,
            additive_overflow_amount = pool.additive_overflow_amount,
            additive_overflow_max = pool.additive_overflow_max,
            destructive_overflow = pool.destructive_overflow,
            "instance pool created"
        );

        pool
    }

    /// Starts building a new [`InstancePool`].
    ///
    /// The factory is mandatory, all other settings are optional.
    ///
    /// # Example
    ///
    /// ```rust
    /// use instance_pool::{Instance, InstancePool};
    ///
    /// struct Particle;
    ///
    /// impl Instance for Particle {
    ///     type Placement = ();
    ///
    ///     fn place(&mut self, _placement: ()) {}
    /// }
    ///
    /// let pool = InstancePool::builder()
    ///     .pool_size(10)
    ///     .additive_overflow_amount(5)
    ///     .additive_overflow_max(20)
    ///     .factory(|_| Particle)
    ///     .build();
    ///
    /// assert_eq!(pool.len(), 10);
    /// assert_eq!(pool.active_count(), 0);
    /// ```
    pub fn builder() -> InstancePoolBuilder<T> {
        InstancePoolBuilder::new()
    }

    /// The base name used to name spawned instances.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The number of slots in the pool, active or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Whether the pool has no slots at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The number of active instances.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.sequence.active_len()
    }

    /// The number of inactive instances, available for activation without overflow.
    #[must_use]
    pub fn inactive_count(&self) -> usize {
        self.sequence.inactive_len()
    }

    /// The target number of slots. Equal to [`len()`][Self::len] except while the pool is
    /// recovering from a panic raised by the factory.
    #[must_use]
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// How many slots an additive overflow adds.
    #[must_use]
    pub fn additive_overflow_amount(&self) -> usize {
        self.additive_overflow_amount
    }

    /// Sets how many slots an additive overflow adds. Zero disables additive growth.
    pub fn set_additive_overflow_amount(&mut self, amount: usize) {
        self.additive_overflow_amount = amount;
    }

    /// The pool size beyond which additive overflow does not grow the pool.
    #[must_use]
    pub fn additive_overflow_max(&self) -> usize {
        self.additive_overflow_max
    }

    /// Sets the ceiling for additive overflow. Values below the current pool size are raised to
    /// the current pool size.
    pub fn set_additive_overflow_max(&mut self, max: usize) {
        self.additive_overflow_max = max.max(self.pool_size);
    }

    /// Whether destructive overflow is enabled.
    #[must_use]
    pub fn destructive_overflow(&self) -> bool {
        self.destructive_overflow
    }

    /// Enables or disables destructive overflow.
    pub fn set_destructive_overflow(&mut self, enabled: bool) {
        self.destructive_overflow = enabled;
    }

    /// Signal emitted whenever a resize changes the number of slots.
    pub fn on_size_changed(&mut self) -> &mut Signal {
        &mut self.size_changed
    }

    /// Signal emitted whenever an instance is activated.
    pub fn on_activated(&mut self) -> &mut Signal {
        &mut self.activated
    }

    /// Signal emitted whenever an instance is deactivated, including forced deactivation by
    /// destructive overflow.
    pub fn on_deactivated(&mut self) -> &mut Signal {
        &mut self.deactivated
    }

    /// Resizes the pool to `target` slots and makes `target` the new pool size.
    ///
    /// If `target` exceeds [`additive_overflow_max()`][Self::additive_overflow_max], the ceiling is
    /// raised to `target`, so the pool never holds more slots than its ceiling.
    ///
    /// Growing spawns new instances via the factory and appends them to the tail of the sequence
    /// as inactive slots. Shrinking destroys inactive instances first, starting with those idle
    /// the longest, and only then active instances, starting with those active the longest.
    ///
    /// Emits the size changed signal if the number of slots changed.
    ///
    /// # Example
    ///
    /// ```rust
    /// use instance_pool::{Instance, InstancePool};
    ///
    /// struct Tile;
    ///
    /// impl Instance for Tile {
    ///     type Placement = ();
    ///
    ///     fn place(&mut self, _placement: ()) {}
    /// }
    ///
    /// let mut pool = InstancePool::builder()
    ///     .pool_size(4)
    ///     .factory(|_| Tile)
    ///     .build();
    ///
    /// let active = pool.activate().unwrap();
    ///
    /// pool.resize(1);
    /// assert_eq!(pool.len(), 1);
    ///
    /// // The inactive instances were destroyed, the active one survived.
    /// assert!(pool.is_active(active));
    /// ```
    pub fn resize(&mut self, target: usize) {
        self.pool_size = target;
        self.additive_overflow_max = self.additive_overflow_max.max(target);

        let before = self.len();

        if before == target {
            return;
        }

        if before < target {
            for index in before..target {
                self.spawn(index);
            }
        } else {
            while self.len() > target {
                self.evict();
            }
        }

        debug!(pool = %self.name, before, after = target, "instance pool resized");

        self.size_changed.emit();
    }

    /// Brings the number of slots back to the pool size if the two have diverged.
    ///
    /// The two can only diverge if the factory panicked halfway through growing the pool. This is
    /// called at the start of every activation and may also be called by the owner of the pool
    /// (e.g. once per frame) to repair the pool eagerly. Does nothing if no repair is needed.
    pub fn restore_target_size(&mut self) {
        if self.len() != self.pool_size {
            debug!(
                pool = %self.name,
                len = self.len(),
                pool_size = self.pool_size,
                "restoring instance pool to its target size"
            );

            self.resize(self.pool_size);
        }
    }

    /// Activates an instance, placing it at the default placement (the origin).
    ///
    /// See [`activate_at()`][Self::activate_at].
    pub fn activate(&mut self) -> Option<InstanceKey> {
        self.activate_at(<T::Placement as Default>::default())
    }

    /// Activates an instance and passes `placement` to it.
    ///
    /// The first inactive slot in sequence order is activated. If there is none, the overflow
    /// policies are applied (see the type-level documentation).
    ///
    /// Returns `None` if the activation was refused, in which case the pool is unchanged.
    pub fn activate_at(&mut self, placement: T::Placement) -> Option<InstanceKey> {
        self.restore_target_size();

        let index = self.find_or_make_inactive()?;

        let key = self.key_at(index);

        let slot = self
            .entries
            .get_mut(index)
            .and_then(|entry| entry.slot.as_mut())
            .expect("sequence only refers to occupied entries");

        self.sequence.mark_active(slot.stamp);
        slot.active = true;
        slot.instance.set_active(true);
        slot.instance.place(placement);

        trace!(pool = %self.name, instance = %slot.name, "instance activated");

        self.activated.emit();

        Some(key)
    }

    /// Deactivates the instance that has been active the longest.
    ///
    /// Returns the key of the deactivated instance, or `None` if no instance is active.
    pub fn deactivate_oldest(&mut self) -> Option<InstanceKey> {
        let (_, index) = self.sequence.first_active()?;

        self.deactivate(self.key_at(index))
    }

    /// Deactivates the instance identified by `key` and moves it to the tail of the sequence.
    ///
    /// Returns `key` on success, or `None` if the key does not belong to an instance in this pool
    /// (it was issued by another pool, or its instance has been destroyed), in which case the pool
    /// is unchanged.
    pub fn deactivate(&mut self, key: InstanceKey) -> Option<InstanceKey> {
        let pool_id = self.pool_id;

        let slot = self
            .entries
            .get_mut(key.index())
            .filter(|entry| key.pool_id() == pool_id && entry.generation == key.generation())
            .and_then(|entry| entry.slot.as_mut())?;

        slot.active = false;
        slot.instance.set_active(false);
        slot.stamp = self.sequence.requeue_inactive(slot.stamp);

        trace!(pool = %self.name, instance = %slot.name, "instance deactivated");

        self.deactivated.emit();

        Some(key)
    }

    /// Whether `key` refers to an instance in this pool.
    #[must_use]
    pub fn contains(&self, key: InstanceKey) -> bool {
        self.slot(key).is_some()
    }

    /// Whether `key` refers to an active instance in this pool.
    #[must_use]
    pub fn is_active(&self, key: InstanceKey) -> bool {
        self.slot(key).is_some_and(|slot| slot.active)
    }

    /// The instance identified by `key`, if it is in this pool.
    #[must_use]
    pub fn get(&self, key: InstanceKey) -> Option<&T> {
        self.slot(key).map(|slot| &slot.instance)
    }

    /// The instance identified by `key` for modification, if it is in this pool.
    #[must_use]
    pub fn get_mut(&mut self, key: InstanceKey) -> Option<&mut T> {
        self.slot_mut(key).map(|slot| &mut slot.instance)
    }

    /// The debug name of the instance identified by `key`, if it is in this pool.
    #[must_use]
    pub fn name_of(&self, key: InstanceKey) -> Option<&str> {
        self.slot(key).map(|slot| slot.name.as_str())
    }

    /// Keys of all instances, in sequence order.
    pub fn keys(&self) -> impl Iterator<Item = InstanceKey> + '_ {
        self.sequence.iter().map(|index| self.key_at(index))
    }

    /// Keys of active instances, from the one active the longest to the one activated last.
    pub fn active_keys(&self) -> impl Iterator<Item = InstanceKey> + '_ {
        self.sequence.iter_active().map(|index| self.key_at(index))
    }

    fn find_or_make_inactive(&mut self) -> Option<usize> {
        if let Some((_, index)) = self.sequence.first_inactive() {
            return Some(index);
        }

        if self.pool_size < self.additive_overflow_max {
            let grown_size = self
                .pool_size
                .saturating_add(self.additive_overflow_amount)
                .min(self.additive_overflow_max);

            debug!(
                pool = %self.name,
                from = self.pool_size,
                to = grown_size,
                "instance pool exhausted, applying additive overflow"
            );

            self.resize(grown_size);

            if let Some((_, index)) = self.sequence.first_inactive() {
                return Some(index);
            }

            // Additive overflow is enabled but adds nothing, so we fall through to the next policy.
        }

        if self.destructive_overflow {
            let recycled = self.deactivate_oldest()?;

            debug!(
                pool = %self.name,
                instance = ?self.name_of(recycled),
                "instance pool exhausted, recycling the longest active instance"
            );

            return Some(recycled.index());
        }

        trace!(pool = %self.name, "instance pool exhausted, activation refused");

        None
    }

    fn spawn(&mut self, creation_index: usize) {
        let name = format!("{} ({creation_index})", self.name);

        let mut instance = (self.factory)(SpawnInfo::new(creation_index, &name));
        instance.set_active(false);

        let index = self.vacant.pop().unwrap_or_else(|| {
            let index = self.entries.len();
            self.entries.push(Entry {
                generation: 0,
                slot: None,
            });
            index
        });

        let stamp = self.sequence.push_inactive(index);

        let entry = self
            .entries
            .get_mut(index)
            .expect("we just ensured the entry exists");

        debug_assert!(entry.slot.is_none());

        entry.slot = Some(Slot {
            instance,
            name,
            stamp,
            active: false,
        });
    }

    fn evict(&mut self) {
        let evicted = self
            .sequence
            .pop_eviction_candidate()
            .expect("pool is larger than the target size, so it cannot be empty");

        let index = evicted.index();

        let entry = self
            .entries
            .get_mut(index)
            .expect("sequence only refers to existing entries");

        let slot = entry
            .slot
            .take()
            .expect("sequence only refers to occupied entries");

        // Outstanding keys to this slot must no longer match.
        entry.generation = entry.generation.wrapping_add(1);
        self.vacant.push(index);

        if matches!(evicted, Evicted::Active(_)) {
            debug!(
                pool = %self.name,
                instance = %slot.name,
                "destroying active instance to shrink instance pool"
            );
        }

        drop(slot);
    }

    fn slot(&self, key: InstanceKey) -> Option<&Slot<T>> {
        if key.pool_id() != self.pool_id {
            return None;
        }

        self.entries
            .get(key.index())
            .filter(|entry| entry.generation == key.generation())
            .and_then(|entry| entry.slot.as_ref())
    }

    fn slot_mut(&mut self, key: InstanceKey) -> Option<&mut Slot<T>> {
        if key.pool_id() != self.pool_id {
            return None;
        }

        self.entries
            .get_mut(key.index())
            .filter(|entry| entry.generation == key.generation())
            .and_then(|entry| entry.slot.as_mut())
    }

    fn key_at(&self, index: usize) -> InstanceKey {
        let generation = self
            .entries
            .get(index)
            .expect("sequence only refers to existing entries")
            .generation;

        InstanceKey::new(self.pool_id, index, generation)
    }
}

impl<T: Instance> fmt::Debug for InstancePool<T> {
    #[cfg_attr(test, mutants::skip)] // Debug output has no behavior to verify beyond smoke tests.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("name", &self.name)
            .field("len", &self.len())
            .field("active_count", &self.active_count())
            .field("pool_size", &self.pool_size)
            .field("additive_overflow_amount", &self.additive_overflow_amount)
            .field("additive_overflow_max", &self.additive_overflow_max)
            .field("destructive_overflow", &self.destructive_overflow)
            .finish_non_exhaustive()
    }
}
