use std::any::type_name;
use std::fmt;

use crate::pool::Factory;
use crate::{Instance, InstancePool, PoolConfig, SpawnInfo};

/// Builder for creating an instance of [`InstancePool`].
///
/// [`InstancePool`] requires a factory to be specified at construction time, which the pool calls
/// whenever it needs a new instance. All other settings are optional and default to the values of
/// [`PoolConfig::default()`].
///
/// # Examples
///
/// Configuring in code:
///
/// ```
/// use instance_pool::{Instance, InstancePool};
///
/// struct Bullet;
///
/// impl Instance for Bullet {
///     type Placement = ();
///
///     fn place(&mut self, _placement: ()) {}
/// }
///
/// let pool = InstancePool::builder()
///     .name("Bullet")
///     .pool_size(16)
///     .destructive_overflow(true)
///     .factory(|_| Bullet)
///     .build();
///
/// assert_eq!(pool.len(), 16);
/// ```
///
/// Configuring from a [`PoolConfig`]:
///
/// ```
/// use instance_pool::{Instance, InstancePool, PoolConfig};
///
/// struct Bullet;
///
/// impl Instance for Bullet {
///     type Placement = ();
///
///     fn place(&mut self, _placement: ()) {}
/// }
///
/// let config = PoolConfig::from_toml_str("pool_size = 4").unwrap();
///
/// let pool = InstancePool::builder()
///     .config(&config)
///     .factory(|_| Bullet)
///     .build();
///
/// assert_eq!(pool.len(), 4);
/// ```
#[must_use]
pub struct InstancePoolBuilder<T: Instance> {
    config: PoolConfig,
    factory: Option<Factory<T>>,
}

impl<T: Instance> fmt::Debug for InstancePoolBuilder<T> {
    #[cfg_attr(test, mutants::skip)] // Debug output has no behavior to verify beyond smoke tests.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("config", &self.config)
            .field("has_factory", &self.factory.is_some())
            .finish()
    }
}

impl<T: Instance> InstancePoolBuilder<T> {
    pub(crate) fn new() -> Self {
        Self {
            config: PoolConfig::default(),
            factory: None,
        }
    }

    /// Replaces all configuration values with those of `config`.
    ///
    /// Settings applied after this call override the corresponding values from `config`.
    pub fn config(mut self, config: &PoolConfig) -> Self {
        self.config = config.clone();
        self
    }

    /// Sets the base name used to name spawned instances.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Sets the initial number of slots in the pool.
    pub fn pool_size(mut self, size: usize) -> Self {
        self.config.pool_size = size;
        self
    }

    /// Sets how many slots to add when an activation finds no inactive slot.
    pub fn additive_overflow_amount(mut self, amount: usize) -> Self {
        self.config.additive_overflow_amount = amount;
        self
    }

    /// Sets the pool size beyond which additive overflow does not grow the pool.
    ///
    /// Values below the pool size are raised to the pool size when the pool is built.
    pub fn additive_overflow_max(mut self, max: usize) -> Self {
        self.config.additive_overflow_max = max;
        self
    }

    /// Sets whether to recycle the instance active the longest once the pool cannot grow.
    pub fn destructive_overflow(mut self, enabled: bool) -> Self {
        self.config.destructive_overflow = enabled;
        self
    }

    /// Sets the factory that creates new instances. This is mandatory.
    ///
    /// The factory is called once for every slot the pool creates, with a [`SpawnInfo`]
    /// describing the new instance.
    pub fn factory<F>(mut self, factory: F) -> Self
    where
        F: FnMut(SpawnInfo<'_>) -> T + 'static,
    {
        self.factory = Some(Box::new(factory));
        self
    }

    /// Builds the pool, spawning the initial set of instances.
    ///
    /// # Panics
    ///
    /// Panics if no factory has been set.
    #[must_use]
    pub fn build(self) -> InstancePool<T> {
        let factory = self
            .factory
            .expect("a factory must be set before building an InstancePool");

        InstancePool::new_inner(
            self.config.name,
            self.config.pool_size,
            self.config.additive_overflow_amount,
            self.config.additive_overflow_max,
            self.config.destructive_overflow,
            factory,
        )
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    struct Dummy;

    impl Instance for Dummy {
        type Placement = ();

        fn place(&mut self, _placement: ()) {}
    }

    #[test]
    fn defaults_match_default_config() {
        let pool = InstancePool::builder().factory(|_| Dummy).build();

        let defaults = PoolConfig::default();
        assert_eq!(pool.name(), defaults.name);
        assert_eq!(pool.pool_size(), defaults.pool_size);
        assert_eq!(pool.len(), defaults.pool_size);
        assert_eq!(pool.additive_overflow_amount(), 0);
        assert!(!pool.destructive_overflow());
    }

    #[test]
    fn later_settings_override_config() {
        let mut config = PoolConfig::default();
        config.pool_size = 3;
        config.name = "Config".to_string();

        let pool = InstancePool::builder()
            .config(&config)
            .pool_size(5)
            .factory(|_| Dummy)
            .build();

        assert_eq!(pool.name(), "Config");
        assert_eq!(pool.len(), 5);
    }

    #[test]
    fn factory_called_once_per_initial_slot() {
        let indexes = Rc::new(Cell::new(Vec::new()));

        let _pool = InstancePool::builder()
            .pool_size(3)
            .factory({
                let indexes = Rc::clone(&indexes);
                move |info| {
                    let mut seen = indexes.take();
                    seen.push(info.index());
                    indexes.set(seen);
                    Dummy
                }
            })
            .build();

        assert_eq!(indexes.take(), vec![0, 1, 2]);
    }

    #[test]
    #[should_panic]
    fn build_without_factory_panics() {
        let _pool = InstancePool::<Dummy>::builder().build();
    }

    #[test]
    fn debug_output_reports_factory_presence() {
        let builder = InstancePool::<Dummy>::builder();

        assert!(format!("{builder:?}").contains("has_factory: false"));
    }
}
