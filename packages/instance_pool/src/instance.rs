/// Hooks that an [`InstancePool`][crate::InstancePool] calls on the instances it manages.
///
/// The pool does not know anything about the internals of an instance. It only tracks whether
/// each instance is active and tells the instance about it, and it passes placement data from the
/// caller to the instance when activating it.
///
/// # Example
///
/// ```rust
/// use instance_pool::Instance;
///
/// #[derive(Default)]
/// struct Projectile {
///     position: (f32, f32),
///     visible: bool,
/// }
///
/// impl Instance for Projectile {
///     type Placement = (f32, f32);
///
///     fn place(&mut self, placement: (f32, f32)) {
///         self.position = placement;
///     }
///
///     fn set_active(&mut self, active: bool) {
///         self.visible = active;
///     }
/// }
/// ```
pub trait Instance {
    /// Data describing where an activated instance should be placed.
    ///
    /// The [`Default`] value is used when activating without explicit placement and should
    /// represent the origin of whatever coordinate system the instance uses.
    type Placement: Default;

    /// Applies placement data to the instance. Called every time the instance is activated,
    /// after the instance has been marked active.
    ///
    /// The pool passes the value through unmodified.
    fn place(&mut self, placement: Self::Placement);

    /// Informs the instance that it has been activated or deactivated by the pool.
    ///
    /// Newly spawned instances are informed that they are inactive. The default implementation
    /// does nothing.
    fn set_active(&mut self, active: bool) {
        _ = active;
    }
}

/// Describes an instance that the pool is asking its factory to create.
///
/// The pool passes this to the factory once for every new slot created while growing.
#[derive(Clone, Copy, Debug)]
pub struct SpawnInfo<'a> {
    index: usize,
    name: &'a str,
}

impl<'a> SpawnInfo<'a> {
    #[must_use]
    pub(crate) fn new(index: usize, name: &'a str) -> Self {
        Self { index, name }
    }

    /// The creation index of the instance.
    ///
    /// A pool growing from `n` to `m` slots spawns instances with indexes `n..m`, in increasing
    /// order.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The debug name of the instance, derived from the pool name and the creation index,
    /// e.g. `"Bullet (3)"`.
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.name
    }
}
