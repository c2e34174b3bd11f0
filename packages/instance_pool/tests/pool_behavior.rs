//! End-to-end behavior of the instance pool, exercised through the public API only.

use std::cell::RefCell;
use std::rc::Rc;

use instance_pool::{Instance, InstanceKey, InstancePool, PoolConfig};

#[derive(Debug)]
struct Barrel {
    label: String,
    shelf: u8,
    visible: bool,
}

impl Instance for Barrel {
    type Placement = u8;

    fn place(&mut self, placement: u8) {
        self.shelf = placement;
    }

    fn set_active(&mut self, active: bool) {
        self.visible = active;
    }
}

fn barrel_pool(config: &PoolConfig) -> InstancePool<Barrel> {
    InstancePool::builder()
        .config(config)
        .factory(|info| Barrel {
            label: info.name().to_string(),
            shelf: 0,
            visible: true,
        })
        .build()
}

fn config(toml: &str) -> PoolConfig {
    PoolConfig::from_toml_str(toml).unwrap()
}

fn labels(pool: &InstancePool<Barrel>, keys: impl IntoIterator<Item = InstanceKey>) -> Vec<String> {
    keys.into_iter()
        .map(|key| pool.get(key).unwrap().label.clone())
        .collect()
}

#[test]
fn deactivated_instance_goes_behind_idle_ones() {
    let mut pool = barrel_pool(&config("name = \"Barrel\"\npool_size = 3"));

    let a = pool.activate().unwrap();
    let b = pool.activate().unwrap();
    assert_eq!(labels(&pool, [a, b]), vec!["Barrel (0)", "Barrel (1)"]);

    pool.deactivate(a).unwrap();
    assert_eq!(
        labels(&pool, pool.keys()),
        vec!["Barrel (1)", "Barrel (2)", "Barrel (0)"]
    );

    let c = pool.activate().unwrap();
    assert_eq!(labels(&pool, [c]), vec!["Barrel (2)"]);
    assert!(!pool.is_active(a));
}

#[test]
fn destructive_overflow_reuses_least_recently_deactivated() {
    let mut pool = barrel_pool(&config("pool_size = 3\ndestructive_overflow = true"));

    let r = pool.activate().unwrap();
    pool.deactivate(r).unwrap();

    // Exhaust the pool. The instance deactivated first sits behind the never-used ones.
    let mut activated = Vec::new();
    for _ in 0..3 {
        activated.push(pool.activate().unwrap());
    }
    assert_eq!(activated.last(), Some(&r));

    // The first activation in this round went to the front-most slot, which is now the oldest.
    let recycled = pool.activate().unwrap();
    assert_eq!(Some(&recycled), activated.first());
    assert_eq!(pool.len(), 3);
}

#[test]
fn destructive_overflow_picks_reactivated_resource_when_it_is_oldest() {
    let mut pool = barrel_pool(&config("pool_size = 2\ndestructive_overflow = true"));

    let a = pool.activate().unwrap();
    let b = pool.activate().unwrap();

    pool.deactivate(a).unwrap();
    pool.deactivate(b).unwrap();

    // A was deactivated first, so it is reactivated first and becomes the oldest active.
    assert_eq!(pool.activate(), Some(a));
    assert_eq!(pool.activate(), Some(b));
    assert_eq!(pool.activate(), Some(a));
}

#[test]
fn refused_activation_leaves_pool_unchanged() {
    let mut pool = barrel_pool(&config("pool_size = 2\nadditive_overflow_max = 2"));

    let a = pool.activate_at(4).unwrap();
    let b = pool.activate_at(5).unwrap();
    let before: Vec<_> = pool.keys().collect();

    assert_eq!(pool.activate_at(9), None);

    assert_eq!(pool.keys().collect::<Vec<_>>(), before);
    assert_eq!(pool.get(a).unwrap().shelf, 4);
    assert_eq!(pool.get(b).unwrap().shelf, 5);
    assert_eq!(pool.pool_size(), 2);
}

#[test]
fn additive_overflow_steps_up_to_ceiling() {
    let mut pool = barrel_pool(&config(
        "pool_size = 2\nadditive_overflow_amount = 3\nadditive_overflow_max = 7",
    ));

    let mut sizes = Vec::new();

    while let Some(key) = pool.activate() {
        assert!(pool.get(key).unwrap().visible);
        sizes.push(pool.len());
    }

    assert_eq!(sizes, vec![2, 2, 5, 5, 5, 7, 7]);
    assert_eq!(pool.active_count(), 7);
}

#[test]
fn keys_only_belong_to_the_pool_that_issued_them() {
    let mut shelf_a = barrel_pool(&config("name = \"A\"\npool_size = 2"));
    let mut shelf_b = barrel_pool(&config("name = \"B\"\npool_size = 2"));
    let deactivations = Rc::new(RefCell::new(0));

    shelf_a.on_deactivated().connect({
        let deactivations = Rc::clone(&deactivations);
        move || *deactivations.borrow_mut() += 1
    });

    let from_a = shelf_a.activate_at(3).unwrap();
    let from_b = shelf_b.activate_at(4).unwrap();

    assert_eq!(shelf_a.deactivate(from_b), None);
    assert!(!shelf_a.contains(from_b));
    assert!(!shelf_a.is_active(from_b));
    assert!(shelf_a.get_mut(from_b).is_none());
    assert_eq!(*deactivations.borrow(), 0);

    let barrel = shelf_a.get(from_a).unwrap();
    assert!(barrel.visible);
    assert_eq!(barrel.shelf, 3);
    assert_eq!(labels(&shelf_a, shelf_a.active_keys()), vec!["A (0)"]);
}

#[test]
fn shrink_spares_active_instances_while_inactive_remain() {
    let mut pool = barrel_pool(&config("pool_size = 6"));

    let active: Vec<_> = (0..3).map(|_| pool.activate().unwrap()).collect();

    pool.resize(3);

    assert_eq!(pool.inactive_count(), 0);
    for key in &active {
        assert!(pool.is_active(*key));
    }

    pool.resize(2);
    assert!(!pool.contains(active[0]));
}

#[test]
fn size_changed_listener_fires_only_on_change() {
    let mut pool = barrel_pool(&config(
        "pool_size = 1\nadditive_overflow_amount = 1\nadditive_overflow_max = 2",
    ));
    let events = Rc::new(RefCell::new(Vec::new()));

    pool.on_size_changed().connect({
        let events = Rc::clone(&events);
        move || events.borrow_mut().push("size_changed")
    });

    pool.resize(1);
    assert!(events.borrow().is_empty());

    pool.activate().unwrap();
    pool.activate().unwrap();
    assert_eq!(*events.borrow(), vec!["size_changed"]);
}

#[test]
fn operations_emit_tracing_events() {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let mut pool = barrel_pool(&config(
            "pool_size = 1\nadditive_overflow_amount = 1\nadditive_overflow_max = 2\ndestructive_overflow = true",
        ));

        for _ in 0..3 {
            pool.activate().unwrap();
        }

        pool.deactivate_oldest().unwrap();
        pool.resize(0);

        assert!(pool.is_empty());
    });
}
