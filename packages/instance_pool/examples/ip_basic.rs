//! Demonstrates activating and deactivating instances and observing pool notifications.

use std::cell::Cell;
use std::rc::Rc;

use instance_pool::{Instance, InstancePool};

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Position {
    x: f32,
    y: f32,
}

#[derive(Debug)]
struct Coin {
    name: String,
    position: Position,
    visible: bool,
}

impl Instance for Coin {
    type Placement = Position;

    fn place(&mut self, placement: Position) {
        self.position = placement;
    }

    fn set_active(&mut self, active: bool) {
        self.visible = active;
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut pool = InstancePool::builder()
        .name("Coin")
        .pool_size(3)
        .factory(|info| Coin {
            name: info.name().to_string(),
            position: Position::default(),
            visible: true,
        })
        .build();

    let activations = Rc::new(Cell::new(0_u32));
    pool.on_activated().connect({
        let activations = Rc::clone(&activations);
        move || activations.set(activations.get() + 1)
    });

    let first = pool
        .activate_at(Position { x: 1.0, y: 2.0 })
        .expect("pool has inactive coins");
    let second = pool.activate().expect("pool has inactive coins");

    for key in [first, second] {
        let coin = pool.get(key).expect("coin was just activated");
        println!(
            "{} is at ({}, {}), visible: {}",
            coin.name, coin.position.x, coin.position.y, coin.visible
        );
    }

    pool.deactivate(first);

    let names: Vec<_> = pool.keys().filter_map(|key| pool.name_of(key)).collect();
    println!("Sequence after deactivating the first coin: {names:?}");

    let third = pool.activate().expect("pool has inactive coins");
    println!("Next activation picked {:?}", pool.name_of(third));

    println!("Observed {} activations", activations.get());
}
