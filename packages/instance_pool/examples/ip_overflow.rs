//! Demonstrates additive and destructive overflow with a configuration loaded from TOML.

use instance_pool::{Instance, InstancePool, PoolConfig};

const CONFIG: &str = r#"
name = "Spark"
pool_size = 2
additive_overflow_amount = 2
additive_overflow_max = 4
destructive_overflow = true
"#;

struct Spark {
    emitted_at: u32,
}

impl Instance for Spark {
    type Placement = u32;

    fn place(&mut self, placement: u32) {
        self.emitted_at = placement;
    }
}

fn main() -> Result<(), instance_pool::Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let config = PoolConfig::from_toml_str(CONFIG)?;

    let mut pool = InstancePool::builder()
        .config(&config)
        .factory(|_| Spark { emitted_at: 0 })
        .build();

    for frame in 0..6 {
        let Some(key) = pool.activate_at(frame) else {
            println!("Frame {frame}: no spark available");
            continue;
        };

        let spark = pool.get(key).expect("spark was just activated");

        println!(
            "Frame {frame}: activated {:?} (emitted at frame {}), pool size {}",
            pool.name_of(key),
            spark.emitted_at,
            pool.len()
        );
    }

    // Growth from overflow persists until the pool is explicitly shrunk.
    pool.resize(config.pool_size);
    println!("After shrinking back: pool size {}", pool.len());

    Ok(())
}
