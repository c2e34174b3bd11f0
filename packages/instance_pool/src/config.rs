use toml::{Table, Value};

use crate::{Error, Result};

const DEFAULT_NAME: &str = "instance";
const DEFAULT_POOL_SIZE: usize = 100;

/// Configuration values of an [`InstancePool`][crate::InstancePool].
///
/// Apply a configuration via [`InstancePoolBuilder::config()`][crate::InstancePoolBuilder::config].
/// Configurations can be constructed in code, starting from [`PoolConfig::default()`], or loaded
/// from TOML via [`PoolConfig::from_toml_str()`].
///
/// # Example
///
/// ```rust
/// use instance_pool::PoolConfig;
///
/// let config = PoolConfig::from_toml_str(
///     r#"
///     name = "Bullet"
///     pool_size = 32
///     additive_overflow_amount = 8
///     additive_overflow_max = 64
///     destructive_overflow = true
///     "#,
/// )
/// .unwrap();
///
/// assert_eq!(config.name, "Bullet");
/// assert_eq!(config.pool_size, 32);
/// assert!(config.destructive_overflow);
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct PoolConfig {
    /// Base name for spawned instances. Each instance is named `"{name} ({index})"`.
    pub name: String,

    /// Target number of slots in the pool.
    pub pool_size: usize,

    /// How many slots to add when an activation finds no inactive slot and growth is permitted.
    pub additive_overflow_amount: usize,

    /// Ceiling for additive growth. Raised to `pool_size` when the pool is built if lower.
    pub additive_overflow_max: usize,

    /// Whether to recycle the least recently activated instance once growth is exhausted.
    pub destructive_overflow: bool,
}

impl PoolConfig {
    /// Parses a configuration from a TOML document.
    ///
    /// All keys are optional; missing keys keep their default values. Negative sizes are clamped
    /// to zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML, if a key is not recognized or if a value
    /// has the wrong type.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let table: Table = toml::from_str(text)?;

        let mut config = Self::default();

        for (field, value) in &table {
            match field.as_str() {
                "name" => config.name = string_field(field, value)?,
                "pool_size" => config.pool_size = size_field(field, value)?,
                "additive_overflow_amount" => {
                    config.additive_overflow_amount = size_field(field, value)?;
                }
                "additive_overflow_max" => {
                    config.additive_overflow_max = size_field(field, value)?;
                }
                "destructive_overflow" => {
                    config.destructive_overflow = bool_field(field, value)?;
                }
                _ => {
                    return Err(Error::InvalidField {
                        field: field.clone(),
                        problem: "not a recognized pool configuration key".to_string(),
                    });
                }
            }
        }

        Ok(config)
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            pool_size: DEFAULT_POOL_SIZE,
            additive_overflow_amount: 0,
            additive_overflow_max: 0,
            destructive_overflow: false,
        }
    }
}

fn wrong_type(field: &str, expected: &str, value: &Value) -> Error {
    Error::InvalidField {
        field: field.to_string(),
        problem: format!("expected {expected}, found {}", value.type_str()),
    }
}

fn string_field(field: &str, value: &Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| wrong_type(field, "a string", value))
}

fn bool_field(field: &str, value: &Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| wrong_type(field, "a boolean", value))
}

fn size_field(field: &str, value: &Value) -> Result<usize> {
    let raw = value
        .as_integer()
        .ok_or_else(|| wrong_type(field, "an integer", value))?;

    // Negative sizes are clamped, not rejected.
    Ok(usize::try_from(raw.max(0)).unwrap_or(usize::MAX))
}
