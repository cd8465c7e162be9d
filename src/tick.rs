//! Decoded telemetry ticks
//!
//! A [`Tick`] maps variable names to decoded values for one sample. A key can be present
//! with no value: parsers produce these for whitelisted names the file does not declare,
//! and [`Tick::filter`] produces them for requested names the tick does not carry.
//!
//! ```rust
//! use ibtstream::{Tick, TelemetryError, Value};
//!
//! let mut tick = Tick::new();
//! tick.insert("Speed", Some(Value::Float(41.5)));
//! tick.insert("Gear", Some(Value::Int(3)));
//!
//! let speed: f32 = tick.get("Speed")?;
//! assert_eq!(speed, 41.5);
//! assert!(matches!(tick.get::<f64>("Speed"), Err(TelemetryError::TypeConversion { .. })));
//!
//! let view = tick.filter(["Speed", "Lap"]);
//! assert_eq!(view.len(), 2);
//! assert!(view.contains("Lap"));
//! assert_eq!(view.value("Lap"), None);
//! # Ok::<(), TelemetryError>(())
//! ```

use crate::{FromValue, Result, TelemetryError, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::hash_map;

/// One decoded sample: variable name to value, `None` marking an absent value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    values: HashMap<String, Option<Value>>,
}

impl Tick {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { values: HashMap::with_capacity(capacity) }
    }

    /// Set `name`, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: Option<Value>) {
        self.values.insert(name.into(), value);
    }

    /// A new tick holding exactly the requested keys.
    ///
    /// Keys this tick lacks are still present in the result, with an absent value.
    pub fn filter<I, S>(&self, names: I) -> Tick
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let values = names
            .into_iter()
            .map(|name| {
                let name = name.as_ref();
                (name.to_string(), self.value(name).cloned())
            })
            .collect();
        Tick { values }
    }

    /// Typed access to a value.
    ///
    /// Fails with [`TelemetryError::FieldNotFound`] when the key is missing, and with
    /// [`TelemetryError::TypeConversion`] when it holds another type or no value.
    pub fn get<T: FromValue>(&self, name: &str) -> Result<T> {
        let slot = self
            .values
            .get(name)
            .ok_or_else(|| TelemetryError::FieldNotFound { field: name.to_string() })?;

        let mismatch = |actual| TelemetryError::TypeConversion {
            field: name.to_string(),
            expected: T::TYPE_NAME,
            actual,
        };

        match slot {
            Some(value) => T::from_value(value).ok_or_else(|| mismatch(value.type_name())),
            None => Err(mismatch("absent")),
        }
    }

    /// The raw value of `name`, `None` when missing or absent.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name).and_then(Option::as_ref)
    }

    /// Whether `name` is a key of this tick, with or without a value.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, Option<Value>> {
        self.values.iter()
    }
}

impl<'a> IntoIterator for &'a Tick {
    type Item = (&'a String, &'a Option<Value>);
    type IntoIter = hash_map::Iter<'a, String, Option<Value>>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl IntoIterator for Tick {
    type Item = (String, Option<Value>);
    type IntoIter = hash_map::IntoIter<String, Option<Value>>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl FromIterator<(String, Option<Value>)> for Tick {
    fn from_iter<I: IntoIterator<Item = (String, Option<Value>)>>(iter: I) -> Self {
        Tick { values: iter.into_iter().collect() }
    }
}
