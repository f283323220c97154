//! Configuration resolver.
//!
//! Turns three raw numbers (from sliders, flags, or a stored record) into a
//! [`Configuration`] that is always inside bounds and on its step grid.
//! Resolution never fails: non-finite input falls back to the field default.

use serde::Serialize;

/// Bounds, step and default for one configuration field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldBounds {
    pub min: u32,
    pub max: u32,
    pub step: u32,
    pub default: u32,
}

impl FieldBounds {
    /// Clamp a raw value onto this field's grid.
    pub fn resolve(&self, raw: f64) -> u32 {
        if !raw.is_finite() {
            return self.default;
        }
        let step = f64::from(self.step);
        let rounded = (raw / step).round() * step;
        rounded.clamp(f64::from(self.min), f64::from(self.max)) as u32
    }
}

pub const WORK_BOUNDS: FieldBounds = FieldBounds {
    min: 10,
    max: 60,
    step: 10,
    default: 30,
};

pub const REST_BOUNDS: FieldBounds = FieldBounds {
    min: 10,
    max: 60,
    step: 10,
    default: 30,
};

pub const SET_BOUNDS: FieldBounds = FieldBounds {
    min: 1,
    max: 10,
    step: 1,
    default: 3,
};

/// A validated session configuration.
///
/// Only [`resolve`] and [`Configuration::default`] produce one, so the
/// fields always satisfy [`WORK_BOUNDS`], [`REST_BOUNDS`] and [`SET_BOUNDS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    work_seconds: u32,
    rest_seconds: u32,
    set_count: u32,
}

impl Configuration {
    pub fn work_seconds(&self) -> u32 {
        self.work_seconds
    }

    pub fn rest_seconds(&self) -> u32 {
        self.rest_seconds
    }

    pub fn set_count(&self) -> u32 {
        self.set_count
    }

    /// Resolve a loosely typed stored record.
    ///
    /// Keys may be camelCase (`workSeconds`) or snake_case (`work_seconds`).
    /// Missing or non-numeric fields count as non-finite and take the default,
    /// each field on its own.
    pub fn resolve_persisted(record: &serde_json::Value) -> Self {
        let field = |camel: &str, snake: &str| {
            record
                .get(camel)
                .or_else(|| record.get(snake))
                .and_then(serde_json::Value::as_f64)
                .unwrap_or(f64::NAN)
        };
        resolve(
            field("workSeconds", "work_seconds"),
            field("restSeconds", "rest_seconds"),
            field("setCount", "set_count"),
        )
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            work_seconds: WORK_BOUNDS.default,
            rest_seconds: REST_BOUNDS.default,
            set_count: SET_BOUNDS.default,
        }
    }
}

/// Resolve raw work/rest/set values into a [`Configuration`].
pub fn resolve(raw_work: f64, raw_rest: f64, raw_sets: f64) -> Configuration {
    Configuration {
        work_seconds: WORK_BOUNDS.resolve(raw_work),
        rest_seconds: REST_BOUNDS.resolve(raw_rest),
        set_count: SET_BOUNDS.resolve(raw_sets),
    }
}
