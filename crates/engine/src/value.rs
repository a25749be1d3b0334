//! Literal-or-computed property values
//!
//! Every node property is a `Value`: unset, a fixed literal, or a closure of
//! the simulation state and the node's own payload. Values are resolved once
//! per consumer per frame; a computed value may read state that other nodes
//! mutate, so callers resolve once and reuse the result.

use std::fmt;

use easel_render::FontSpec;

/// A property slot
pub enum Value<T, S, D> {
    /// Falls back to the property's default
    Unset,
    /// A constant
    Literal(T),
    /// Recomputed from state and payload on every resolve
    Computed(Box<dyn Fn(&S, &D) -> T>),
}

impl<T, S, D> Value<T, S, D> {
    /// Wrap a closure as a computed value
    pub fn computed(f: impl Fn(&S, &D) -> T + 'static) -> Self {
        Value::Computed(Box::new(f))
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, Value::Unset)
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Value::Literal(_))
    }
}

impl<T: Clone, S, D> Value<T, S, D> {
    /// Resolve against the current state, `None` when unset
    pub fn resolve(&self, state: &S, data: &D) -> Option<T> {
        match self {
            Value::Unset => None,
            Value::Literal(value) => Some(value.clone()),
            Value::Computed(f) => Some(f(state, data)),
        }
    }

    /// Resolve, falling back to `default` when unset
    pub fn resolve_or(&self, state: &S, data: &D, default: T) -> T {
        self.resolve(state, data).unwrap_or(default)
    }
}

impl<T, S, D> Default for Value<T, S, D> {
    fn default() -> Self {
        Value::Unset
    }
}

impl<T, S, D> From<T> for Value<T, S, D> {
    fn from(value: T) -> Self {
        Value::Literal(value)
    }
}

impl<S, D> From<&str> for Value<String, S, D> {
    fn from(value: &str) -> Self {
        Value::Literal(value.to_string())
    }
}

impl<S, D> From<&str> for Value<FontSpec, S, D> {
    fn from(value: &str) -> Self {
        Value::Literal(FontSpec::parse(value))
    }
}

impl<T: fmt::Debug, S, D> fmt::Debug for Value<T, S, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unset => write!(f, "Unset"),
            Value::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Value::Computed(_) => write!(f, "Computed(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Globals;

    #[test]
    fn test_literal_ignores_state() {
        let value: Value<f32, Globals, ()> = 12.5.into();
        let mut state = Globals::default();
        assert_eq!(value.resolve(&state, &()), Some(12.5));
        state.now = 5000.0;
        state.mouse.left_is_down = true;
        assert_eq!(value.resolve(&state, &()), Some(12.5));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let literal: Value<String, Globals, ()> = "score".into();
        let computed: Value<f32, Globals, u32> =
            Value::computed(|state: &Globals, data: &u32| state.now as f32 + *data as f32);
        let state = Globals {
            now: 10.0,
            ..Default::default()
        };
        assert_eq!(literal.resolve(&state, &()), literal.resolve(&state, &()));
        assert_eq!(computed.resolve(&state, &2), Some(12.0));
        assert_eq!(computed.resolve(&state, &2), computed.resolve(&state, &2));
    }

    #[test]
    fn test_unset_uses_default() {
        let value: Value<bool, Globals, ()> = Value::Unset;
        assert_eq!(value.resolve(&Globals::default(), &()), None);
        assert!(value.resolve_or(&Globals::default(), &(), true));
        assert!(!value.is_set());
    }

    #[test]
    fn test_computed_reads_payload() {
        let value: Value<usize, Globals, Vec<u8>> = Value::computed(|_: &Globals, data: &Vec<u8>| data.len());
        assert_eq!(value.resolve(&Globals::default(), &vec![1, 2, 3]), Some(3));
        assert!(!value.is_literal());
    }
}
