//! Per-repository ordering of select results.

use crate::error::ValidationError;
use crate::schema::EntityDescriptor;
use once_cell::sync::Lazy;
use regex::Regex;

// Fragments are interpolated into SQL, so only `column [ASC|DESC]` is accepted.
static ORDER_FRAGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?(\s+(ASC|DESC))?$")
        .expect("order fragment pattern compiles")
});

/// Supplies `ORDER BY` fragments for selects of a described entity.
///
/// An empty list leaves the select unordered.
pub trait OrderHook {
    fn order_by(&self, entity: &EntityDescriptor) -> Vec<String>;
}

/// No ordering.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unordered;

impl OrderHook for Unordered {
    fn order_by(&self, _entity: &EntityDescriptor) -> Vec<String> {
        Vec::new()
    }
}

/// The same fragments for every entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedOrder(pub Vec<String>);

impl OrderHook for FixedOrder {
    fn order_by(&self, _entity: &EntityDescriptor) -> Vec<String> {
        self.0.clone()
    }
}

impl<F> OrderHook for F
where
    F: Fn(&EntityDescriptor) -> Vec<String>,
{
    fn order_by(&self, entity: &EntityDescriptor) -> Vec<String> {
        self(entity)
    }
}

/// Fragments from `hook`, trimmed and checked.
pub(crate) fn fragments<O: OrderHook + ?Sized>(
    hook: &O,
    entity: &EntityDescriptor,
) -> Result<Vec<String>, ValidationError> {
    hook.order_by(entity)
        .into_iter()
        .map(|fragment| {
            let trimmed = fragment.trim();
            if ORDER_FRAGMENT.is_match(trimmed) {
                Ok(trimmed.to_string())
            } else {
                Err(ValidationError::InvalidOrder { fragment })
            }
        })
        .collect()
}
