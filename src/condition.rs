//! Fluent predicate builder.
//!
//! A [`Condition`] accumulates WHERE-clause text with `?` placeholders and the
//! values bound to them, in the same order. Each chain is built for one query
//! and then handed to the finder.
//!
//! ```rust
//! use repomap::Condition;
//!
//! let condition = Condition::init("p", "id", 1).and("p", "name", "Ann");
//! assert_eq!(condition.text(), "p.id = ? AND p.name = ? ");
//! assert_eq!(condition.values().len(), 2);
//! ```

use sea_query::Value;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Condition {
    text: String,
    values: Vec<Value>,
}

impl Condition {
    /// `<table>.<key> = ? ` bound to `value`.
    pub fn init(table: &str, key: &str, value: impl Into<Value>) -> Self {
        Self::empty().push("", table, key, value.into())
    }

    /// No predicate; compiles to a statement without WHERE.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn and(self, table: &str, key: &str, value: impl Into<Value>) -> Self {
        self.push("AND ", table, key, value.into())
    }

    pub fn or(self, table: &str, key: &str, value: impl Into<Value>) -> Self {
        self.push("OR ", table, key, value.into())
    }

    pub fn and_not(self, table: &str, key: &str, value: impl Into<Value>) -> Self {
        self.push("AND NOT ", table, key, value.into())
    }

    pub fn or_not(self, table: &str, key: &str, value: impl Into<Value>) -> Self {
        self.push("OR NOT ", table, key, value.into())
    }

    /// Append `( <other> ) ` with `other`'s values merged at this position.
    ///
    /// Clipping an empty condition leaves `self` unchanged.
    pub fn clip(self, other: Condition) -> Self {
        self.push_group("", other)
    }

    /// `AND ( <other> ) `
    pub fn and_clip(self, other: Condition) -> Self {
        self.push_group("AND ", other)
    }

    /// `OR ( <other> ) `
    pub fn or_clip(self, other: Condition) -> Self {
        self.push_group("OR ", other)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.text, self.values)
    }

    // A connector at the start of the text would leave a dangling operator.
    fn connector<'a>(&self, connector: &'a str) -> &'a str {
        if !self.is_empty() {
            return connector;
        }
        match connector {
            "AND NOT " | "OR NOT " => "NOT ",
            _ => "",
        }
    }

    fn push(mut self, connector: &str, table: &str, key: &str, value: Value) -> Self {
        let connector = self.connector(connector);
        self.text.push_str(&format!("{connector}{table}.{key} = ? "));
        self.values.push(value);
        self
    }

    fn push_group(mut self, connector: &str, other: Condition) -> Self {
        if other.is_empty() {
            return self;
        }
        let connector = self.connector(connector);
        let (text, values) = other.into_parts();
        self.text.push_str(&format!("{connector}( {text}) "));
        self.values.extend(values);
        self
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::name::en::Name;
    use fake::Fake;

    fn placeholders(text: &str) -> usize {
        text.matches('?').count()
    }

    #[test]
    fn test_clip_of_empty_is_noop() {
        let base = Condition::init("p", "id", 1);
        assert_eq!(base.clone().and_clip(Condition::empty()), base);
        assert_eq!(base.clone().or_clip(Condition::empty()), base);
        assert_eq!(base.clone().clip(Condition::empty()), base);
        assert!(Condition::empty().and_clip(Condition::empty()).is_empty());
        assert_eq!(base.to_string(), "p.id = ?");
    }

    #[test]
    fn test_init_text() {
        let condition = Condition::init("p", "id", 1);
        assert_eq!(condition.text(), "p.id = ? ");
        assert_eq!(condition.values(), &[Value::Int(Some(1))]);
    }

    #[test]
    fn test_connectors_in_call_order() {
        let condition = Condition::init("p", "id", 1)
            .and("p", "name", "Ann")
            .or("a", "city", "X")
            .and_not("p", "id", 2)
            .or_not("a", "id", 3);
        assert_eq!(
            condition.text(),
            "p.id = ? AND p.name = ? OR a.city = ? AND NOT p.id = ? OR NOT a.id = ? "
        );
        assert_eq!(
            condition.values(),
            &[
                Value::Int(Some(1)),
                Value::from("Ann"),
                Value::from("X"),
                Value::Int(Some(2)),
                Value::Int(Some(3)),
            ]
        );
    }

    #[test]
    fn test_placeholders_match_values_for_any_chain() {
        let mut condition = Condition::init("p", "id", 0);
        for step in 0..40 {
            let name: String = Name().fake();
            condition = match step % 4 {
                0 => condition.and("p", "name", name),
                1 => condition.or("p", "name", name),
                2 => condition.and_not("p", "id", step),
                _ => condition.or_not("p", "id", step),
            };
            assert_eq!(placeholders(condition.text()), condition.values().len());
        }
        assert_eq!(condition.values()[3], Value::Int(Some(2)));
    }

    #[test]
    fn test_clip_merges_values_at_group_position() {
        let inner = Condition::init("a", "city", "X").or("a", "city", "Y");
        let condition = Condition::init("p", "id", 1).and_clip(inner).and("p", "name", "Ann");
        assert_eq!(
            condition.text(),
            "p.id = ? AND ( a.city = ? OR a.city = ? ) AND p.name = ? "
        );
        assert_eq!(
            condition.values(),
            &[
                Value::Int(Some(1)),
                Value::from("X"),
                Value::from("Y"),
                Value::from("Ann"),
            ]
        );
        assert_eq!(placeholders(condition.text()), condition.values().len());
    }

    #[test]
    fn test_plain_clip_on_empty() {
        let condition = Condition::empty().clip(Condition::init("p", "id", 1));
        assert_eq!(condition.text(), "( p.id = ? ) ");
        assert_eq!(condition.values().len(), 1);
    }

    #[test]
    fn test_connector_dropped_on_empty() {
        assert_eq!(Condition::empty().and("p", "id", 1).text(), "p.id = ? ");
        assert_eq!(Condition::empty().or_not("p", "id", 1).text(), "NOT p.id = ? ");
    }

    #[test]
    fn test_empty() {
        let condition = Condition::empty();
        assert!(condition.is_empty());
        assert_eq!(condition.text(), "");
        assert!(condition.values().is_empty());
    }
}
