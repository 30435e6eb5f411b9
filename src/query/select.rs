//! Select query builder.
//!
//! [`SelectQuery`] collects the optional parts of a select (filter, ordering and
//! page window) and compiles them, together with the descriptor's joins, into a
//! [`Statement`]. Each optional clause appears only when its input is present.

use super::{join_clause, select_columns, Page, Statement};
use crate::condition::Condition;
use crate::schema::EntityDescriptor;
use sea_query::Value;

/// Query builder for one described entity and its joined relations
///
/// # Example
///
/// ```rust
/// use repomap::query::SelectQuery;
/// use repomap::{entity, Condition, Entity, Schema};
///
/// #[derive(Debug, Default)]
/// struct Address { id: i32, city: String }
///
/// entity!(Address, Schema::<Address>::builder("address", "a")
///     .primary("id", |a| a.id, |a, v| a.id = v)
///     .field("city", |a| a.city.clone(), |a, v| a.city = v)
///     .build());
///
/// let descriptor = Address::schema().unwrap().descriptor();
/// let statement = SelectQuery::new(descriptor)
///     .filter(Condition::init("a", "city", "X"))
///     .order_by(vec!["city ASC".to_string()])
///     .page(10, 20)
///     .build();
/// assert_eq!(
///     statement.sql,
///     "SELECT a.id, a.city FROM address AS a WHERE a.city = ? ORDER BY city ASC LIMIT 10 OFFSET 20"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct SelectQuery<'a> {
    descriptor: &'a EntityDescriptor,
    condition: Condition,
    order: Vec<String>,
    page: Option<Page>,
}

impl<'a> SelectQuery<'a> {
    pub fn new(descriptor: &'a EntityDescriptor) -> Self {
        Self {
            descriptor,
            condition: Condition::empty(),
            order: Vec::new(),
            page: None,
        }
    }

    /// Add a WHERE clause. An empty condition leaves the query unfiltered.
    pub fn filter(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    /// Order-by fragments, each `column [ASC|DESC]`, emitted in the given order.
    pub fn order_by(mut self, fragments: Vec<String>) -> Self {
        self.order = fragments;
        self
    }

    pub fn page(mut self, limit: u64, offset: u64) -> Self {
        self.page = Some(Page::new(limit, offset));
        self
    }

    /// Compile the select with its full projection.
    pub fn build(self) -> Statement {
        let projection = select_columns(self.descriptor);
        let columns = projection
            .iter()
            .map(|column| column.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let page = self.page;
        let (mut sql, values) = self.compile(&columns);
        if let Some(page) = page {
            sql.push_str(&format!(" LIMIT {} OFFSET {}", page.limit, page.offset));
        }
        Statement::new(sql, values).with_projection(projection)
    }

    /// Compile `SELECT count(*)` over the same joins, filter and ordering. The page
    /// window is never applied to a count.
    pub fn build_count(self) -> Statement {
        let (sql, values) = self.compile("count(*)");
        Statement::new(sql, values)
    }

    fn compile(self, columns: &str) -> (String, Vec<Value>) {
        let descriptor = self.descriptor;
        let mut sql = format!(
            "SELECT {columns} FROM {} AS {}",
            descriptor.table(),
            descriptor.alias()
        );
        let joins = join_clause(descriptor);
        if !joins.is_empty() {
            sql.push(' ');
            sql.push_str(&joins);
        }
        let (text, values) = self.condition.into_parts();
        let text = text.trim_end();
        if !text.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(text);
        }
        if !self.order.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order.join(", "));
        }
        (sql, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests_cfg::Person;
    use crate::Entity;

    fn person() -> &'static EntityDescriptor {
        Person::schema().unwrap().descriptor()
    }

    #[test]
    fn test_select_with_join_and_no_where() {
        let statement = SelectQuery::new(person()).build();
        assert_eq!(
            statement.sql,
            "SELECT p.id, p.name, a.id, a.city FROM person AS p LEFT JOIN address AS a ON p.address_id = a.id"
        );
        assert!(statement.values.is_empty());
        assert_eq!(statement.projection.len(), 4);
    }

    #[test]
    fn test_select_where_keeps_condition_values_in_order() {
        let condition = Condition::init("p", "name", "Ann").or("a", "city", "X");
        let statement = SelectQuery::new(person()).filter(condition).build();
        assert!(statement
            .sql
            .ends_with("LEFT JOIN address AS a ON p.address_id = a.id WHERE p.name = ? OR a.city = ?"));
        assert_eq!(statement.values, vec![Value::from("Ann"), Value::from("X")]);
        assert_eq!(statement.placeholder_count(), statement.values.len());
    }

    #[test]
    fn test_select_page_appended_exactly() {
        let statement = SelectQuery::new(person()).page(5, 10).build();
        assert!(statement.sql.ends_with("ON p.address_id = a.id LIMIT 5 OFFSET 10"));
    }

    #[test]
    fn test_select_order_fragments() {
        let statement = SelectQuery::new(person())
            .order_by(vec!["name ASC".to_string(), "id DESC".to_string()])
            .page(1, 0)
            .build();
        assert!(statement.sql.ends_with(" ORDER BY name ASC, id DESC LIMIT 1 OFFSET 0"));
    }

    #[test]
    fn test_empty_condition_adds_no_where() {
        let statement = SelectQuery::new(person()).filter(Condition::empty()).build();
        assert!(!statement.sql.contains("WHERE"));
    }

    #[test]
    fn test_count_has_no_page_and_no_projection() {
        let statement = SelectQuery::new(person())
            .filter(Condition::init("p", "id", 1))
            .order_by(vec!["id ASC".to_string()])
            .page(5, 10)
            .build_count();
        assert_eq!(
            statement.sql,
            "SELECT count(*) FROM person AS p LEFT JOIN address AS a ON p.address_id = a.id WHERE p.id = ? ORDER BY id ASC"
        );
        assert_eq!(statement.values, vec![Value::Int(Some(1))]);
        assert!(statement.projection.is_empty());
    }
}
