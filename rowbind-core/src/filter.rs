use crate::{Record, Value};
use std::cmp::Ordering;

/// Row predicate understood by every [`crate::Executor`].
///
/// `matches` is the reference evaluation: comparisons against a null field are
/// false (SQL three valued logic collapsed to false), except `Eq(field, Null)`
/// which reads as `IS NULL`. An empty `In` matches nothing and an empty `NotIn`
/// matches everything.
#[derive(Default, Debug, Clone, PartialEq)]
pub enum Filter {
    #[default]
    All,
    Eq(String, Value),
    Ne(String, Value),
    In(String, Vec<Value>),
    NotIn(String, Vec<Value>),
    IsNull(String),
    Gt(String, Value),
    Lt(String, Value),
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(field.into(), value.into())
    }

    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Ne(field.into(), value.into())
    }

    pub fn is_in(field: impl Into<String>, values: impl IntoIterator<Item = Value>) -> Self {
        Filter::In(field.into(), values.into_iter().collect())
    }

    pub fn not_in(field: impl Into<String>, values: impl IntoIterator<Item = Value>) -> Self {
        Filter::NotIn(field.into(), values.into_iter().collect())
    }

    pub fn is_null(field: impl Into<String>) -> Self {
        Filter::IsNull(field.into())
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Gt(field.into(), value.into())
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Lt(field.into(), value.into())
    }

    /// Conjunction, flattening nested `And` and dropping `All`.
    pub fn and(self, other: Filter) -> Self {
        match (self, other) {
            (Filter::All, v) | (v, Filter::All) => v,
            (Filter::And(mut l), Filter::And(r)) => {
                l.extend(r);
                Filter::And(l)
            }
            (Filter::And(mut l), r) => {
                l.push(r);
                Filter::And(l)
            }
            (l, Filter::And(mut r)) => {
                r.insert(0, l);
                Filter::And(r)
            }
            (l, r) => Filter::And(vec![l, r]),
        }
    }

    pub fn or(self, other: Filter) -> Self {
        match (self, other) {
            (Filter::Or(mut l), r) => {
                l.push(r);
                Filter::Or(l)
            }
            (l, r) => Filter::Or(vec![l, r]),
        }
    }

    pub fn negate(self) -> Self {
        match self {
            Filter::Not(inner) => *inner,
            v => Filter::Not(Box::new(v)),
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq(field, Value::Null) | Filter::IsNull(field) => record.value(field).is_null(),
            Filter::Eq(field, value) => record.value(field) == value,
            Filter::Ne(field, value) => {
                let current = record.value(field);
                !current.is_null() && current != value
            }
            Filter::In(field, values) => {
                let current = record.value(field);
                !current.is_null() && values.contains(current)
            }
            Filter::NotIn(field, values) => {
                if values.is_empty() {
                    return true;
                }
                let current = record.value(field);
                !current.is_null() && !values.contains(current)
            }
            Filter::Gt(field, value) => compared(record.value(field), value, Ordering::Greater),
            Filter::Lt(field, value) => compared(record.value(field), value, Ordering::Less),
            Filter::And(filters) => filters.iter().all(|v| v.matches(record)),
            Filter::Or(filters) => filters.iter().any(|v| v.matches(record)),
            Filter::Not(filter) => !filter.matches(record),
        }
    }
}

fn compared(current: &Value, value: &Value, expected: Ordering) -> bool {
    !current.is_null() && !value.is_null() && current.compare(value) == expected
}

#[cfg(test)]
mod tests {
    use super::Filter;
    use crate::{Record, Value};

    fn row() -> Record {
        Record::from_iter([
            ("id", Value::from("a1")),
            ("listId", Value::from("l1")),
            ("rank", Value::from(3)),
            ("note", Value::Null),
        ])
    }

    #[test]
    fn eq_null_reads_as_is_null() {
        assert!(Filter::eq("note", Value::Null).matches(&row()));
        assert!(Filter::eq("missing", Value::Null).matches(&row()));
        assert!(!Filter::eq("id", Value::Null).matches(&row()));
    }

    #[test]
    fn comparisons_against_null_are_false() {
        assert!(!Filter::ne("note", "x").matches(&row()));
        assert!(!Filter::is_in("note", [Value::Null]).matches(&row()));
        assert!(!Filter::not_in("note", ["x".into()]).matches(&row()));
        assert!(!Filter::gt("note", 1).matches(&row()));
    }

    #[test]
    fn empty_sets() {
        assert!(!Filter::is_in("id", []).matches(&row()));
        assert!(Filter::not_in("id", []).matches(&row()));
        assert!(Filter::not_in("note", []).matches(&row()));
    }

    #[test]
    fn composition() {
        let filter = Filter::eq("listId", "l1").and(Filter::not_in("id", ["b2".into()]));
        assert!(filter.matches(&row()));
        assert!(matches!(&filter, Filter::And(v) if v.len() == 2));
        assert_eq!(Filter::All.and(Filter::eq("id", "a1")), Filter::eq("id", "a1"));
        assert!(Filter::gt("rank", 2).and(Filter::lt("rank", 4)).matches(&row()));
        assert!(Filter::eq("rank", 9).or(Filter::eq("rank", 3)).matches(&row()));
        assert!(!Filter::eq("rank", 3).negate().matches(&row()));
        assert_eq!(Filter::eq("rank", 3).negate().negate(), Filter::eq("rank", 3));
    }
}
