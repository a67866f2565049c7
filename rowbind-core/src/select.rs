use crate::Filter;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

/// A table scoped read: which rows, in which order, which window.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Select {
    pub filter: Filter,
    pub order: Vec<(String, Order)>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Select {
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            ..Default::default()
        }
    }

    pub fn order_by(mut self, field: impl Into<String>, order: Order) -> Self {
        self.order.push((field.into(), order));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Window on page `number` (1 based) of `size` rows.
    pub fn page(self, number: u64, size: u64) -> Self {
        self.offset(number.saturating_sub(1).saturating_mul(size))
            .limit(size)
    }
}

#[cfg(test)]
mod tests {
    use super::Select;

    #[test]
    fn page_window() {
        let select = Select::default().page(3, 20);
        assert_eq!(select.offset, Some(40));
        assert_eq!(select.limit, Some(20));
        let select = Select::default().page(0, 20);
        assert_eq!(select.offset, Some(0));
    }

    #[test]
    fn page_saturates() {
        let select = Select::default().page(u64::MAX, 50);
        assert_eq!(select.offset, Some(u64::MAX));
        assert_eq!(select.limit, Some(50));
    }
}
