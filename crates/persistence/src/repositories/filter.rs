//! Dynamic WHERE clause construction for counted list queries.

/// Tracks filter conditions and parameter positions for a list query.
///
/// The same clause feeds both the COUNT statement and the page statement
/// so totals always reflect the active filters.
pub(crate) struct ListFilterBuilder {
    conditions: Vec<String>,
    param_count: i32,
}

impl ListFilterBuilder {
    pub(crate) fn new() -> Self {
        Self {
            conditions: Vec::new(),
            param_count: 0,
        }
    }

    /// Registers the next bind parameter and returns its 1-based position.
    pub(crate) fn next_param(&mut self) -> i32 {
        self.param_count += 1;
        self.param_count
    }

    pub(crate) fn push(&mut self, condition: String) {
        self.conditions.push(condition);
    }

    /// Get the WHERE clause as a string.
    pub(crate) fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            "TRUE".to_string()
        } else {
            self.conditions.join(" AND ")
        }
    }

    /// Get the current parameter count.
    pub(crate) fn param_count(&self) -> i32 {
        self.param_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_is_true() {
        let filter = ListFilterBuilder::new();
        assert_eq!(filter.where_clause(), "TRUE");
        assert_eq!(filter.param_count(), 0);
    }

    #[test]
    fn test_conditions_join_with_and() {
        let mut filter = ListFilterBuilder::new();
        let p = filter.next_param();
        filter.push(format!("status = ${}", p));
        let p = filter.next_param();
        filter.push(format!("tier = ${}", p));
        assert_eq!(filter.where_clause(), "status = $1 AND tier = $2");
        assert_eq!(filter.param_count(), 2);
    }

    #[test]
    fn test_param_positions_increment() {
        let mut filter = ListFilterBuilder::new();
        assert_eq!(filter.next_param(), 1);
        assert_eq!(filter.next_param(), 2);
        assert_eq!(filter.next_param(), 3);
    }
}
