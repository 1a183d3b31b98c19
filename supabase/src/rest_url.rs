use std::fmt::Display;

use url::Url;

use crate::SupabaseError;

/// A PostgREST table request: the table name plus its horizontal filters,
/// ordering and row limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestQuery {
    table: String,
    columns: String,
    filters: Vec<(String, String)>,
    order: Vec<String>,
    limit: Option<usize>,
}

impl RestQuery {
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: "*".to_string(),
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.columns = columns.into();
        self
    }

    /// `column = value`
    pub fn eq(mut self, column: &str, value: impl Display) -> Self {
        self.filters.push((column.to_string(), format!("eq.{value}")));
        self
    }

    /// `column <> value`
    pub fn neq(mut self, column: &str, value: impl Display) -> Self {
        self.filters.push((column.to_string(), format!("neq.{value}")));
        self
    }

    pub fn order_desc(mut self, column: &str) -> Self {
        self.order.push(format!("{column}.desc"));
        self
    }

    pub fn order_asc(mut self, column: &str) -> Self {
        self.order.push(format!("{column}.asc"));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Renders the query against a project's `/rest/v1/` base.
    pub(crate) fn to_url(&self, rest_base: &Url) -> Result<Url, SupabaseError> {
        let mut url = rest_base
            .join(self.table.trim_start_matches('/'))
            .map_err(|e| SupabaseError::InvalidUrl(e.to_string()))?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("select", &self.columns);
            for (column, predicate) in &self.filters {
                pairs.append_pair(column, predicate);
            }
            if !self.order.is_empty() {
                pairs.append_pair("order", &self.order.join(","));
            }
            if let Some(limit) = self.limit {
                pairs.append_pair("limit", &limit.to_string());
            }
        }

        Ok(url)
    }

    /// Renders only the filter part, for requests whose body carries the columns.
    pub(crate) fn to_filter_url(&self, rest_base: &Url) -> Result<Url, SupabaseError> {
        let mut url = rest_base
            .join(self.table.trim_start_matches('/'))
            .map_err(|e| SupabaseError::InvalidUrl(e.to_string()))?;

        if !self.filters.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (column, predicate) in &self.filters {
                pairs.append_pair(column, predicate);
            }
        }

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rest_base() -> Url {
        Url::parse("https://abc.supabase.co/rest/v1/").unwrap()
    }

    #[test]
    fn renders_filters_order_and_limit() {
        let url = RestQuery::table("avatars")
            .eq("user_id", "u-1")
            .eq("is_active", true)
            .order_desc("created_at")
            .limit(1)
            .to_url(&rest_base())
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://abc.supabase.co/rest/v1/avatars?select=*&user_id=eq.u-1&is_active=eq.true&order=created_at.desc&limit=1"
        );
    }

    #[test]
    fn later_limit_replaces_earlier_one() {
        let url = RestQuery::table("avatars")
            .limit(5)
            .limit(1)
            .to_url(&rest_base())
            .unwrap();

        assert_eq!(url.query(), Some("select=*&limit=1"));
    }

    #[test]
    fn filter_url_omits_select_and_encodes_values() {
        let url = RestQuery::table("avatars")
            .eq("user_id", "a b")
            .neq("id", "x&y")
            .to_filter_url(&rest_base())
            .unwrap();

        assert_eq!(url.query(), Some("user_id=eq.a+b&id=neq.x%26y"));
    }

    #[test]
    fn multiple_orderings_are_joined() {
        let url = RestQuery::table("avatars")
            .order_desc("created_at")
            .order_asc("name")
            .to_url(&rest_base())
            .unwrap();

        assert_eq!(url.query(), Some("select=*&order=created_at.desc%2Cname.asc"));
    }
}
