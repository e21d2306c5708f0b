// SPDX-FileCopyrightText: 2026 Lavka Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OData query construction: `$filter`/`$expand`/`$select`/`$orderby`/`$top`.
//!
//! Values are passed to reqwest as query pairs, which percent-encodes them;
//! the helpers here only handle OData literal syntax.

/// A `$`-parameter set for a collection request.
#[derive(Debug, Clone, Default)]
pub struct Query {
    filter: Option<String>,
    expand: Option<String>,
    select: Option<String>,
    orderby: Option<String>,
    top: Option<u32>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn expand(mut self, expand: impl Into<String>) -> Self {
        self.expand = Some(expand.into());
        self
    }

    pub fn select(mut self, select: impl Into<String>) -> Self {
        self.select = Some(select.into());
        self
    }

    pub fn orderby(mut self, orderby: impl Into<String>) -> Self {
        self.orderby = Some(orderby.into());
        self
    }

    pub fn top(mut self, top: u32) -> Self {
        self.top = Some(top);
        self
    }

    /// Query pairs in OData parameter order, always ending with
    /// `$format=json`.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(filter) = &self.filter {
            params.push(("$filter", filter.clone()));
        }
        if let Some(expand) = &self.expand {
            params.push(("$expand", expand.clone()));
        }
        if let Some(select) = &self.select {
            params.push(("$select", select.clone()));
        }
        if let Some(orderby) = &self.orderby {
            params.push(("$orderby", orderby.clone()));
        }
        if let Some(top) = self.top {
            params.push(("$top", top.to_string()));
        }
        params.push(("$format", "json".to_string()));
        params
    }
}

/// An OData string literal with embedded single quotes doubled.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// An OData guid literal for reference filters.
pub fn guid(key: &str) -> String {
    format!("guid'{key}'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_still_requests_json() {
        assert_eq!(Query::new().params(), vec![("$format", "json".to_string())]);
    }

    #[test]
    fn params_follow_builder_order() {
        let q = Query::new()
            .filter("DeletionMark eq false")
            .orderby("Date desc")
            .top(10);
        let params = q.params();
        assert_eq!(params[0], ("$filter", "DeletionMark eq false".to_string()));
        assert_eq!(params[1], ("$orderby", "Date desc".to_string()));
        assert_eq!(params[2], ("$top", "10".to_string()));
        assert_eq!(params[3], ("$format", "json".to_string()));
    }

    #[test]
    fn quote_doubles_embedded_quotes() {
        assert_eq!(quote("O'Hara"), "'O''Hara'");
        assert_eq!(quote("+79991234567"), "'+79991234567'");
    }

    #[test]
    fn guid_literal_shape() {
        assert_eq!(
            guid("6a1f-0000"),
            "guid'6a1f-0000'"
        );
    }
}
