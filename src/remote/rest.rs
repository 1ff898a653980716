use reqwest::Client;
use serde_json::Value;
use uuid::Uuid;

use super::StoreError;

/// A `column=op.value` filter pair for the row API.
#[derive(Debug, Clone)]
pub struct Filter {
    column: String,
    op: Op,
    value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Eq,
    Gte,
    Lte,
    Lt,
    Is,
}

impl Op {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Gte => "gte",
            Self::Lte => "lte",
            Self::Lt => "lt",
            Self::Is => "is",
        }
    }
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl ToString) -> Self {
        Self::new(column, Op::Eq, value)
    }

    pub fn gte(column: impl Into<String>, value: impl ToString) -> Self {
        Self::new(column, Op::Gte, value)
    }

    pub fn lte(column: impl Into<String>, value: impl ToString) -> Self {
        Self::new(column, Op::Lte, value)
    }

    pub fn lt(column: impl Into<String>, value: impl ToString) -> Self {
        Self::new(column, Op::Lt, value)
    }

    /// IS comparison, for `null` / `true` / `false`.
    pub fn is(column: impl Into<String>, value: impl ToString) -> Self {
        Self::new(column, Op::Is, value)
    }

    fn new(column: impl Into<String>, op: Op, value: impl ToString) -> Self {
        Self {
            column: column.into(),
            op,
            value: value.to_string(),
        }
    }

    fn to_query_pair(&self) -> (String, String) {
        (
            self.column.clone(),
            format!("{}.{}", self.op.as_str(), self.value),
        )
    }
}

/// Result ordering for `select`.
#[derive(Debug, Clone)]
pub struct Order {
    column: String,
    descending: bool,
}

impl Order {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: false,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }

    fn render(&self) -> String {
        format!(
            "{}.{}",
            self.column,
            if self.descending { "desc" } else { "asc" }
        )
    }
}

/// Generic client for the hosted store's row API.
///
/// Every request carries the service key plus the session's bearer token;
/// the service applies row-level security from the token, so nothing here
/// can read or write another owner's rows even before the typed layer
/// adds its explicit owner filters.
#[derive(Clone)]
pub struct RestClient {
    base_url: String,
    service_key: String,
    access_token: String,
    http: Client,
}

impl RestClient {
    pub fn new(
        base_url: &str,
        service_key: &str,
        access_token: &str,
    ) -> Result<Self, StoreError> {
        let http = Client::builder().build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
            access_token: access_token.to_string(),
            http,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Fetch rows matching all filters, optionally ordered.
    pub async fn select(
        &self,
        table: &str,
        filters: &[Filter],
        order: Option<&Order>,
    ) -> Result<Vec<Value>, StoreError> {
        let mut query: Vec<(String, String)> = vec![("select".to_string(), "*".to_string())];
        query.extend(filters.iter().map(Filter::to_query_pair));
        if let Some(order) = order {
            query.push(("order".to_string(), order.render()));
        }

        let resp = self
            .http
            .get(self.table_url(table))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.access_token)
            .query(&query)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(StoreError::Service {
                context: "select",
                status,
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Insert one row and return the created row as stored by the service.
    pub async fn insert(&self, table: &str, row: Value) -> Result<Value, StoreError> {
        let resp = self
            .http
            .post(self.table_url(table))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.access_token)
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(StoreError::Service {
                context: "insert",
                status,
                body,
            });
        }

        let mut rows: Vec<Value> = serde_json::from_str(&body)?;
        rows.pop()
            .ok_or_else(|| StoreError::Unexpected("insert returned no representation".to_string()))
    }

    /// Patch the row with the given id.
    pub async fn update(&self, table: &str, id: Uuid, patch: Value) -> Result<(), StoreError> {
        let resp = self
            .http
            .patch(self.table_url(table))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.access_token)
            .query(&[("id", format!("eq.{}", id))])
            .json(&patch)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Service {
                context: "update",
                status,
                body,
            });
        }
        Ok(())
    }

    /// Delete the row with the given id.
    pub async fn delete(&self, table: &str, id: Uuid) -> Result<(), StoreError> {
        let resp = self
            .http
            .delete(self.table_url(table))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.access_token)
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Service {
                context: "delete",
                status,
                body,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_render_as_op_dot_value() {
        let id = Uuid::new_v4();
        assert_eq!(
            Filter::eq("owner_id", id).to_query_pair(),
            ("owner_id".to_string(), format!("eq.{}", id))
        );
        assert_eq!(
            Filter::gte("due_at", "2026-03-08T00:00:00Z").to_query_pair(),
            (
                "due_at".to_string(),
                "gte.2026-03-08T00:00:00Z".to_string()
            )
        );
        assert_eq!(
            Filter::is("completed", false).to_query_pair(),
            ("completed".to_string(), "is.false".to_string())
        );
        assert_eq!(
            Filter::lt("due_at", "x").to_query_pair().1,
            "lt.x".to_string()
        );
    }

    #[test]
    fn order_renders_direction() {
        assert_eq!(Order::asc("created_at").render(), "created_at.asc");
        assert_eq!(Order::desc("recorded_at").render(), "recorded_at.desc");
    }
}
