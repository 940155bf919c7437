use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    AccountType, AssetId, AssetState, CategoryId, SortField, SortOrder, UserId,
};

/// Parameter tuple for the paginated "list assets" operation.
///
/// Encoded into a query string via [`AssetListQuery::to_query_pairs`];
/// set-valued filters become repeated keys
/// (`states=ASSIGNED&states=AVAILABLE`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetListQuery {
    pub page: u32,
    pub take: u32,
    pub search: String,
    pub states: Vec<AssetState>,
    pub category_ids: Vec<CategoryId>,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
}

impl AssetListQuery {
    /// Flattens the tuple into query-string pairs in a stable order.
    ///
    /// Enum tokens are derived from the serde wire names so the query
    /// string cannot drift from the JSON representation.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("take", self.take.to_string()),
        ];
        if !self.search.is_empty() {
            pairs.push(("search", self.search.clone()));
        }
        for state in &self.states {
            pairs.push(("states", wire_token(state)));
        }
        for category_id in &self.category_ids {
            pairs.push(("categoryIds", category_id.0.to_string()));
        }
        pairs.push(("sortField", wire_token(&self.sort_field)));
        pairs.push(("sortOrder", wire_token(&self.sort_order)));
        pairs
    }
}

/// Serde wire name of a unit enum variant. Falls back to an empty token if
/// the value does not serialize to a string; the tests pin every variant's
/// token.
fn wire_token<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(token)) => token,
        other => {
            debug_assert!(false, "non-string wire token: {other:?}");
            String::new()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub id: CategoryId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSummary {
    pub id: AssetId,
    pub asset_code: String,
    pub name: String,
    pub category: CategorySummary,
    pub state: AssetState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub total_pages: u32,
}

/// One server-sorted, server-filtered page of assets. Replaced wholesale on
/// every fetch; never merged with a previous page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPage {
    pub items: Vec<AssetSummary>,
    pub pagination: PageMeta,
}

impl AssetPage {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            pagination: PageMeta { total_pages: 0 },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDetail {
    #[serde(flatten)]
    pub summary: AssetSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specification: Option<String>,
    pub installed_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffRef {
    pub staff_code: String,
    pub full_name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentSummary {
    pub assigned_date: DateTime<Utc>,
    pub assigned_to: StaffRef,
    pub asset: AssetSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentPage {
    pub items: Vec<AssignmentSummary>,
    pub pagination: PageMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    pub username: String,
    pub full_name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
}
