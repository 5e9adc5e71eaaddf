use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata key linking a billing customer back to its tenant.
pub const TENANT_METADATA_KEY: &str = "userId";

/// A customer record as stored by the billing provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Set by the provider when the record was deleted upstream.
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Customer {
    /// The tenant this customer is linked to, if any.
    pub fn tenant_id(&self) -> Option<&str> {
        self.metadata.get(TENANT_METADATA_KEY).map(String::as_str)
    }
}

/// Parameters for creating a customer record.
#[derive(Debug, Clone, Copy)]
pub struct NewCustomer<'a> {
    pub tenant_id: &'a str,
    pub email: &'a str,
    pub name: Option<&'a str>,
}

/// A subscription record, reduced to the fields the operator sync report uses.
#[derive(Debug, Clone, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub customer: String,
    pub status: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub plan: Option<Plan>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub nickname: Option<String>,
}

impl Subscription {
    pub fn tenant_id(&self) -> Option<&str> {
        self.metadata.get(TENANT_METADATA_KEY).map(String::as_str)
    }

    pub fn amount_cents(&self) -> i64 {
        self.plan.as_ref().and_then(|p| p.amount).unwrap_or(0)
    }
}

/// One page of a paginated listing response.
#[derive(Debug, Deserialize)]
pub(crate) struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
}
