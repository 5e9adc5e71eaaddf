//! Operator report reconciling billing subscriptions with tenant accounts.

use billing::{RestBillingClient, Subscription};
use gateway::actions::try_list_all_users;
use gateway::directory::{Directory, DirectoryError};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Billing(#[from] billing::BillingError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

#[derive(Debug, Default, PartialEq)]
pub struct SyncReport {
    pub subscriptions: usize,
    pub matched: usize,
    pub unmatched: usize,
    /// Tenants holding more than one distinct billing customer; the accepted
    /// resolution race made visible.
    pub duplicate_tenants: Vec<String>,
}

pub fn summarize(subscriptions: &[Subscription], known_users: &HashSet<String>) -> SyncReport {
    let mut customers_by_tenant: HashMap<&str, HashSet<&str>> = HashMap::new();
    let mut report = SyncReport {
        subscriptions: subscriptions.len(),
        ..SyncReport::default()
    };

    for subscription in subscriptions {
        match subscription.tenant_id() {
            Some(tenant) if known_users.contains(tenant) => {
                report.matched += 1;
                customers_by_tenant
                    .entry(tenant)
                    .or_default()
                    .insert(subscription.customer.as_str());
            }
            _ => report.unmatched += 1,
        }
    }

    report.duplicate_tenants = customers_by_tenant
        .into_iter()
        .filter(|(_, customers)| customers.len() > 1)
        .map(|(tenant, _)| tenant.to_string())
        .collect();
    report.duplicate_tenants.sort();

    report
}

/// Walks every subscription at the billing provider and reconciles each
/// against the directory's user accounts.
pub async fn run(
    billing_client: &RestBillingClient,
    directory: &dyn Directory,
) -> Result<SyncReport, SyncError> {
    let subscriptions = billing_client.list_subscriptions().await?;
    tracing::info!(count = subscriptions.len(), "fetched subscriptions");

    let known_users: HashSet<String> = try_list_all_users(directory)
        .await?
        .into_iter()
        .map(|user| user.id)
        .collect();

    Ok(summarize(&subscriptions, &known_users))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn subscription(id: &str, customer: &str, tenant: Option<&str>) -> Subscription {
        Subscription {
            id: id.to_string(),
            customer: customer.to_string(),
            status: "active".to_string(),
            metadata: tenant
                .map(|t| HashMap::from([("userId".to_string(), t.to_string())]))
                .unwrap_or_default(),
            plan: None,
        }
    }

    #[test]
    fn test_summarize_matches_and_duplicates() {
        let subscriptions = vec![
            subscription("sub_1", "cus_1", Some("tenant-1")),
            subscription("sub_2", "cus_2", Some("tenant-1")),
            subscription("sub_3", "cus_3", Some("tenant-2")),
            subscription("sub_4", "cus_4", Some("tenant-gone")),
            subscription("sub_5", "cus_5", None),
        ];
        let known_users =
            HashSet::from(["tenant-1".to_string(), "tenant-2".to_string()]);

        let report = summarize(&subscriptions, &known_users);

        assert_eq!(report.subscriptions, 5);
        assert_eq!(report.matched, 3);
        assert_eq!(report.unmatched, 2);
        // tenant-1 holds two distinct customers: the resolution race happened
        assert_eq!(report.duplicate_tenants, vec!["tenant-1".to_string()]);
    }

    #[test]
    fn test_summarize_empty() {
        let report = summarize(&[], &HashSet::new());
        assert_eq!(report, SyncReport::default());
    }
}
