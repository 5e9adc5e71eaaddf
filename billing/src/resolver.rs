use crate::client::CustomerApi;
use crate::errors::Result;
use crate::types::{Customer, NewCustomer};

/// Returns the tenant's live billing customer, creating one only if none is
/// resolvable.
///
/// The provider-side search is eventually consistent: two concurrent
/// resolutions for the same tenant can both miss and create duplicates.
/// That race is accepted here; no lock wraps the lookup-then-create sequence.
pub async fn resolve_customer<A: CustomerApi + ?Sized>(
    api: &A,
    tenant_id: &str,
    email: &str,
    name: Option<&str>,
) -> Result<Customer> {
    let matches = api.search_by_tenant(tenant_id).await?;

    if let Some(candidate) = matches.into_iter().next() {
        // Search indexes lag deletions; confirm the record is still live.
        match api.retrieve(&candidate.id).await {
            Ok(Some(live)) if !live.deleted => {
                tracing::debug!(customer_id = %live.id, tenant_id, "reusing billing customer");
                return Ok(live);
            }
            Ok(_) => {
                tracing::warn!(
                    customer_id = %candidate.id,
                    tenant_id,
                    "indexed billing customer no longer live, creating a new one"
                );
            }
            Err(err) => {
                tracing::warn!(
                    customer_id = %candidate.id,
                    tenant_id,
                    "could not confirm billing customer ({err}), creating a new one"
                );
            }
        }
    }

    api.create(NewCustomer {
        tenant_id,
        email,
        name,
    })
    .await
}
