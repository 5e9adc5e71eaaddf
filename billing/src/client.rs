use crate::config::BillingConfig;
use crate::errors::{BillingError, Result};
use crate::types::{Customer, NewCustomer, Page, Subscription, TENANT_METADATA_KEY};
use async_trait::async_trait;

const PAGE_LIMIT: usize = 100;

/// Capability exposed by the billing provider for customer records.
///
/// Handlers and the resolver take this trait instead of the concrete REST
/// client so tests can substitute an in-memory fake.
#[async_trait]
pub trait CustomerApi: Send + Sync {
    /// All customers whose metadata links them to `tenant_id`.
    async fn search_by_tenant(&self, tenant_id: &str) -> Result<Vec<Customer>>;

    /// Re-fetches a customer by id. `None` means the provider no longer has
    /// the record.
    async fn retrieve(&self, customer_id: &str) -> Result<Option<Customer>>;

    /// Creates a customer linked to the tenant via metadata.
    async fn create(&self, new: NewCustomer<'_>) -> Result<Customer>;
}

/// REST client for the billing provider.
#[derive(Clone)]
pub struct RestBillingClient {
    client: reqwest::Client,
    api_base: String,
    secret_key: String,
}

impl RestBillingClient {
    pub fn new(config: &BillingConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: config.api_base.as_str().trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// Maps non-success statuses to [`BillingError::Api`] with the response
    /// body as detail. Detail is logged by callers server-side only.
    async fn check(endpoint: &str, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let detail = response.text().await.unwrap_or_default();
        Err(BillingError::Api {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            detail,
        })
    }

    /// Walks the subscription listing a page at a time.
    ///
    /// Used by the operator sync report, not by request handlers.
    pub async fn list_subscriptions(&self) -> Result<Vec<Subscription>> {
        let endpoint = self.endpoint("/v1/subscriptions");
        let mut all = Vec::new();
        let mut starting_after: Option<String> = None;

        loop {
            let mut query = vec![
                ("limit", PAGE_LIMIT.to_string()),
                ("status", "all".to_string()),
            ];
            if let Some(cursor) = &starting_after {
                query.push(("starting_after", cursor.clone()));
            }

            let response = self
                .client
                .get(&endpoint)
                .bearer_auth(&self.secret_key)
                .query(&query)
                .send()
                .await?;
            let page = Self::check(&endpoint, response)
                .await?
                .json::<Page<Subscription>>()
                .await?;

            tracing::debug!(count = page.data.len(), "fetched subscription page");
            starting_after = page.data.last().map(|sub| sub.id.clone());
            all.extend(page.data);

            if !page.has_more || starting_after.is_none() {
                break;
            }
        }

        Ok(all)
    }
}

#[async_trait]
impl CustomerApi for RestBillingClient {
    async fn search_by_tenant(&self, tenant_id: &str) -> Result<Vec<Customer>> {
        let endpoint = self.endpoint("/v1/customers/search");
        let query = format!("metadata['{TENANT_METADATA_KEY}']:'{tenant_id}'");

        let response = self
            .client
            .get(&endpoint)
            .bearer_auth(&self.secret_key)
            .query(&[("query", query.as_str())])
            .send()
            .await?;
        let page = Self::check(&endpoint, response)
            .await?
            .json::<Page<Customer>>()
            .await?;

        Ok(page.data)
    }

    async fn retrieve(&self, customer_id: &str) -> Result<Option<Customer>> {
        let endpoint = self.endpoint(&format!("/v1/customers/{customer_id}"));

        let response = self
            .client
            .get(&endpoint)
            .bearer_auth(&self.secret_key)
            .send()
            .await?;

        match Self::check(&endpoint, response).await {
            Ok(response) => Ok(Some(response.json::<Customer>().await?)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn create(&self, new: NewCustomer<'_>) -> Result<Customer> {
        let endpoint = self.endpoint("/v1/customers");
        let metadata_key = format!("metadata[{TENANT_METADATA_KEY}]");

        let mut form = vec![
            ("email", new.email),
            (metadata_key.as_str(), new.tenant_id),
        ];
        if let Some(name) = new.name {
            form.push(("name", name));
        }

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await?;
        let customer = Self::check(&endpoint, response)
            .await?
            .json::<Customer>()
            .await?;

        tracing::info!(customer_id = %customer.id, tenant_id = new.tenant_id, "created billing customer");
        Ok(customer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;
    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> RestBillingClient {
        RestBillingClient::new(&BillingConfig {
            api_base: Url::parse(&server.uri()).unwrap(),
            secret_key: "sk_test_abc".to_string(),
        })
    }

    #[tokio::test]
    async fn test_search_by_tenant_builds_metadata_query() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/customers/search"))
            .and(query_param("query", "metadata['userId']:'tenant-1'"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"data":[{"id":"cus_1","email":"a@b.c","metadata":{"userId":"tenant-1"}}],"has_more":false}"#,
            ))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let customers = client.search_by_tenant("tenant-1").await.unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].id, "cus_1");
        assert_eq!(customers[0].tenant_id(), Some("tenant-1"));
    }

    #[tokio::test]
    async fn test_retrieve_missing_customer_is_none() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/customers/cus_gone"))
            .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"error":"no such customer"}"#))
            .mount(&server)
            .await;

        let client = test_client(&server);
        assert!(client.retrieve("cus_gone").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_retrieve_deleted_customer_keeps_flag() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/customers/cus_del"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"id":"cus_del","deleted":true}"#),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        let customer = client.retrieve("cus_del").await.unwrap().unwrap();
        assert!(customer.deleted);
    }

    #[tokio::test]
    async fn test_create_posts_form_with_metadata() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/customers"))
            .and(body_string_contains("email=joe%40grill.example"))
            .and(body_string_contains("metadata%5BuserId%5D=tenant-9"))
            .and(body_string_contains("name=Joe"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"id":"cus_new","email":"joe@grill.example","name":"Joe","metadata":{"userId":"tenant-9"}}"#,
            ))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let customer = client
            .create(NewCustomer {
                tenant_id: "tenant-9",
                email: "joe@grill.example",
                name: Some("Joe"),
            })
            .await
            .unwrap();
        assert_eq!(customer.id, "cus_new");
    }

    #[tokio::test]
    async fn test_api_error_carries_status_and_detail() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/customers/search"))
            .respond_with(ResponseTemplate::new(500).set_body_string("provider exploded"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.search_by_tenant("t").await.unwrap_err();
        match err {
            BillingError::Api { status, detail, .. } => {
                assert_eq!(status, 500);
                assert_eq!(detail, "provider exploded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_subscriptions_follows_cursor() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/subscriptions"))
            .and(query_param("starting_after", "sub_1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"data":[{"id":"sub_2","customer":"cus_2","status":"canceled"}],"has_more":false}"#,
            ))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/subscriptions"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"data":[{"id":"sub_1","customer":"cus_1","status":"active","metadata":{"userId":"t1"}}],"has_more":true}"#,
            ))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let subs = client.list_subscriptions().await.unwrap();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].id, "sub_1");
        assert_eq!(subs[0].tenant_id(), Some("t1"));
        assert_eq!(subs[1].id, "sub_2");
    }
}
