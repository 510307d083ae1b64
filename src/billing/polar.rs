//! Polar customer-state API client.

use crate::billing::{CustomerState, SubscriptionChecker};
use crate::config::BillingConfig;
use crate::error::BillingError;
use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;

pub const BILLING_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct PolarClient {
    http: reqwest::Client,
    base_url: Url,
}

impl PolarClient {
    pub fn new(config: &BillingConfig) -> Result<Self, BillingError> {
        let base_url = Url::parse(&config.api_url)
            .map_err(|e| BillingError::Init(format!("invalid POLAR_API_URL {}: {}", config.api_url, e)))?;
        let http = reqwest::Client::builder()
            .timeout(BILLING_TIMEOUT)
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                let mut auth = reqwest::header::HeaderValue::from_str(&format!("Bearer {}", config.access_token))
                    .map_err(|_| BillingError::Init("POLAR_ACCESS_TOKEN is not a valid header value".into()))?;
                auth.set_sensitive(true);
                headers.insert(reqwest::header::AUTHORIZATION, auth);
                headers
            })
            .build()
            .map_err(|e| BillingError::Init(e.to_string()))?;
        Ok(PolarClient { http, base_url })
    }

    fn state_url(&self, external_id: &str) -> Result<Url, BillingError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BillingError::Init(format!("base url cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["v1", "customers", "external", external_id, "state"]);
        Ok(url)
    }
}

#[async_trait]
impl SubscriptionChecker for PolarClient {
    /// Calls `GET {base}/v1/customers/external/{external_id}/state`.
    async fn customer_state(&self, external_id: &str) -> Result<Option<CustomerState>, BillingError> {
        let endpoint = "GET /v1/customers/external/{id}/state".to_string();
        let url = self.state_url(external_id)?;

        let resp = self.http.get(url).send().await.map_err(|e| BillingError::Http {
            endpoint: endpoint.clone(),
            source: e,
        })?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(BillingError::Api {
                endpoint,
                status,
                body,
            });
        }

        resp.json()
            .await
            .map(Some)
            .map_err(|e| BillingError::Deserialization {
                endpoint,
                source: e,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> PolarClient {
        PolarClient::new(&BillingConfig {
            access_token: "polar_test_token".into(),
            api_url: server.uri(),
            subscription_required: true,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn returns_active_subscriptions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/customers/external/user_123/state"))
            .and(header("authorization", "Bearer polar_test_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "cus_1",
                "external_id": "user_123",
                "email": "a@example.com",
                "active_subscriptions": [
                    { "id": "sub_1", "status": "active", "product_id": "prod_pro", "amount": 2000 }
                ],
                "granted_benefits": []
            })))
            .mount(&server)
            .await;

        let state = client(&server).customer_state("user_123").await.unwrap().unwrap();
        assert_eq!(state.external_id.as_deref(), Some("user_123"));
        assert!(state.has_active_subscription());
        assert_eq!(state.active_subscriptions[0].product_id.as_deref(), Some("prod_pro"));
    }

    #[tokio::test]
    async fn unknown_customer_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"detail":"Not found"}"#))
            .mount(&server)
            .await;

        assert!(client(&server).customer_state("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn provider_error_surfaces_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
            .mount(&server)
            .await;

        let err = client(&server).customer_state("user_123").await.unwrap_err();
        match err {
            BillingError::Api { status, body, .. } => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid token");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn external_id_is_path_escaped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/customers/external/a%2Fb/state"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "active_subscriptions": []
            })))
            .mount(&server)
            .await;

        let state = client(&server).customer_state("a/b").await.unwrap().unwrap();
        assert!(!state.has_active_subscription());
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let err = PolarClient::new(&BillingConfig {
            access_token: "t".into(),
            api_url: "not a url".into(),
            subscription_required: true,
        })
        .unwrap_err();
        assert!(matches!(err, BillingError::Init(_)));
    }
}
