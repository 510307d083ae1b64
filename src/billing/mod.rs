//! Billing provider contract used by the subscription gate.

pub mod polar;

pub use polar::PolarClient;

use crate::error::BillingError;
use async_trait::async_trait;
use serde::Deserialize;

/// One active subscription as reported by the provider. Unknown fields are ignored.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ActiveSubscription {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
}

/// Customer state keyed by our user id (the provider's "external id").
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct CustomerState {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub active_subscriptions: Vec<ActiveSubscription>,
}

impl CustomerState {
    pub fn has_active_subscription(&self) -> bool {
        !self.active_subscriptions.is_empty()
    }
}

/// Look up a customer's subscription state. `Ok(None)` when the provider has no such customer.
#[async_trait]
pub trait SubscriptionChecker: Send + Sync {
    async fn customer_state(&self, external_id: &str) -> Result<Option<CustomerState>, BillingError>;
}
