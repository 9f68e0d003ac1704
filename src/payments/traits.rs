//! Payment gateway trait definitions

use async_trait::async_trait;

use crate::error::IuguResult;
use crate::payments::charge::ChargeOptions;
use crate::payments::invoice::InvoiceOptions;
use crate::payments::state::PaymentState;
use crate::payments::types::{CardData, GatewayResponse};

/// Operations offered by the gateway.
///
/// Every method issues at most one HTTP call. Caller-input problems are reported
/// as [`IuguError::Validation`](crate::error::IuguError::Validation) before anything
/// is sent.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Exchange raw card data for a one-time token
    ///
    /// # Arguments
    /// * `state` - Must be set to credit card; receives the issued token
    /// * `card` - Card number, CVV, holder name and expiry
    ///
    /// # Returns
    /// * `GatewayResponse` - The full gateway reply, including the token `id`
    async fn tokenize_card(
        &self,
        state: &mut PaymentState,
        card: CardData,
    ) -> IuguResult<GatewayResponse>;

    /// Charge a card token or issue a bank slip immediately
    async fn direct_charge(
        &self,
        state: &PaymentState,
        options: &ChargeOptions,
    ) -> IuguResult<GatewayResponse>;

    /// Create an invoice payable with the state's payment method
    async fn create_invoice(
        &self,
        state: &PaymentState,
        options: &InvoiceOptions,
    ) -> IuguResult<GatewayResponse>;

    /// List the webhooks (triggers) registered for the account
    async fn list_triggers(&self) -> IuguResult<GatewayResponse>;

    /// List the API tokens of the account
    async fn list_api_tokens(&self) -> IuguResult<GatewayResponse>;
}
