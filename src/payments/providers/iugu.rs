//! Iugu payment gateway implementation
//!
//! Charge and invoice calls authenticate with an `api_token` query parameter, while
//! the listing calls send an HTTP Basic `Authorization` header. Both placements are
//! what the gateway is known to accept and are kept as-is.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};
use url::form_urlencoded;

use crate::config::IuguConfig;
use crate::credentials::Credentials;
use crate::error::{IuguError, IuguResult, ValidationError};
use crate::payments::charge::{build_charge, ChargeOptions};
use crate::payments::invoice::{build_invoice, InvoiceOptions};
use crate::payments::state::PaymentState;
use crate::payments::traits::PaymentGateway;
use crate::payments::types::{CardData, CardToken, GatewayResponse, PaymentMethod};
use crate::transport::{HttpMethod, HttpTransport};

pub const PAYMENT_TOKEN_PATH: &str = "payment_token";
pub const CHARGE_PATH: &str = "charge";
pub const INVOICES_PATH: &str = "invoices";
pub const WEB_HOOKS_PATH: &str = "web_hooks";

/// Body of a `payment_token` call
#[derive(Debug, Serialize)]
struct PaymentTokenRequest<'a> {
    account_id: &'a str,
    method: PaymentMethod,
    test: bool,
    data: &'a CardData,
}

pub struct IuguProvider {
    credentials: Credentials,
    transport: HttpTransport,
}

impl IuguProvider {
    /// Create a new Iugu provider instance from a validated configuration
    pub fn new(config: &IuguConfig) -> IuguResult<Self> {
        config.validate()?;
        let credentials = config.credentials()?;
        let transport = HttpTransport::new(config)?;

        info!(
            "Iugu provider initialized for account {} (test_mode={})",
            credentials.account_id(),
            credentials.test_mode()
        );

        Ok(Self {
            credentials,
            transport,
        })
    }

    /// Create provider from `IUGU_*` environment variables
    pub fn from_env() -> IuguResult<Self> {
        Self::new(&IuguConfig::from_env()?)
    }

    /// Credentials selected at construction
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// `path?api_token=<active token>`
    fn with_query_token(&self, path: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("api_token", self.credentials.active_token())
            .finish();
        format!("{}?{}", path, query)
    }

    fn basic_auth_header(&self) -> [(&'static str, String); 1] {
        [("Authorization", self.credentials.authorization_header())]
    }

    fn log_rejection(operation: &str, response: &GatewayResponse) {
        if !response.is_success() {
            warn!(
                "Iugu rejected {}: HTTP {} errors={}",
                operation,
                response.status,
                response.errors().cloned().unwrap_or(serde_json::Value::Null)
            );
        }
    }
}

#[async_trait]
impl PaymentGateway for IuguProvider {
    async fn tokenize_card(
        &self,
        state: &mut PaymentState,
        card: CardData,
    ) -> IuguResult<GatewayResponse> {
        if state.method() != PaymentMethod::CreditCard {
            return Err(ValidationError::MethodMismatch {
                expected: PaymentMethod::CreditCard,
                actual: state.method(),
            }
            .into());
        }

        info!("Requesting Iugu payment token: card=****{}", card.last4());

        let payload = serde_json::to_value(PaymentTokenRequest {
            account_id: self.credentials.account_id(),
            method: state.method(),
            test: self.credentials.test_mode(),
            data: &card,
        })?;

        let response = self
            .transport
            .execute(HttpMethod::Post, PAYMENT_TOKEN_PATH, &payload, &[])
            .await?;

        let token = response
            .body
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(CardToken::new);

        match token {
            Some(token) => {
                info!("Iugu payment token issued");
                state.set_card_token(token);
                Ok(response)
            }
            None => {
                Self::log_rejection("payment token", &response);
                error!("Iugu payment token response carried no id");
                Err(IuguError::unexpected_response(
                    response.status,
                    format!(
                        "payment token response carried no id: {}",
                        response.errors().cloned().unwrap_or(json!(null))
                    ),
                ))
            }
        }
    }

    async fn direct_charge(
        &self,
        state: &PaymentState,
        options: &ChargeOptions,
    ) -> IuguResult<GatewayResponse> {
        let request = build_charge(state, options)?;

        info!(
            "Creating Iugu direct charge: method={} items={} months={}",
            state.method(),
            request.items.len(),
            request.months.unwrap_or(1)
        );

        let payload = serde_json::to_value(&request)?;
        let response = self
            .transport
            .execute(
                HttpMethod::Post,
                &self.with_query_token(CHARGE_PATH),
                &payload,
                &[],
            )
            .await?;

        Self::log_rejection("direct charge", &response);
        Ok(response)
    }

    async fn create_invoice(
        &self,
        state: &PaymentState,
        options: &InvoiceOptions,
    ) -> IuguResult<GatewayResponse> {
        let request = build_invoice(state, options)?;

        info!(
            "Creating Iugu invoice: payable_with={} due_date={} items={}",
            request.payable_with,
            request.due_date,
            request.items.len()
        );

        let payload = serde_json::to_value(&request)?;
        let response = self
            .transport
            .execute(
                HttpMethod::Post,
                &self.with_query_token(INVOICES_PATH),
                &payload,
                &[],
            )
            .await?;

        Self::log_rejection("invoice creation", &response);
        Ok(response)
    }

    async fn list_triggers(&self) -> IuguResult<GatewayResponse> {
        self.transport
            .execute(
                HttpMethod::Get,
                WEB_HOOKS_PATH,
                &json!({}),
                &self.basic_auth_header(),
            )
            .await
    }

    async fn list_api_tokens(&self) -> IuguResult<GatewayResponse> {
        let path = format!("{}/api_tokens", self.credentials.account_id());
        self.transport
            .execute(HttpMethod::Get, &path, &json!({}), &self.basic_auth_header())
            .await
    }
}
