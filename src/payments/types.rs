//! Payment types and data structures
//!
//! Values accumulated by [`PaymentState`](crate::payments::state::PaymentState) and
//! embedded verbatim in the charge and invoice payloads.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Payment channel accepted by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    CreditCard,
    BankSlip,
    Pix,
    All,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::BankSlip => "bank_slip",
            PaymentMethod::Pix => "pix",
            PaymentMethod::All => "all",
        }
    }

    /// Methods that need a full payer identity on invoices
    pub fn requires_payer_on_invoice(&self) -> bool {
        matches!(
            self,
            PaymentMethod::BankSlip | PaymentMethod::Pix | PaymentMethod::All
        )
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit_card" => Ok(PaymentMethod::CreditCard),
            "bank_slip" => Ok(PaymentMethod::BankSlip),
            "pix" => Ok(PaymentMethod::Pix),
            "all" => Ok(PaymentMethod::All),
            other => Err(ValidationError::unsupported_method(other, "payment method selection")),
        }
    }
}

/// A purchased unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: u32,
    /// Unit price in cents
    pub price_cents: u64,
}

impl LineItem {
    pub fn new(
        description: impl Into<String>,
        quantity: u32,
        price_cents: u64,
    ) -> Result<Self, ValidationError> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(ValidationError::invalid_item("description must not be empty"));
        }
        if quantity == 0 {
            return Err(ValidationError::invalid_item("quantity must be greater than zero"));
        }
        if price_cents == 0 {
            return Err(ValidationError::invalid_item("price_cents must be greater than zero"));
        }

        Ok(Self {
            description,
            quantity,
            price_cents,
        })
    }
}

/// Billing address of a payer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub number: String,
    pub district: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    /// Sent as an empty string when not provided
    #[serde(default)]
    pub complement: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Natural or legal person responsible for the payment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payer {
    pub cpf_cnpj: String,
    pub name: String,
    pub phone_prefix: String,
    pub phone: String,
    pub email: String,
    pub address: Address,
}

impl Payer {
    /// A payer with neither name nor CPF/CNPJ identifies nobody
    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty() && self.cpf_cnpj.trim().is_empty()
    }
}

/// Arbitrary name/value tag attached to an invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomVariable {
    pub name: String,
    pub value: String,
}

impl CustomVariable {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        let value = value.into();
        if name.is_empty() || value.is_empty() {
            return Err(ValidationError::InvalidCustomVariable);
        }
        Ok(Self { name, value })
    }
}

/// Amount granted by an early payment discount. The gateway rejects rules
/// carrying both a percentage and a fixed value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountAmount {
    Percent(f64),
    ValueCents(u64),
}

/// Discount applied when the invoice is paid `days` before its due date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarlyPaymentDiscount {
    pub days: u32,
    #[serde(flatten)]
    pub amount: DiscountAmount,
}

impl EarlyPaymentDiscount {
    pub fn new(days: u32, amount: DiscountAmount) -> Result<Self, ValidationError> {
        if days == 0 {
            return Err(ValidationError::invalid_discount("days must be greater than zero"));
        }
        match amount {
            DiscountAmount::Percent(p) if !(p > 0.0 && p <= 100.0) => {
                return Err(ValidationError::invalid_discount(format!(
                    "percent must be in (0, 100], got {}",
                    p
                )));
            }
            DiscountAmount::ValueCents(0) => {
                return Err(ValidationError::invalid_discount(
                    "value_cents must be greater than zero",
                ));
            }
            _ => {}
        }
        Ok(Self { days, amount })
    }
}

/// One-time token issued by the gateway for a tokenized card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardToken(String);

impl CardToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw card data submitted for tokenization
#[derive(Clone, Serialize)]
pub struct CardData {
    pub number: String,
    pub verification_value: String,
    pub first_name: String,
    pub last_name: String,
    pub month: u8,
    pub year: u16,
}

impl CardData {
    /// Last four digits of the card number, safe to log
    pub fn last4(&self) -> &str {
        self.number
            .get(self.number.len().saturating_sub(4)..)
            .unwrap_or_default()
    }
}

impl fmt::Debug for CardData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardData")
            .field("number", &format_args!("****{}", self.last4()))
            .field("verification_value", &"***")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("month", &self.month)
            .field("year", &self.year)
            .finish()
    }
}

/// Parsed gateway reply
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayResponse {
    /// HTTP status code
    pub status: u16,
    /// Decoded JSON body
    pub body: serde_json::Value,
}

impl GatewayResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The `errors` member the gateway attaches to rejected requests
    pub fn errors(&self) -> Option<&serde_json::Value> {
        self.body.get("errors").filter(|e| !e.is_null())
    }

    pub fn deserialize<T>(&self) -> Result<T, serde_json::Error>
    where
        T: for<'de> Deserialize<'de>,
    {
        T::deserialize(&self.body)
    }
}
