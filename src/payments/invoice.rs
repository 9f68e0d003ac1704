//! Invoice assembly
//!
//! Turns a [`PaymentState`] and [`InvoiceOptions`] into the body of an `invoices` call.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::payments::state::PaymentState;
use crate::payments::types::{CustomVariable, EarlyPaymentDiscount, LineItem, Payer, PaymentMethod};

pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceOptions {
    pub email: String,
    /// `YYYY-MM-DD`
    pub due_date: String,
    /// Move a due date that falls on a weekend to the next workday
    pub ensure_workday_due_date: bool,
    pub return_url: Option<String>,
    pub expired_url: Option<String>,
    pub notification_url: Option<String>,
    pub ignore_canceled_email: bool,
    /// Enables the late fee fields below; when false none of them is sent
    pub fines: bool,
    pub late_payment_fine: u32,
    pub per_day_interest: bool,
    pub per_day_interest_value: u32,
    pub discount_cents: u64,
    pub customer_id: Option<String>,
    pub ignore_due_email: bool,
    pub subscription_id: Option<String>,
    /// Credits added to `subscription_id` once paid
    pub credits: u64,
    pub early_payment_discount: bool,
    pub order_id: Option<i64>,
}

impl Default for InvoiceOptions {
    fn default() -> Self {
        Self {
            email: String::new(),
            due_date: String::new(),
            ensure_workday_due_date: true,
            return_url: None,
            expired_url: None,
            notification_url: None,
            ignore_canceled_email: false,
            fines: false,
            late_payment_fine: 0,
            per_day_interest: false,
            per_day_interest_value: 0,
            discount_cents: 0,
            customer_id: None,
            ignore_due_email: false,
            subscription_id: None,
            credits: 0,
            early_payment_discount: false,
            order_id: None,
        }
    }
}

impl InvoiceOptions {
    pub fn new(email: impl Into<String>, due_date: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            due_date: due_date.into(),
            ..Default::default()
        }
    }

    /// Reads options from a loosely typed JSON object, such as a forwarded form.
    ///
    /// Boolean options are checked strictly: `"true"` or `1` is rejected with
    /// [`ValidationError::InvalidOptionType`] naming the option. Counters accept a
    /// non-negative integer or its decimal string; `order_id` may be any integer
    /// or integer string, its sign being checked when the invoice is built.
    /// Missing keys and nulls take their defaults.
    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        let empty = Map::new();
        let object = value.as_object().unwrap_or(&empty);
        let defaults = Self::default();

        Ok(Self {
            email: string_option(object, "email").unwrap_or_default(),
            due_date: string_option(object, "due_date").unwrap_or_default(),
            ensure_workday_due_date: bool_option(
                object,
                "ensure_workday_due_date",
                defaults.ensure_workday_due_date,
            )?,
            return_url: string_option(object, "return_url"),
            expired_url: string_option(object, "expired_url"),
            notification_url: string_option(object, "notification_url"),
            ignore_canceled_email: bool_option(
                object,
                "ignore_canceled_email",
                defaults.ignore_canceled_email,
            )?,
            fines: bool_option(object, "fines", defaults.fines)?,
            late_payment_fine: u32_option(object, "late_payment_fine")?,
            per_day_interest: bool_option(object, "per_day_interest", defaults.per_day_interest)?,
            per_day_interest_value: u32_option(object, "per_day_interest_value")?,
            discount_cents: uint_option(object, "discount_cents")?,
            customer_id: string_option(object, "customer_id"),
            ignore_due_email: bool_option(object, "ignore_due_email", defaults.ignore_due_email)?,
            subscription_id: string_option(object, "subscription_id"),
            credits: uint_option(object, "credits")?,
            early_payment_discount: bool_option(
                object,
                "early_payment_discount",
                defaults.early_payment_discount,
            )?,
            order_id: order_id_option(object)?,
        })
    }
}

fn bool_option(object: &Map<String, Value>, key: &str, default: bool) -> Result<bool, ValidationError> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(ValidationError::invalid_option_type(key)),
    }
}

fn string_option(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn uint_option(object: &Map<String, Value>, key: &str) -> Result<u64, ValidationError> {
    let parsed = match object.get(key) {
        None | Some(Value::Null) => return Ok(0),
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        Some(_) => None,
    };
    parsed.ok_or_else(|| ValidationError::invalid_option_type(key))
}

fn u32_option(object: &Map<String, Value>, key: &str) -> Result<u32, ValidationError> {
    u32::try_from(uint_option(object, key)?).map_err(|_| ValidationError::invalid_option_type(key))
}

fn order_id_option(object: &Map<String, Value>) -> Result<Option<i64>, ValidationError> {
    let parsed = match object.get("order_id") {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(_) => None,
    };
    parsed
        .map(Some)
        .ok_or_else(|| ValidationError::invalid_option_type("order_id"))
}

/// Body of an `invoices` call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceRequest {
    pub payable_with: PaymentMethod,
    pub email: String,
    pub due_date: String,
    pub ensure_workday_due_date: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expired_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_url: Option<String>,
    pub ignore_canceled_email: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fines: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub late_payment_fine: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_day_interest: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_day_interest_value: Option<u32>,
    pub discount_cents: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    pub ignore_due_email: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credits: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_variables: Option<Vec<CustomVariable>>,
    pub early_payment_discount: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub early_payment_discounts: Option<Vec<EarlyPaymentDiscount>>,
    pub items: Vec<LineItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer: Option<Payer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<i64>,
}

pub fn build_invoice(
    state: &PaymentState,
    options: &InvoiceOptions,
) -> Result<InvoiceRequest, ValidationError> {
    // Every method is payable on an invoice.
    let method = state.method();

    if !options.email.contains('@') {
        return Err(ValidationError::InvalidEmail {
            email: options.email.clone(),
        });
    }

    if NaiveDate::parse_from_str(&options.due_date, DUE_DATE_FORMAT).is_err() {
        return Err(ValidationError::InvalidDate {
            value: options.due_date.clone(),
        });
    }

    let non_empty = |url: &Option<String>| url.clone().filter(|u| !u.is_empty());

    let (fines, late_payment_fine, per_day_interest, per_day_interest_value) = if options.fines {
        (
            Some(true),
            Some(options.late_payment_fine),
            Some(options.per_day_interest),
            Some(options.per_day_interest_value),
        )
    } else {
        (None, None, None, None)
    };

    let credits = options.subscription_id.as_ref().map(|_| options.credits);

    let custom_variables =
        (!state.custom_variables().is_empty()).then(|| state.custom_variables().to_vec());

    let early_payment_discounts = (options.early_payment_discount
        && !state.early_payment_discounts().is_empty())
    .then(|| state.early_payment_discounts().to_vec());

    if state.items().is_empty() {
        return Err(ValidationError::NoItems);
    }

    let payer = if method.requires_payer_on_invoice() {
        Some(
            state
                .payer()
                .filter(|payer| !payer.is_empty())
                .cloned()
                .ok_or(ValidationError::MissingPayer { method })?,
        )
    } else {
        None
    };

    if let Some(order_id) = options.order_id {
        if order_id <= 0 {
            return Err(ValidationError::InvalidOrderId { order_id });
        }
    }

    Ok(InvoiceRequest {
        payable_with: method,
        email: options.email.clone(),
        due_date: options.due_date.clone(),
        ensure_workday_due_date: options.ensure_workday_due_date,
        return_url: non_empty(&options.return_url),
        expired_url: non_empty(&options.expired_url),
        notification_url: non_empty(&options.notification_url),
        ignore_canceled_email: options.ignore_canceled_email,
        fines,
        late_payment_fine,
        per_day_interest,
        per_day_interest_value,
        discount_cents: options.discount_cents,
        customer_id: options.customer_id.clone(),
        ignore_due_email: options.ignore_due_email,
        subscription_id: options.subscription_id.clone(),
        credits,
        custom_variables,
        early_payment_discount: options.early_payment_discount,
        early_payment_discounts,
        items: state.items().to_vec(),
        payer,
        order_id: options.order_id,
    })
}
