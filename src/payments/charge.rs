//! Direct charge assembly
//!
//! Turns a [`PaymentState`] and [`ChargeOptions`] into the body of a `charge` call.
//! Rules are checked in a fixed order and the first violation aborts the build.

use serde::Serialize;

use crate::error::ValidationError;
use crate::payments::state::PaymentState;
use crate::payments::types::{LineItem, Payer, PaymentMethod};

pub const MAX_INSTALLMENTS: u32 = 12;

/// Who is charged: an existing invoice, or a customer identified by e-mail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargeTarget {
    Invoice {
        invoice_id: String,
        customer_id: Option<String>,
    },
    Email(String),
}

impl Default for ChargeTarget {
    fn default() -> Self {
        ChargeTarget::Email(String::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeOptions {
    /// Restricts the charge to bank slip; only sent for bank slip charges
    pub restrict_payment_method: bool,
    pub target: ChargeTarget,
    /// Installments; only values in 2..=12 are sent
    pub months: u32,
    pub discount_cents: u64,
    /// Days until the bank slip expires; ignored for card charges
    pub bank_slip_extra_days: Option<u32>,
    /// Keep the invoice open when the charge fails
    pub keep_dunning: bool,
    pub order_id: Option<i64>,
}

impl Default for ChargeOptions {
    fn default() -> Self {
        Self {
            restrict_payment_method: false,
            target: ChargeTarget::default(),
            months: 1,
            discount_cents: 0,
            bank_slip_extra_days: None,
            keep_dunning: false,
            order_id: None,
        }
    }
}

/// Body of a `charge` call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargeRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<PaymentMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restrict_payment_method: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub months: Option<u32>,
    pub discount_cents: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_slip_extra_days: Option<u32>,
    pub keep_dunning: bool,
    pub items: Vec<LineItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer: Option<Payer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<i64>,
}

pub fn build_charge(
    state: &PaymentState,
    options: &ChargeOptions,
) -> Result<ChargeRequest, ValidationError> {
    let method = state.method();
    if !matches!(method, PaymentMethod::CreditCard | PaymentMethod::BankSlip) {
        return Err(ValidationError::unsupported_method(method.as_str(), "direct charge"));
    }

    let is_bank_slip = method == PaymentMethod::BankSlip;

    let (token, method_field, restrict, months, bank_slip_extra_days) = if is_bank_slip {
        (
            None,
            Some(method),
            Some(options.restrict_payment_method),
            1,
            options.bank_slip_extra_days,
        )
    } else {
        let token = state.card_token().ok_or(ValidationError::MissingToken)?;
        (
            Some(token.as_str().to_string()),
            None,
            None,
            options.months,
            None,
        )
    };

    let (customer_id, invoice_id, email) = match &options.target {
        ChargeTarget::Invoice {
            invoice_id,
            customer_id,
        } => (customer_id.clone(), Some(invoice_id.clone()), None),
        ChargeTarget::Email(email) => (None, None, Some(email.clone())),
    };

    if months > MAX_INSTALLMENTS {
        return Err(ValidationError::InvalidInstallmentCount { months });
    }
    let months = (months >= 2).then_some(months);

    if state.items().is_empty() {
        return Err(ValidationError::NoItems);
    }

    let payer = if is_bank_slip {
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

    Ok(ChargeRequest {
        token,
        method: method_field,
        restrict_payment_method: restrict,
        customer_id,
        invoice_id,
        email,
        months,
        discount_cents: options.discount_cents,
        bank_slip_extra_days,
        keep_dunning: options.keep_dunning,
        items: state.items().to_vec(),
        payer,
        order_id: options.order_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payments::types::CardToken;
    use serde_json::json;

    fn card_state() -> PaymentState {
        let mut state = PaymentState::new(PaymentMethod::CreditCard);
        state.add_item("Plan", 1, 4990).unwrap();
        state.set_card_token(CardToken::new("tok_123"));
        state
    }

    fn bank_slip_state() -> PaymentState {
        let mut state = PaymentState::new(PaymentMethod::BankSlip);
        state.add_item("Plan", 1, 4990).unwrap();
        state.set_payer(Payer {
            name: "Ana Silva".to_string(),
            cpf_cnpj: "12345678909".to_string(),
            ..Default::default()
        });
        state
    }

    #[test]
    fn test_rejects_pix_and_all() {
        for method in [PaymentMethod::Pix, PaymentMethod::All] {
            let mut state = card_state();
            state.set_method(method);
            let err = build_charge(&state, &ChargeOptions::default()).unwrap_err();
            assert!(matches!(err, ValidationError::UnsupportedMethod { .. }));
        }
    }

    #[test]
    fn test_card_charge_requires_token() {
        let mut state = PaymentState::new(PaymentMethod::CreditCard);
        state.add_item("Plan", 1, 4990).unwrap();
        let err = build_charge(&state, &ChargeOptions::default()).unwrap_err();
        assert_eq!(err, ValidationError::MissingToken);
    }

    #[test]
    fn test_card_charge_drops_bank_slip_fields() {
        let options = ChargeOptions {
            restrict_payment_method: true,
            bank_slip_extra_days: Some(5),
            ..Default::default()
        };
        let request = build_charge(&card_state(), &options).unwrap();
        assert_eq!(request.token.as_deref(), Some("tok_123"));
        assert!(request.bank_slip_extra_days.is_none());
        assert!(request.method.is_none());
        assert!(request.restrict_payment_method.is_none());
        assert!(request.payer.is_none());
    }

    #[test]
    fn test_bank_slip_forces_single_payment() {
        let options = ChargeOptions {
            restrict_payment_method: true,
            months: 13,
            bank_slip_extra_days: Some(5),
            ..Default::default()
        };
        let request = build_charge(&bank_slip_state(), &options).unwrap();
        assert_eq!(request.method, Some(PaymentMethod::BankSlip));
        assert_eq!(request.restrict_payment_method, Some(true));
        assert_eq!(request.months, None);
        assert_eq!(request.bank_slip_extra_days, Some(5));
        assert!(request.token.is_none());
    }

    #[test]
    fn test_bank_slip_requires_payer() {
        let mut state = bank_slip_state();
        state.reset_payer();
        let err = build_charge(&state, &ChargeOptions::default()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingPayer {
                method: PaymentMethod::BankSlip
            }
        );
    }

    #[test]
    fn test_bank_slip_rejects_blank_payer() {
        let mut state = bank_slip_state();
        state.set_payer(Payer::default());
        assert_eq!(
            build_charge(&state, &ChargeOptions::default()).unwrap_err(),
            ValidationError::MissingPayer {
                method: PaymentMethod::BankSlip
            }
        );
    }

    #[test]
    fn test_installments() {
        let state = card_state();

        let options = ChargeOptions {
            months: 13,
            ..Default::default()
        };
        assert_eq!(
            build_charge(&state, &options).unwrap_err(),
            ValidationError::InvalidInstallmentCount { months: 13 }
        );

        let options = ChargeOptions {
            months: 6,
            ..Default::default()
        };
        let value = serde_json::to_value(build_charge(&state, &options).unwrap()).unwrap();
        assert_eq!(value["months"], json!(6));

        let value =
            serde_json::to_value(build_charge(&state, &ChargeOptions::default()).unwrap()).unwrap();
        assert!(value.get("months").is_none());
    }

    #[test]
    fn test_invoice_target_omits_email() {
        let options = ChargeOptions {
            target: ChargeTarget::Invoice {
                invoice_id: "INV1".to_string(),
                customer_id: Some("CUS1".to_string()),
            },
            ..Default::default()
        };
        let value = serde_json::to_value(build_charge(&card_state(), &options).unwrap()).unwrap();
        assert_eq!(value["invoice_id"], json!("INV1"));
        assert_eq!(value["customer_id"], json!("CUS1"));
        assert!(value.get("email").is_none());
    }

    #[test]
    fn test_email_is_emitted_even_when_empty() {
        let value =
            serde_json::to_value(build_charge(&card_state(), &ChargeOptions::default()).unwrap())
                .unwrap();
        assert_eq!(value["email"], json!(""));
        assert_eq!(value["discount_cents"], json!(0));
        assert_eq!(value["keep_dunning"], json!(false));
        assert!(value.get("invoice_id").is_none());
    }

    #[test]
    fn test_requires_items() {
        let mut state = card_state();
        state.reset_items();
        assert_eq!(
            build_charge(&state, &ChargeOptions::default()).unwrap_err(),
            ValidationError::NoItems
        );
    }

    #[test]
    fn test_items_preserve_insertion_order() {
        let mut state = card_state();
        state.add_item("Addon", 2, 1000).unwrap();
        let request = build_charge(&state, &ChargeOptions::default()).unwrap();
        assert_eq!(request.items, state.items());
        assert_eq!(request.items[1].description, "Addon");
    }

    #[test]
    fn test_order_id_must_be_positive() {
        let options = ChargeOptions {
            order_id: Some(0),
            ..Default::default()
        };
        assert_eq!(
            build_charge(&card_state(), &options).unwrap_err(),
            ValidationError::InvalidOrderId { order_id: 0 }
        );

        let options = ChargeOptions {
            order_id: Some(77),
            ..Default::default()
        };
        assert_eq!(build_charge(&card_state(), &options).unwrap().order_id, Some(77));
    }
}
