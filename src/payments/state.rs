//! Mutable payment builder
//!
//! A `PaymentState` holds everything a charge or invoice is assembled from. Use one
//! instance per logical transaction: the assemblers read it through a shared borrow,
//! and only card tokenization writes back into it.

use crate::error::ValidationError;
use crate::payments::types::{
    CardToken, CustomVariable, DiscountAmount, EarlyPaymentDiscount, LineItem, Payer,
    PaymentMethod,
};

#[derive(Debug, Clone, Default)]
pub struct PaymentState {
    method: PaymentMethod,
    items: Vec<LineItem>,
    payer: Option<Payer>,
    custom_variables: Vec<CustomVariable>,
    early_payment_discounts: Vec<EarlyPaymentDiscount>,
    card_token: Option<CardToken>,
}

impl PaymentState {
    pub fn new(method: PaymentMethod) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }

    pub fn method(&self) -> PaymentMethod {
        self.method
    }

    pub fn set_method(&mut self, method: PaymentMethod) -> &mut Self {
        self.method = method;
        self
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Appends an item; order is preserved in every payload.
    pub fn add_item(
        &mut self,
        description: impl Into<String>,
        quantity: u32,
        price_cents: u64,
    ) -> Result<&mut Self, ValidationError> {
        self.items
            .push(LineItem::new(description, quantity, price_cents)?);
        Ok(self)
    }

    pub fn reset_items(&mut self) -> &mut Self {
        self.items.clear();
        self
    }

    pub fn payer(&self) -> Option<&Payer> {
        self.payer.as_ref()
    }

    /// Replaces the current payer.
    pub fn set_payer(&mut self, payer: Payer) -> &mut Self {
        self.payer = Some(payer);
        self
    }

    pub fn reset_payer(&mut self) -> &mut Self {
        self.payer = None;
        self
    }

    pub fn custom_variables(&self) -> &[CustomVariable] {
        &self.custom_variables
    }

    pub fn add_custom_variable(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<&mut Self, ValidationError> {
        self.custom_variables.push(CustomVariable::new(name, value)?);
        Ok(self)
    }

    pub fn reset_custom_variables(&mut self) -> &mut Self {
        self.custom_variables.clear();
        self
    }

    pub fn early_payment_discounts(&self) -> &[EarlyPaymentDiscount] {
        &self.early_payment_discounts
    }

    pub fn add_early_payment_discount(
        &mut self,
        days: u32,
        amount: DiscountAmount,
    ) -> Result<&mut Self, ValidationError> {
        self.early_payment_discounts
            .push(EarlyPaymentDiscount::new(days, amount)?);
        Ok(self)
    }

    pub fn reset_early_payment_discounts(&mut self) -> &mut Self {
        self.early_payment_discounts.clear();
        self
    }

    pub fn card_token(&self) -> Option<&CardToken> {
        self.card_token.as_ref()
    }

    /// Overwrites the current card token, e.g. with one issued by a browser-side
    /// tokenization.
    pub fn set_card_token(&mut self, token: CardToken) -> &mut Self {
        self.card_token = Some(token);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_accumulate_in_order() {
        let mut state = PaymentState::default();
        state.add_item("First", 1, 100).unwrap();
        state.add_item("Second", 3, 250).unwrap();

        let descriptions: Vec<_> = state.items().iter().map(|i| i.description.as_str()).collect();
        assert_eq!(descriptions, vec!["First", "Second"]);
    }

    #[test]
    fn test_invalid_item_is_not_added() {
        let mut state = PaymentState::default();
        assert!(state.add_item("Broken", 0, 100).is_err());
        assert!(state.items().is_empty());
    }

    #[test]
    fn test_resets_only_touch_their_collection() {
        let mut state = PaymentState::new(PaymentMethod::Pix);
        state.add_item("Item", 1, 100).unwrap();
        state.add_custom_variable("ref", "abc").unwrap();
        state
            .add_early_payment_discount(2, DiscountAmount::ValueCents(50))
            .unwrap();
        state.set_payer(Payer::default());

        state.reset_items();
        assert!(state.items().is_empty());
        assert_eq!(state.custom_variables().len(), 1);
        assert_eq!(state.early_payment_discounts().len(), 1);
        assert!(state.payer().is_some());

        state.reset_custom_variables().reset_early_payment_discounts().reset_payer();
        assert!(state.custom_variables().is_empty());
        assert!(state.early_payment_discounts().is_empty());
        assert!(state.payer().is_none());
        assert_eq!(state.method(), PaymentMethod::Pix);
    }

    #[test]
    fn test_card_token_is_overwritten() {
        let mut state = PaymentState::default();
        assert!(state.card_token().is_none());

        state.set_card_token(CardToken::new("first"));
        state.set_card_token(CardToken::new("second"));
        assert_eq!(state.card_token().map(CardToken::as_str), Some("second"));
    }
}
