//! Client for the Iugu payment gateway.
//!
//! Configure a [`PaymentState`] with a payment method, items, payer and optional
//! custom variables or early payment discounts, then hand it to an [`IuguProvider`]:
//!
//! ```rust,no_run
//! # use iugu_gateway::{IuguConfig, IuguProvider, PaymentGateway, PaymentMethod, PaymentState};
//! # use iugu_gateway::payments::invoice::InvoiceOptions;
//! # async fn run() -> iugu_gateway::IuguResult<()> {
//! let provider = IuguProvider::new(&IuguConfig::new("account", "test_token", "prod_token"))?;
//!
//! let mut state = PaymentState::new(PaymentMethod::CreditCard);
//! state.add_item("Monthly plan", 1, 4990)?;
//!
//! let invoice = provider
//!     .create_invoice(&state, &InvoiceOptions::new("buyer@example.com", "2030-01-31"))
//!     .await?;
//! println!("{}", invoice.body);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod credentials;
pub mod error;
pub mod payments;
pub mod transport;

pub use config::IuguConfig;
pub use credentials::Credentials;
pub use error::{IuguError, IuguResult, ValidationError};
pub use payments::providers::IuguProvider;
pub use payments::state::PaymentState;
pub use payments::traits::PaymentGateway;
pub use payments::types::{
    Address, CardData, CardToken, CustomVariable, DiscountAmount, EarlyPaymentDiscount,
    GatewayResponse, LineItem, Payer, PaymentMethod,
};
