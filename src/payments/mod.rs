//! Payment request building
//!
//! `state` accumulates items, payer and discounts; `charge` and `invoice` validate that
//! state and assemble the request bodies; `providers` sends them to the gateway.

pub mod charge;
pub mod invoice;
pub mod providers;
pub mod state;
pub mod traits;
pub mod types;
