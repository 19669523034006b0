//! Client library for the Guhemba QR-code payment gateway.
//!
//! [`gateway::GatewayClient`] generates payment qrcodes, looks transactions
//! up by token or by callback reference code, and builds the checkout
//! redirect with its one-time state token. Failures come back as a uniform
//! `{ success: false, message, details? }` payload inside
//! [`gateway::Payment`].

pub mod error;
pub mod gateway;
pub mod http;

pub use error::{GatewayError, NormalizedError};
pub use gateway::{GatewayClient, Merchant, Payment};
