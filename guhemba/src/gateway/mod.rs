mod client;
mod config;
mod model;
mod session;

pub use client::GatewayClient;
pub use config::{Credentials, GuhembaConfig, Merchant};
pub use model::{
    CallbackParams, GatewayRedirect, GatewayResponse, Payment, PendingPayment, QrcodePayment,
};
pub use session::{MemorySession, STATE_KEY, STATE_LEN, SessionStore, check_session_state};
