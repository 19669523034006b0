use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::NormalizedError;

/// Parsed JSON body of a successful gateway call. `qrcode` and `transaction`
/// stay opaque; whatever else the gateway sends rides along in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qrcode: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction: Option<Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Outcome of one gateway operation: either the parsed success body or the
/// normalized error. Accessors tolerate the error side without panicking.
#[derive(Debug, Clone)]
pub struct Payment(Result<GatewayResponse, NormalizedError>);

impl Payment {
    pub(crate) fn ok(response: GatewayResponse) -> Self {
        Payment(Ok(response))
    }

    pub(crate) fn err(error: NormalizedError) -> Self {
        Payment(Err(error))
    }

    pub fn is_ok(&self) -> bool {
        matches!(&self.0, Ok(response) if response.success)
    }

    /// Message from either side of the outcome.
    pub fn message(&self) -> Option<&str> {
        match &self.0 {
            Ok(response) => response.message.as_deref(),
            Err(error) => Some(error.message.as_str()),
        }
    }

    pub fn qrcode(&self) -> Option<&Value> {
        self.response().and_then(|response| response.qrcode.as_ref())
    }

    pub fn transaction(&self) -> Option<&Value> {
        self.response()
            .and_then(|response| response.transaction.as_ref())
    }

    pub fn response(&self) -> Option<&GatewayResponse> {
        self.0.as_ref().ok()
    }

    pub fn error(&self) -> Option<&NormalizedError> {
        self.0.as_ref().err()
    }

    pub fn into_result(self) -> Result<GatewayResponse, NormalizedError> {
        self.0
    }
}

/// Caller-side correlation data for one qrcode-generation attempt. Returned
/// back alongside the gateway response so several payments can be in flight
/// at once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingPayment {
    pub payment_ref: Option<String>,
    pub confirmation_key: Option<String>,
}

impl PendingPayment {
    pub fn new(payment_ref: impl Into<String>) -> Self {
        Self {
            payment_ref: Some(payment_ref.into()),
            confirmation_key: None,
        }
    }

    pub fn with_confirmation_key(mut self, confirmation_key: impl Into<String>) -> Self {
        self.confirmation_key = Some(confirmation_key.into());
        self
    }
}

/// Qrcode-generation outcome plus the correlation data it was issued for.
#[derive(Debug, Clone)]
pub struct QrcodePayment {
    pub payment: Payment,
    pub pending: PendingPayment,
}

/// Values echoed back by the gateway on the inbound callback request.
/// Extractable with `axum::extract::Query` on the callback route.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub state: Option<String>,
    pub code: Option<String>,
}

/// Instruction to send the payer's user agent to the gateway checkout page.
/// The library never follows this URL itself.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayRedirect {
    pub url: Url,
}
