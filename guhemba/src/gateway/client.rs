use http::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use log::{debug, info, warn};
use reqwest::Client;
use std::time::Duration;
use url::Url;

use crate::error::GatewayError;
use crate::gateway::config::Merchant;
use crate::gateway::model::{
    CallbackParams, GatewayRedirect, GatewayResponse, Payment, PendingPayment, QrcodePayment,
};
use crate::gateway::session::{STATE_KEY, SessionStore, check_session_state, new_state_token};

/// Endpoint for generating a qrcode.
const QRCODE_PATH: &str = "api/third-party/generate-qrcode/payment";

/// Endpoint to request transaction info from a token.
const TRANSACTION_PATH: &str = "api/third-party/transaction/exist";

/// Endpoint to request transaction info from a reference code.
const TRANS_CODE_PATH: &str = "api/third-party/transaction-from-code";

/// Checkout page the payer's browser is sent to; not under `api/`.
const PAY_REDIRECT_PATH: &str = "rwpay-element/process-qrcode";

const API_KEY: HeaderName = HeaderName::from_static("api-key");
const MERCHANT_KEY: HeaderName = HeaderName::from_static("merchant-key");
const PUBLIC_KEY: HeaderName = HeaderName::from_static("public-key");
const PARTNER_KEY: HeaderName = HeaderName::from_static("partner-key");

/// A client for one merchant's integration with the Guhemba gateway.
///
/// Handles qrcode generation and the two transaction lookups via
/// form-encoded HTTP POST, plus construction of the browser redirect that
/// opens the checkout page.
#[derive(Clone, Debug)]
pub struct GatewayClient {
    /// Full URL to `POST` qrcode-generation requests
    qrcode_url: Url,
    /// Full URL to `POST` transaction-by-token lookups
    transaction_url: Url,
    /// Full URL to `POST` transaction-by-code lookups
    trans_code_url: Url,
    /// Checkout page URL the payer is redirected to
    pay_url: Url,
    /// Shared Reqwest HTTP client
    client: Client,
    /// Credentials and integration mode for every request
    merchant: Merchant,
    /// Optional request timeout
    timeout: Option<Duration>,
}

impl GatewayClient {
    /// Constructs a new [`GatewayClient`] for the given merchant.
    ///
    /// Endpoint URLs are resolved against the merchant's base URL up front.
    pub fn try_new(merchant: Merchant) -> Result<Self, GatewayError> {
        let client = Client::new();
        let base_url = with_trailing_slash(&merchant.credentials().base_url);
        let qrcode_url = base_url
            .join(QRCODE_PATH)
            .map_err(|e| GatewayError::UrlParse {
                context: "Failed to construct generate-qrcode URL",
                source: e,
            })?;
        let transaction_url =
            base_url
                .join(TRANSACTION_PATH)
                .map_err(|e| GatewayError::UrlParse {
                    context: "Failed to construct transaction/exist URL",
                    source: e,
                })?;
        let trans_code_url =
            base_url
                .join(TRANS_CODE_PATH)
                .map_err(|e| GatewayError::UrlParse {
                    context: "Failed to construct transaction-from-code URL",
                    source: e,
                })?;
        let pay_url = base_url
            .join(PAY_REDIRECT_PATH)
            .map_err(|e| GatewayError::UrlParse {
                context: "Failed to construct process-qrcode URL",
                source: e,
            })?;
        Ok(Self {
            qrcode_url,
            transaction_url,
            trans_code_url,
            pay_url,
            client,
            merchant,
            timeout: None,
        })
    }

    /// Sets a timeout for all future requests.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let mut this = self.clone();
        this.timeout = Some(timeout);
        this
    }

    pub fn merchant(&self) -> &Merchant {
        &self.merchant
    }

    /// Requests a payment qrcode for `amount`.
    ///
    /// The caller's correlation data is handed back in the returned
    /// [`QrcodePayment`] so several payments can be outstanding at once.
    pub async fn generate_qrcode(&self, amount: u64, pending: PendingPayment) -> QrcodePayment {
        info!(
            "Requesting payment qrcode: amount={} payment_ref={:?}",
            amount, pending.payment_ref
        );
        let payment = self
            .dispatch(
                &self.qrcode_url,
                "POST generate-qrcode/payment",
                &amount.to_string(),
            )
            .await;
        QrcodePayment { payment, pending }
    }

    /// Fetches the public information about a transaction from its token.
    ///
    /// `token` must be non-empty; there is no other precondition.
    pub async fn transaction_from_token(&self, token: &str) -> Payment {
        info!("Fetching transaction from token");
        self.dispatch(&self.transaction_url, "POST transaction/exist", token)
            .await
    }

    /// Fetches the transaction referenced by the callback's `code`, used
    /// when a direct payment completes and the payer lands back on the
    /// merchant site.
    ///
    /// The stored state is pulled from the session first (and cleared
    /// regardless of outcome); a handshake rejection short-circuits with an
    /// error [`Payment`] and no network call.
    pub async fn transaction(
        &self,
        callback: &CallbackParams,
        session: &dyn SessionStore,
    ) -> Payment {
        let stored = session.pull(STATE_KEY);
        if let Err(e) = check_session_state(stored, callback.state.as_deref()) {
            warn!("Callback state rejected: {e}");
            return Payment::err(e.normalized());
        }

        let code = callback.code.clone().unwrap_or_default();
        self.dispatch(&self.trans_code_url, "POST transaction-from-code", &code)
            .await
    }

    /// Builds the browser redirect that opens the checkout page for a
    /// qrcode, storing a fresh one-time state token in the session for the
    /// callback handshake. No HTTP call is made here.
    pub fn redirect(
        &self,
        qrcode_slug: &str,
        payment_ref: &str,
        session: &dyn SessionStore,
    ) -> Result<GatewayRedirect, GatewayError> {
        let state = new_state_token();
        session.put(STATE_KEY, state.clone());
        self.build_redirect(qrcode_slug, payment_ref, &state)
    }

    pub(crate) fn build_redirect(
        &self,
        qrcode_slug: &str,
        payment_ref: &str,
        state: &str,
    ) -> Result<GatewayRedirect, GatewayError> {
        let credentials = self.merchant.credentials();
        let mut url = Url::parse(&format!("{}/{}", self.pay_url, qrcode_slug)).map_err(|e| {
            GatewayError::UrlParse {
                context: "Failed to construct process-qrcode URL",
                source: e,
            }
        })?;
        url.query_pairs_mut()
            .append_pair("public_key", &credentials.public_key)
            .append_pair(self.merchant.redirect_field(), &credentials.redirect_url)
            .append_pair("payment_ref", payment_ref)
            .append_pair("state", state);
        if let Some(ppk) = credentials.public_partner_key.as_deref() {
            url.query_pairs_mut().append_pair("ppk", ppk);
        }
        Ok(GatewayRedirect { url })
    }

    /// Runs one endpoint call and folds any failure into the returned
    /// [`Payment`].
    async fn dispatch(&self, url: &Url, context: &'static str, value: &str) -> Payment {
        match self.post_form(url, context, value).await {
            Ok(response) => {
                debug!("{context} succeeded: success={}", response.success);
                Payment::ok(response)
            }
            Err(e) => {
                warn!("{context} failed: {e}");
                Payment::err(e.normalized())
            }
        }
    }

    /// Sends one form-encoded POST and decodes the JSON response.
    ///
    /// The gateway contract expects the same value mirrored into `token`,
    /// `amount` and `code`; it reads whichever field the endpoint cares
    /// about and ignores the rest. Preserved verbatim for wire
    /// compatibility.
    async fn post_form(
        &self,
        url: &Url,
        context: &'static str,
        value: &str,
    ) -> Result<GatewayResponse, GatewayError> {
        let mut req = self
            .client
            .post(url.clone())
            .headers(self.request_headers()?)
            .form(&[("token", value), ("amount", value), ("code", value)]);
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        let http_response = req
            .send()
            .await
            .map_err(|e| GatewayError::Transport { context, source: e })?;

        let status = http_response.status();
        if status.is_success() {
            http_response
                .json::<GatewayResponse>()
                .await
                .map_err(|e| GatewayError::Json { context, source: e })
        } else {
            let hint = match http_response.error_for_status_ref() {
                Err(e) => e.to_string(),
                Ok(_) => format!("{context} returned HTTP {status}"),
            };
            let body = http_response
                .text()
                .await
                .map_err(|e| GatewayError::BodyRead { context, source: e })?;
            let message = remote_error_message(&body);
            Err(GatewayError::Remote {
                status,
                message,
                hint,
            })
        }
    }

    /// Header set sent with every request. Partner mode swaps the redirect
    /// header name and adds the partner key (empty when unset).
    fn request_headers(&self) -> Result<HeaderMap, GatewayError> {
        let credentials = self.merchant.credentials();
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(API_KEY, header_value("API-KEY", &credentials.api_key)?);
        headers.insert(
            MERCHANT_KEY,
            header_value("MERCHANT-KEY", &credentials.merchant_key)?,
        );
        headers.insert(
            HeaderName::from_static(self.merchant.redirect_header()),
            header_value("REDIRECT-URL", &credentials.redirect_url)?,
        );
        headers.insert(
            PUBLIC_KEY,
            header_value("PUBLIC-KEY", &credentials.public_key)?,
        );
        if self.merchant.is_partner() {
            headers.insert(
                PARTNER_KEY,
                header_value(
                    "PARTNER-KEY",
                    credentials.partner_key.as_deref().unwrap_or_default(),
                )?,
            );
        }
        Ok(headers)
    }
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, GatewayError> {
    HeaderValue::from_str(value).map_err(|source| GatewayError::Header { name, source })
}

/// Pulls the human-readable message out of a remote error body: `message`
/// first, then `error`, then the raw body.
fn remote_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .or_else(|| value.get("error"))
                .and_then(serde_json::Value::as_str)
                .map(str::to_owned)
        })
        .unwrap_or_else(|| body.to_string())
}

fn with_trailing_slash(url: &Url) -> Url {
    if url.path().ends_with('/') {
        url.clone()
    } else {
        let mut url = url.clone();
        url.set_path(&format!("{}/", url.path()));
        url
    }
}
