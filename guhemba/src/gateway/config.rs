use envconfig::Envconfig;
use url::Url;

use crate::error::GatewayError;

/// Environment-sourced integration keys for a single merchant.
///
/// Published by the merchant dashboard; the partner keys are only issued to
/// multi-tenant integrators.
#[derive(Envconfig, Debug, Clone)]
pub struct GuhembaConfig {
    #[envconfig(from = "GUHEMBA_API_KEY")]
    pub api_key: String,

    #[envconfig(from = "GUHEMBA_MERCHANT_KEY")]
    pub merchant_key: String,

    #[envconfig(from = "GUHEMBA_REDIRECT_URL")]
    pub redirect_url: String,

    #[envconfig(from = "GUHEMBA_PUBLIC_KEY")]
    pub public_key: String,

    #[envconfig(from = "GUHEMBA_BASE_URL")]
    pub base_url: Url,

    #[envconfig(from = "GUHEMBA_PARTNER_KEY")]
    pub partner_key: Option<String>,

    #[envconfig(from = "GUHEMBA_PUBLIC_PARTNER_KEY")]
    pub public_partner_key: Option<String>,
}

/// Resolved credential set used to build every outgoing request.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: String,
    pub merchant_key: String,
    pub public_key: String,
    pub base_url: Url,
    pub redirect_url: String,
    pub partner_key: Option<String>,
    pub public_partner_key: Option<String>,
}

impl Credentials {
    /// Loads the static single-merchant credentials from `GUHEMBA_*`
    /// environment variables. Fails with
    /// [`GatewayError::ConfigurationMissing`] before any client is built or
    /// any network call is attempted.
    pub fn from_env() -> Result<Self, GatewayError> {
        let config = GuhembaConfig::init_from_env().map_err(GatewayError::ConfigurationMissing)?;
        Ok(config.into())
    }

    /// Looks a single value up by its `GUHEMBA_*` key name.
    /// Unknown or unset keys resolve to `None`.
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "GUHEMBA_API_KEY" => Some(self.api_key.as_str()),
            "GUHEMBA_MERCHANT_KEY" => Some(self.merchant_key.as_str()),
            "GUHEMBA_PUBLIC_KEY" => Some(self.public_key.as_str()),
            "GUHEMBA_BASE_URL" => Some(self.base_url.as_str()),
            "GUHEMBA_REDIRECT_URL" => Some(self.redirect_url.as_str()),
            "GUHEMBA_PARTNER_KEY" => self.partner_key.as_deref(),
            "GUHEMBA_PUBLIC_PARTNER_KEY" => self.public_partner_key.as_deref(),
            _ => None,
        }
    }
}

impl From<GuhembaConfig> for Credentials {
    fn from(config: GuhembaConfig) -> Self {
        Self {
            api_key: config.api_key,
            merchant_key: config.merchant_key,
            public_key: config.public_key,
            base_url: config.base_url,
            redirect_url: config.redirect_url,
            partner_key: config.partner_key,
            public_partner_key: config.public_partner_key,
        }
    }
}

/// The two integration modes, carried as an explicit value instead of
/// process-wide flags so concurrent tenants cannot contaminate each other.
#[derive(Debug, Clone)]
pub enum Merchant {
    /// Single merchant, credentials loaded once from static configuration.
    Static(Credentials),
    /// Partner/dynamic mode: credentials supplied per call chain by a
    /// multi-tenant integrator.
    Partner(Credentials),
}

impl Merchant {
    /// Static-mode merchant from `GUHEMBA_*` environment variables.
    pub fn from_env() -> Result<Self, GatewayError> {
        Ok(Merchant::Static(Credentials::from_env()?))
    }

    /// Enters partner/dynamic mode with caller-supplied credentials.
    pub fn dynamic(credentials: Credentials) -> Self {
        Merchant::Partner(credentials)
    }

    pub fn credentials(&self) -> &Credentials {
        match self {
            Merchant::Static(credentials) | Merchant::Partner(credentials) => credentials,
        }
    }

    pub fn is_partner(&self) -> bool {
        matches!(self, Merchant::Partner(_))
    }

    /// Name of the header carrying the merchant redirect URL on every
    /// request: `REDIRECT-URL` in static mode, `DYNAMIC-REDIRECT-URL` in
    /// partner mode.
    pub(crate) fn redirect_header(&self) -> &'static str {
        if self.is_partner() {
            "dynamic-redirect-url"
        } else {
            "redirect-url"
        }
    }

    /// Query field carrying the merchant redirect URL on the browser
    /// redirect.
    pub(crate) fn redirect_field(&self) -> &'static str {
        if self.is_partner() { "dru" } else { "redirect_url" }
    }
}
