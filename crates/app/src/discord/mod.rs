//! Client for the chat platform's REST API.
//!
//! Only two calls are needed: the paginated entitlement list used by the
//! reconciler and a cheap authenticated request used to time a round trip.

use std::time::Instant;

use reqwest::blocking::{Client, Response};
use reqwest::header::{AUTHORIZATION, USER_AGENT};
use upkeep_core::{ENTITLEMENT_PAGE_SIZE, Entitlement};

use crate::config::DiscordConfig;
use crate::error::{AppError, Result};
use crate::probes::{LatencyProbe, elapsed_millis};

const USER_AGENT_VALUE: &str = concat!("DiscordBot (bot-upkeep, ", env!("CARGO_PKG_VERSION"), ")");

/// Source of entitlement pages, starting after a given entitlement id.
pub trait EntitlementSource {
    fn fetch_page(&self, after: u64) -> Result<Vec<Entitlement>>;
}

pub struct DiscordApi {
    client: Client,
    api_base: String,
    application_id: String,
    token: Option<String>,
}

impl DiscordApi {
    pub fn new(config: &DiscordConfig) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            application_id: config.application_id.clone(),
            token: config.token.clone(),
        })
    }

    pub fn entitlements_url(&self, after: u64) -> String {
        format!(
            "{}/applications/{}/entitlements?exclude_ended=false&limit={}&after={}",
            self.api_base, self.application_id, ENTITLEMENT_PAGE_SIZE, after
        )
    }

    pub fn ping_url(&self) -> String {
        format!("{}/users/@me", self.api_base)
    }

    fn authorized_get(&self, url: &str) -> Result<Response> {
        let token = self.token.as_deref().ok_or_else(|| {
            AppError::Config(format!(
                "discord.token is not set (or export {})",
                crate::config::TOKEN_ENV
            ))
        })?;
        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("Bot {token}"))
            .header(USER_AGENT, USER_AGENT_VALUE)
            .send()?
            .error_for_status()?;
        Ok(response)
    }
}

impl EntitlementSource for DiscordApi {
    fn fetch_page(&self, after: u64) -> Result<Vec<Entitlement>> {
        let body = self.authorized_get(&self.entitlements_url(after))?.text()?;
        decode_entitlement_page(&body)
    }
}

pub fn decode_entitlement_page(body: &str) -> Result<Vec<Entitlement>> {
    serde_json::from_str(body)
        .map_err(|err| AppError::ExternalService(format!("malformed entitlement page: {err}")))
}

/// Times the platform API and, when configured, the bot's own backend API.
pub struct HttpLatencyProbe<'a> {
    api: &'a DiscordApi,
    internal_url: Option<&'a str>,
}

impl<'a> HttpLatencyProbe<'a> {
    pub fn new(api: &'a DiscordApi, internal_url: Option<&'a str>) -> Self {
        Self { api, internal_url }
    }
}

impl LatencyProbe for HttpLatencyProbe<'_> {
    fn platform_ping(&self) -> Result<u64> {
        let started = Instant::now();
        self.api.authorized_get(&self.api.ping_url())?;
        Ok(elapsed_millis(started))
    }

    fn internal_ping(&self) -> Result<Option<u64>> {
        let Some(url) = self.internal_url else {
            return Ok(None);
        };
        let started = Instant::now();
        self.api
            .client
            .get(url)
            .header(USER_AGENT, USER_AGENT_VALUE)
            .send()?
            .error_for_status()?;
        Ok(Some(elapsed_millis(started)))
    }
}
