//! RxNav REST client.

use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Deserialize;
use tracing::debug;

use crate::error::{LookupError, Result};

/// RxNav endpoint resolving a drug name to RxCUIs.
pub const RXNAV_RXCUI_URL: &str = "https://rxnav.nlm.nih.gov/REST/rxcui.json";

/// HTTP request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolves a drug name to an external identifier.
pub trait IdentifierLookup {
    /// Returns `Ok(None)` when the service knows no identifier for `name`.
    fn lookup(&self, name: &str) -> Result<Option<String>>;

    /// Whether each call reaches a remote service and should be rate limited.
    fn is_remote(&self) -> bool {
        false
    }
}

#[derive(Debug, Default, Deserialize)]
struct RxcuiResponse {
    #[serde(rename = "idGroup", default)]
    id_group: IdGroup,
}

#[derive(Debug, Default, Deserialize)]
struct IdGroup {
    #[serde(rename = "rxnormId", default)]
    rxnorm_id: Vec<String>,
}

/// Blocking client for the NLM RxNav service.
pub struct RxNavClient {
    client: Client,
    base_url: String,
}

impl RxNavClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(RXNAV_RXCUI_URL)
    }

    /// Client against a different endpoint, such as a local mirror.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn request_url(&self, name: &str) -> Result<Url> {
        Url::parse_with_params(&self.base_url, &[("name", name)])
            .map_err(|e| LookupError::InvalidUrl(e.to_string()))
    }
}

impl IdentifierLookup for RxNavClient {
    fn lookup(&self, name: &str) -> Result<Option<String>> {
        let url = self.request_url(name)?;
        debug!(name, %url, "querying RxNav");

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, concat!("drugmatch/", env!("CARGO_PKG_VERSION")))
            .header(ACCEPT, "application/json")
            .send()?;
        if !response.status().is_success() {
            return Err(LookupError::Status {
                status: response.status().as_u16(),
                name: name.to_string(),
            });
        }

        let body: RxcuiResponse = response.json()?;
        Ok(body.id_group.rxnorm_id.into_iter().next())
    }

    fn is_remote(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_url_encodes_name() {
        let client = RxNavClient::new().unwrap();
        let url = client.request_url("folinic acid & calcium").unwrap();
        assert_eq!(
            url.as_str(),
            "https://rxnav.nlm.nih.gov/REST/rxcui.json?name=folinic+acid+%26+calcium"
        );
    }

    #[test]
    fn test_response_first_identifier() {
        let body: RxcuiResponse =
            serde_json::from_str(r#"{"idGroup":{"name":"aspirin","rxnormId":["1191","999"]}}"#)
                .unwrap();
        assert_eq!(body.id_group.rxnorm_id.first().map(String::as_str), Some("1191"));
    }

    #[test]
    fn test_response_without_identifier() {
        let body: RxcuiResponse = serde_json::from_str(r#"{"idGroup":{"name":"zzz"}}"#).unwrap();
        assert!(body.id_group.rxnorm_id.is_empty());
        let body: RxcuiResponse = serde_json::from_str("{}").unwrap();
        assert!(body.id_group.rxnorm_id.is_empty());
    }
}
