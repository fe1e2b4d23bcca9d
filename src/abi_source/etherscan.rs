use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use super::AbiSource;
use crate::abi::{self, Interface};

pub const DEFAULT_API_URL: &str = "https://api.etherscan.io/api";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Etherscan responded with {0}")]
    Status(StatusCode),
    #[error("malformed Etherscan response: {0}")]
    Envelope(#[source] serde_json::Error),
    /// Etherscan reports failures ("Contract source code not verified",
    /// "Invalid API Key", ...) inside `result`, so they surface here.
    #[error("no usable ABI ({message}): {source}")]
    InvalidAbi {
        message: String,
        #[source]
        source: abi::Error,
    },
}

/// `{"status": "1", "message": "OK", "result": "<ABI JSON as a string>"}`
#[derive(Deserialize, Debug)]
struct Envelope {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: String,
    result: String,
}

/// ABI lookup through the Etherscan `contract/getabi` endpoint (or any
/// Etherscan-compatible explorer API).
pub struct Etherscan {
    client: Client,
    api_url: String,
    api_key: String,
}

impl Etherscan {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, Error> {
        let client = Client::builder()
            .user_agent(concat!("tokenkind/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
        })
    }
}

impl AbiSource for Etherscan {
    type Error = Error;

    async fn fetch_abi(&self, address: &str) -> Result<Interface, Error> {
        let resp = self
            .client
            .get(&self.api_url)
            .query(&[
                ("module", "contract"),
                ("action", "getabi"),
                ("address", address),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status(status));
        }

        let body = resp.text().await?;
        debug!(address, bytes = body.len(), "fetched ABI envelope");
        parse_envelope(&body)
    }
}

/// Decode the response body. `result` holds the ABI as a JSON encoded string.
fn parse_envelope(body: &str) -> Result<Interface, Error> {
    let envelope: Envelope = serde_json::from_str(body).map_err(Error::Envelope)?;
    debug!(status = %envelope.status, message = %envelope.message, "Etherscan envelope");

    Interface::from_json(&envelope.result).map_err(|source| Error::InvalidAbi {
        message: envelope.message,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::MemberKind;

    #[test]
    fn decodes_nested_abi_string() {
        let body = r#"{
            "status": "1",
            "message": "OK",
            "result": "[{\"inputs\":[{\"internalType\":\"uint256\",\"name\":\"id\",\"type\":\"uint256\"}],\"name\":\"uri\",\"outputs\":[{\"internalType\":\"string\",\"name\":\"\",\"type\":\"string\"}],\"stateMutability\":\"view\",\"type\":\"function\"}]"
        }"#;

        let abi = parse_envelope(body).unwrap();
        let uri = abi.find("uri", MemberKind::Function).unwrap();
        assert_eq!(uri.outputs.as_ref().unwrap()[0].ty.as_deref(), Some("string"));
    }

    #[test]
    fn unverified_contract() {
        let body = r#"{"status":"0","message":"NOTOK","result":"Contract source code not verified"}"#;

        match parse_envelope(body) {
            Err(Error::InvalidAbi { message, .. }) => assert_eq!(message, "NOTOK"),
            other => panic!("expected InvalidAbi, got {:?}", other),
        }
    }

    #[test]
    fn result_must_be_an_array() {
        let body = r#"{"status":"1","message":"OK","result":"{\"name\":\"uri\"}"}"#;
        assert!(matches!(
            parse_envelope(body),
            Err(Error::InvalidAbi {
                source: abi::Error::NotAnArray(_),
                ..
            })
        ));
    }

    #[test]
    fn malformed_envelopes() {
        assert!(matches!(parse_envelope("<html>502</html>"), Err(Error::Envelope(_))));
        assert!(matches!(
            parse_envelope(r#"{"status":"1","message":"OK"}"#),
            Err(Error::Envelope(_))
        ));
        assert!(matches!(
            parse_envelope(r#"{"status":"1","message":"OK","result":[]}"#),
            Err(Error::Envelope(_))
        ));
    }

    #[test]
    fn empty_abi_is_not_an_error() {
        let abi = parse_envelope(r#"{"status":"1","message":"OK","result":"[]"}"#).unwrap();
        assert!(abi.members().is_empty());
    }
}
