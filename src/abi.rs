use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("ABI is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("ABI must be a JSON array, got {0}")]
    NotAnArray(&'static str),
}

/// The `type` discriminator of a top level ABI entry.
#[derive(Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Function,
    Event,
    Error,
    Constructor,
    Fallback,
    Receive,
    #[serde(other)]
    Other,
}

/// A single function input/output or event parameter.
///
/// Every field is optional: a parameter with a missing field simply won't
/// match any expected shape.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Param {
    #[serde(rename = "type", default)]
    pub ty: Option<String>,
    /// Only present on event parameters.
    #[serde(default)]
    pub indexed: Option<bool>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Member {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<MemberKind>,
    #[serde(default)]
    pub inputs: Option<Vec<Param>>,
    #[serde(default)]
    pub outputs: Option<Vec<Param>>,
}

/// The interface (ABI) of one contract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interface {
    members: Vec<Member>,
}

impl Interface {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Build an interface from an already parsed ABI array.
    ///
    /// Entries that don't deserialize into a [Member] (e.g. `inputs` is not a
    /// list) are dropped, which makes them absent for every lookup.
    pub fn from_value(value: Value) -> Result<Self, Error> {
        let entries = match value {
            Value::Array(entries) => entries,
            other => return Err(Error::NotAnArray(json_kind(&other))),
        };

        let members = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value(entry) {
                Ok(member) => Some(member),
                Err(e) => {
                    debug!(index, error = %e, "skipping malformed ABI entry");
                    None
                }
            })
            .collect();

        Ok(Self { members })
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// First member with the given name and kind. Duplicates after it are
    /// never looked at.
    pub fn find(&self, name: &str, kind: MemberKind) -> Option<&Member> {
        self.members
            .iter()
            .find(|m| m.name.as_deref() == Some(name) && m.kind == Some(kind))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
