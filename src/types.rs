use serde::Serialize;
use std::fmt;

use crate::abi::Interface;
use crate::standard::{Standard, StandardVerdict};

#[derive(Serialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContractType {
    Erc721,
    Erc1155,
    Unknown,
}

impl ContractType {
    /// ERC-721 takes precedence: an interface that satisfies both standards is
    /// reported as ERC-721.
    pub fn classify(erc721: &StandardVerdict, erc1155: &StandardVerdict) -> Self {
        if erc721.pass {
            ContractType::Erc721
        } else if erc1155.pass {
            ContractType::Erc1155
        } else {
            ContractType::Unknown
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContractType::Erc721 => Standard::Erc721.as_str(),
            ContractType::Erc1155 => Standard::Erc1155.as_str(),
            ContractType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Both verdicts for one contract together with the resulting label.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    #[serde(rename = "standard")]
    pub contract_type: ContractType,
    pub erc721: StandardVerdict,
    pub erc1155: StandardVerdict,
}

impl Classification {
    pub fn of(abi: &Interface) -> Self {
        let erc721 = Standard::Erc721.check(abi);
        let erc1155 = Standard::Erc1155.check(abi);
        Self {
            contract_type: ContractType::classify(&erc721, &erc1155),
            erc721,
            erc1155,
        }
    }
}
