//! Structural checks of a contract interface against the ERC-721 and ERC-1155
//! required surfaces.
//!
//! The expected shapes are static tables; a single matcher compares any
//! member against its table entry. Lookups and comparisons never fail, a
//! missing or malformed member is just a failed check.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

use crate::abi::{Interface, Member, MemberKind, Param};

#[derive(Serialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Standard {
    Erc721,
    Erc1155,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ExpectedParam {
    pub ty: &'static str,
    /// `None` for function parameters, where the flag isn't compared.
    pub indexed: Option<bool>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ExpectedMember {
    pub name: &'static str,
    pub kind: MemberKind,
    pub inputs: &'static [ExpectedParam],
    /// Output types, only compared for functions.
    pub outputs: &'static [&'static str],
}

const fn topic(ty: &'static str) -> ExpectedParam {
    ExpectedParam { ty, indexed: Some(true) }
}

const fn data(ty: &'static str) -> ExpectedParam {
    ExpectedParam { ty, indexed: Some(false) }
}

const fn arg(ty: &'static str) -> ExpectedParam {
    ExpectedParam { ty, indexed: None }
}

/// `Transfer(address indexed, address indexed, uint256 indexed)`
///
/// ERC-20 uses the same name but leaves the amount unindexed.
pub const ERC721_TRANSFER: ExpectedMember = ExpectedMember {
    name: "Transfer",
    kind: MemberKind::Event,
    inputs: &[topic("address"), topic("address"), topic("uint256")],
    outputs: &[],
};

/// `tokenURI(uint256) returns (string)`
pub const ERC721_TOKEN_URI: ExpectedMember = ExpectedMember {
    name: "tokenURI",
    kind: MemberKind::Function,
    inputs: &[arg("uint256")],
    outputs: &["string"],
};

/// `TransferSingle(address indexed operator, address indexed from, address indexed to, uint256 id, uint256 value)`
pub const ERC1155_TRANSFER_SINGLE: ExpectedMember = ExpectedMember {
    name: "TransferSingle",
    kind: MemberKind::Event,
    inputs: &[
        topic("address"),
        topic("address"),
        topic("address"),
        data("uint256"),
        data("uint256"),
    ],
    outputs: &[],
};

/// `TransferBatch(address indexed operator, address indexed from, address indexed to, uint256[] ids, uint256[] values)`
pub const ERC1155_TRANSFER_BATCH: ExpectedMember = ExpectedMember {
    name: "TransferBatch",
    kind: MemberKind::Event,
    inputs: &[
        topic("address"),
        topic("address"),
        topic("address"),
        data("uint256[]"),
        data("uint256[]"),
    ],
    outputs: &[],
};

/// `uri(uint256) returns (string)`
pub const ERC1155_URI: ExpectedMember = ExpectedMember {
    name: "uri",
    kind: MemberKind::Function,
    inputs: &[arg("uint256")],
    outputs: &["string"],
};

const ERC721_MEMBERS: &[ExpectedMember] = &[ERC721_TRANSFER, ERC721_TOKEN_URI];
const ERC1155_MEMBERS: &[ExpectedMember] = &[
    ERC1155_TRANSFER_SINGLE,
    ERC1155_TRANSFER_BATCH,
    ERC1155_URI,
];

impl Standard {
    pub fn required_members(self) -> &'static [ExpectedMember] {
        match self {
            Standard::Erc721 => ERC721_MEMBERS,
            Standard::Erc1155 => ERC1155_MEMBERS,
        }
    }

    /// Run every required member check. All checks are evaluated so the
    /// verdict's `points` are always complete.
    pub fn check(self, abi: &Interface) -> StandardVerdict {
        let points: IndexMap<&'static str, bool> = self
            .required_members()
            .iter()
            .map(|expected| (expected.name, check_member(abi, expected)))
            .collect();
        let pass = points.values().all(|ok| *ok);

        StandardVerdict {
            standard: self,
            pass,
            points,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Standard::Erc721 => "erc721",
            Standard::Erc1155 => "erc1155",
        }
    }
}

impl fmt::Display for Standard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct StandardVerdict {
    pub standard: Standard,
    /// True iff every entry in `points` is true.
    pub pass: bool,
    /// Check result per required member name, in table order.
    pub points: IndexMap<&'static str, bool>,
}

/// Look up `expected` by name and kind and compare its signature.
pub fn check_member(abi: &Interface, expected: &ExpectedMember) -> bool {
    abi.find(expected.name, expected.kind)
        .map_or(false, |member| matches(member, expected))
}

/// Exact positional comparison of a member's parameters with the expected
/// shape. Type strings are compared literally.
pub fn matches(member: &Member, expected: &ExpectedMember) -> bool {
    let inputs_match = member.inputs.as_deref().map_or(false, |inputs| {
        inputs.len() == expected.inputs.len()
            && inputs.iter().zip(expected.inputs).all(|(actual, want)| {
                actual.ty.as_deref() == Some(want.ty)
                    && want.indexed.map_or(true, |flag| actual.indexed == Some(flag))
            })
    });
    if !inputs_match {
        return false;
    }

    match expected.kind {
        MemberKind::Function => member
            .outputs
            .as_deref()
            .map_or(false, |outputs| types_match(outputs, expected.outputs)),
        _ => true,
    }
}

fn types_match(actual: &[Param], expected: &[&str]) -> bool {
    actual.len() == expected.len()
        && actual
            .iter()
            .zip(expected)
            .all(|(param, ty)| param.ty.as_deref() == Some(*ty))
}
