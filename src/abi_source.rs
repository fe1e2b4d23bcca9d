use crate::abi::Interface;

pub mod etherscan;

/// Somewhere contract interfaces can be looked up by address.
#[allow(async_fn_in_trait)]
pub trait AbiSource {
    type Error: std::error::Error;

    async fn fetch_abi(&self, address: &str) -> Result<Interface, Self::Error>;
}
