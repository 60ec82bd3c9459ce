//! SS58 address encoding and decoding for Substrate chains
//!
//! Uses the official bs58 crate for base58 encoding, matching the Substrate ecosystem.
//! See: https://docs.substrate.io/reference/address-formats/

use crate::error::TxWrapperError;
use blake2::{Blake2b512, Digest};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// SS58 prefix for checksum calculation
const SS58_PREFIX: &[u8] = b"SS58PRE";

/// Number of checksum bytes appended to 32-byte account ids
const CHECKSUM_LEN: usize = 2;

/// Well-known network prefixes
pub const POLKADOT_SS58_FORMAT: u16 = 0;
pub const KUSAMA_SS58_FORMAT: u16 = 2;
pub const ASTAR_SS58_FORMAT: u16 = 5;
pub const SUBSTRATE_SS58_FORMAT: u16 = 42;

/// Set of network prefixes accepted by this deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkRegistry {
    networks: BTreeMap<u16, String>,
}

impl Default for NetworkRegistry {
    fn default() -> Self {
        let mut networks = BTreeMap::new();
        networks.insert(POLKADOT_SS58_FORMAT, "polkadot".to_string());
        networks.insert(KUSAMA_SS58_FORMAT, "kusama".to_string());
        networks.insert(ASTAR_SS58_FORMAT, "astar".to_string());
        networks.insert(SUBSTRATE_SS58_FORMAT, "substrate".to_string());
        NetworkRegistry { networks }
    }
}

impl NetworkRegistry {
    /// Registry with no prefixes; add them with [`NetworkRegistry::register`]
    pub fn empty() -> Self {
        NetworkRegistry {
            networks: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, prefix: u16, name: impl Into<String>) {
        self.networks.insert(prefix, name.into());
    }

    pub fn is_registered(&self, prefix: u16) -> bool {
        self.networks.contains_key(&prefix)
    }

    pub fn network_name(&self, prefix: u16) -> Option<&str> {
        self.networks.get(&prefix).map(String::as_str)
    }

    /// Encode a public key for a registered network
    pub fn encode_address(&self, public_key: &[u8], prefix: u16) -> Result<String, TxWrapperError> {
        if !self.is_registered(prefix) {
            return Err(TxWrapperError::UnknownNetworkPrefix(prefix));
        }
        encode_ss58(public_key, prefix)
    }

    /// Decode an address, rejecting bad checksums and unregistered prefixes
    pub fn decode_address(&self, address: &str) -> Result<([u8; 32], u16), TxWrapperError> {
        let (public_key, prefix) = decode_ss58(address)?;
        if !self.is_registered(prefix) {
            return Err(TxWrapperError::UnknownNetworkPrefix(prefix));
        }
        Ok((public_key, prefix))
    }
}

/// Textual, checksummed representation of a public key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    public_key: [u8; 32],
    prefix: u16,
}

impl Address {
    pub fn new(public_key: [u8; 32], prefix: u16) -> Self {
        Address { public_key, prefix }
    }

    pub fn public_key(&self) -> &[u8; 32] {
        &self.public_key
    }

    pub fn prefix(&self) -> u16 {
        self.prefix
    }

    /// Same account rendered for another network
    pub fn with_prefix(&self, prefix: u16) -> Self {
        Address::new(self.public_key, prefix)
    }
}

impl FromStr for Address {
    type Err = TxWrapperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (public_key, prefix) = NetworkRegistry::default().decode_address(s)?;
        Ok(Address { public_key, prefix })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match encode_ss58(&self.public_key, self.prefix) {
            Ok(s) => f.write_str(&s),
            Err(_) => write!(f, "0x{}", hex::encode(self.public_key)),
        }
    }
}

/// Encode with the default network registry
pub fn encode_address(public_key: &[u8], prefix: u16) -> Result<String, TxWrapperError> {
    NetworkRegistry::default().encode_address(public_key, prefix)
}

/// Decode with the default network registry
pub fn decode_address(address: &str) -> Result<([u8; 32], u16), TxWrapperError> {
    NetworkRegistry::default().decode_address(address)
}

/// Encode a public key to SS58 address format
///
/// # Arguments
/// * `public_key` - 32-byte public key
/// * `prefix` - Network prefix (0 for Polkadot, 2 for Kusama, 42 for generic Substrate)
pub fn encode_ss58(public_key: &[u8], prefix: u16) -> Result<String, TxWrapperError> {
    if public_key.len() != 32 {
        return Err(TxWrapperError::InvalidAddress(format!(
            "Public key must be 32 bytes, got {}",
            public_key.len()
        )));
    }

    let mut payload = encode_prefix(prefix)?;
    payload.extend_from_slice(public_key);

    let checksum = ss58_checksum(&payload);
    payload.extend_from_slice(&checksum[..CHECKSUM_LEN]);

    Ok(bs58::encode(&payload).into_string())
}

/// Decode an SS58 address to public key and prefix, without checking the prefix
/// against a network registry
pub fn decode_ss58(address: &str) -> Result<([u8; 32], u16), TxWrapperError> {
    let decoded = bs58::decode(address)
        .into_vec()
        .map_err(|e| TxWrapperError::InvalidAddress(format!("Invalid base58: {}", e)))?;

    if decoded.len() < 1 + 32 + CHECKSUM_LEN {
        return Err(TxWrapperError::InvalidAddress("Address too short".to_string()));
    }

    let (prefix, prefix_len) = decode_prefix(&decoded)?;

    let checksum_start = decoded.len() - CHECKSUM_LEN;
    let public_key = &decoded[prefix_len..checksum_start];
    if public_key.len() != 32 {
        return Err(TxWrapperError::InvalidAddress(format!(
            "Invalid public key length: {}",
            public_key.len()
        )));
    }

    let expected = ss58_checksum(&decoded[..checksum_start]);
    if decoded[checksum_start..] != expected[..CHECKSUM_LEN] {
        return Err(TxWrapperError::ChecksumMismatch);
    }

    let mut pk = [0u8; 32];
    pk.copy_from_slice(public_key);
    Ok((pk, prefix))
}

/// Validate an SS58 address
pub fn validate_address(address: &str, expected_prefix: Option<u16>) -> bool {
    match decode_ss58(address) {
        Ok((_, prefix)) => expected_prefix.map_or(true, |expected| prefix == expected),
        Err(_) => false,
    }
}

/// Encode SS58 prefix (supports single and two-byte prefixes)
fn encode_prefix(prefix: u16) -> Result<Vec<u8>, TxWrapperError> {
    if prefix < 64 {
        Ok(vec![prefix as u8])
    } else if prefix < 16384 {
        // Two-byte prefix encoding
        let first = ((prefix & 0b0000_0000_1111_1100) as u8) >> 2 | 0b0100_0000;
        let second = ((prefix >> 8) as u8) | ((prefix & 0b0000_0000_0000_0011) as u8) << 6;
        Ok(vec![first, second])
    } else {
        Err(TxWrapperError::InvalidAddress(format!(
            "Invalid prefix: {}",
            prefix
        )))
    }
}

/// Decode SS58 prefix from raw bytes
fn decode_prefix(data: &[u8]) -> Result<(u16, usize), TxWrapperError> {
    if data[0] < 64 {
        Ok((data[0] as u16, 1))
    } else if data[0] < 128 {
        if data.len() < 2 {
            return Err(TxWrapperError::InvalidAddress(
                "Address too short for two-byte prefix".to_string(),
            ));
        }
        let lower = (data[0] & 0b0011_1111) << 2 | (data[1] >> 6);
        let upper = data[1] & 0b0011_1111;
        Ok((((upper as u16) << 8) | (lower as u16), 2))
    } else {
        Err(TxWrapperError::InvalidAddress(format!(
            "Invalid prefix byte: {}",
            data[0]
        )))
    }
}

/// Calculate SS58 checksum (Blake2b-512 of "SS58PRE" || payload)
fn ss58_checksum(payload: &[u8]) -> [u8; 64] {
    let mut hasher = Blake2b512::new();
    hasher.update(SS58_PREFIX);
    hasher.update(payload);
    let result = hasher.finalize();
    let mut checksum = [0u8; 64];
    checksum.copy_from_slice(&result);
    checksum
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const PUBKEY_HEX: &str = "61b18c6dc02ddcabdeac56cb4f21a971cc41cc97640f6f85b073480008c53a0d";

    fn pubkey() -> [u8; 32] {
        hex::decode(PUBKEY_HEX).unwrap().try_into().unwrap()
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let address = encode_address(&pubkey(), 42).unwrap();
        assert_eq!(address, "5EGoFA95omzemRssELLDjVenNZ68aXyUeqtKQScXSEBvVJkr");

        let (decoded_pubkey, prefix) = decode_address(&address).unwrap();
        assert_eq!(decoded_pubkey, pubkey());
        assert_eq!(prefix, 42);
    }

    #[rstest]
    #[case(POLKADOT_SS58_FORMAT, '1')]
    #[case(SUBSTRATE_SS58_FORMAT, '5')]
    fn test_network_leading_char(#[case] prefix: u16, #[case] leading: char) {
        let address = encode_address(&pubkey(), prefix).unwrap();
        assert!(address.starts_with(leading));
        assert_eq!(decode_address(&address).unwrap(), (pubkey(), prefix));
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(
            encode_address(&pubkey(), 2).unwrap(),
            encode_address(&pubkey(), 2).unwrap()
        );
    }

    #[test]
    fn test_unknown_network_prefix() {
        assert_eq!(
            encode_address(&pubkey(), 7),
            Err(TxWrapperError::UnknownNetworkPrefix(7))
        );

        let address = encode_ss58(&pubkey(), 7).unwrap();
        assert_eq!(
            decode_address(&address),
            Err(TxWrapperError::UnknownNetworkPrefix(7))
        );

        let mut networks = NetworkRegistry::default();
        networks.register(7, "edgeware");
        assert_eq!(networks.decode_address(&address).unwrap(), (pubkey(), 7));
    }

    #[test]
    fn test_two_byte_prefix_roundtrip() {
        let mut networks = NetworkRegistry::empty();
        networks.register(1284, "moonbeam-ss58");
        let address = networks.encode_address(&pubkey(), 1284).unwrap();
        assert_eq!(networks.decode_address(&address).unwrap(), (pubkey(), 1284));
    }

    #[test]
    fn test_corrupted_bytes_are_rejected() {
        let address = encode_address(&pubkey(), 42).unwrap();
        let raw = bs58::decode(&address).into_vec().unwrap();

        // Flip each prefix/pubkey byte in turn
        for i in 0..raw.len() - CHECKSUM_LEN {
            let mut corrupted = raw.clone();
            corrupted[i] ^= 0x01;
            let text = bs58::encode(&corrupted).into_string();
            assert!(decode_address(&text).is_err(), "corruption at byte {} accepted", i);
        }

        let mut corrupted = raw.clone();
        corrupted[5] ^= 0x80;
        let text = bs58::encode(&corrupted).into_string();
        assert_eq!(decode_address(&text), Err(TxWrapperError::ChecksumMismatch));
    }

    #[test]
    fn test_validate_address() {
        let valid = "5EGoFA95omzemRssELLDjVenNZ68aXyUeqtKQScXSEBvVJkr";
        assert!(validate_address(valid, Some(42)));
        assert!(validate_address(valid, None));
        assert!(!validate_address(valid, Some(0)));

        assert!(!validate_address("invalid", None));
    }

    #[test]
    fn test_address_from_str() {
        let address: Address = "5EGoFA95omzemRssELLDjVenNZ68aXyUeqtKQScXSEBvVJkr"
            .parse()
            .unwrap();
        assert_eq!(address.public_key(), &pubkey());
        assert_eq!(address.prefix(), 42);
        assert!(address.with_prefix(0).to_string().starts_with('1'));
    }

    #[test]
    fn test_invalid_pubkey_length() {
        let short_pubkey = vec![0u8; 16];
        assert!(encode_ss58(&short_pubkey, 42).is_err());
    }
}
