//! RPC utility functions
//!
//! Address validation and log-safe endpoint formatting.

use crate::constants::PUBKEY_BYTES;
use solana_sdk::pubkey::Pubkey;

/// Shortest and longest base58 rendering of a 32-byte key
const MIN_ADDRESS_LEN: usize = 32;
const MAX_ADDRESS_LEN: usize = 44;

/// Parse a wallet or mint address, explaining what is wrong with it
///
/// Checks length, the base58 alphabet and the decoded key size, without
/// touching the network.
pub fn parse_pubkey_string(s: &str) -> Result<Pubkey, String> {
    if s.is_empty() {
        return Err("address is empty".to_string());
    }
    if s.trim() != s {
        return Err("address has surrounding whitespace".to_string());
    }
    if s.len() < MIN_ADDRESS_LEN || s.len() > MAX_ADDRESS_LEN {
        return Err(format!(
            "length {} is outside {}..={}",
            s.len(),
            MIN_ADDRESS_LEN,
            MAX_ADDRESS_LEN
        ));
    }

    let bytes = bs58::decode(s)
        .into_vec()
        .map_err(|e| format!("not valid base58: {}", e))?;
    if bytes.len() != PUBKEY_BYTES {
        return Err(format!(
            "decodes to {} bytes, expected {}",
            bytes.len(),
            PUBKEY_BYTES
        ));
    }

    Pubkey::try_from(bytes.as_slice()).map_err(|e| format!("invalid public key: {}", e))
}

/// Hide credentials and API keys that providers put in the URL
///
/// `https://rpc.example.com/v1/abc123?api-key=xyz` becomes `https://rpc.example.com/***`
pub fn mask_url(url: &str) -> String {
    let (scheme, rest) = match url.split_once("://") {
        Some((scheme, rest)) => (scheme, rest),
        None => return "***".to_string(),
    };
    let authority = rest
        .split(|c| c == '/' || c == '?')
        .next()
        .unwrap_or_default();
    let host = authority.rsplit('@').next().unwrap_or(authority);
    if authority.len() == rest.len() {
        format!("{}://{}", scheme, host)
    } else {
        format!("{}://{}/***", scheme, host)
    }
}

/// Shorten an address for display: `EPjF…Dt1v`
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 8 {
        return address.to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}
