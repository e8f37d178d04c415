//! Wallet address encoding.
//!
//! The wallet provider hands out account addresses as standard base64 of the
//! 32-byte public key. Everything past the provider boundary uses base58.

use base64::Engine as _;

use crate::core::errors::AddressFormatError;

/// Convert a provider address (base64) into the canonical base58 form.
pub fn encode_address(raw: &str) -> Result<String, AddressFormatError> {
    if raw.trim().is_empty() {
        return Err(AddressFormatError::Empty);
    }
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(raw)
        .map_err(|e| AddressFormatError::InvalidEncoding(e.to_string()))?;
    if bytes.is_empty() {
        return Err(AddressFormatError::Empty);
    }
    Ok(bs58::encode(bytes).into_string())
}

/// `first6...last6` for addresses longer than 12 characters.
pub fn shorten_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 12 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 6..].iter().collect();
    format!("{}...{}", head, tail)
}
