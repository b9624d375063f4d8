use alloy_primitives::{Address, B256, U256};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use sha3::{Digest, Keccak256};

use crate::error::TxError;

/// Derives the Ethereum address of an uncompressed secp256k1 public key
/// (65 bytes, starting with 0x04).
///
/// The address is the last 20 bytes of the Keccak-256 hash of the 64-byte key
/// without its 0x04 prefix.
pub fn pubkey_to_address(uncompressed_pubkey: &[u8]) -> Result<Address, TxError> {
    if uncompressed_pubkey.len() != 65 || uncompressed_pubkey[0] != 0x04 {
        return Err(TxError::InvalidSignature(
            "recovered key is not an uncompressed point".into(),
        ));
    }

    let hash = Keccak256::digest(&uncompressed_pubkey[1..]);
    Ok(Address::from_slice(&hash[12..]))
}

/// Recovers the signer address from a 32-byte prehash and an ECDSA
/// signature split into recovery id, r and s.
pub fn recover_sender(
    prehash: &B256,
    recovery_id: u8,
    r: U256,
    s: U256,
) -> Result<Address, TxError> {
    let r_bytes: [u8; 32] = r.to_be_bytes();
    let s_bytes: [u8; 32] = s.to_be_bytes();

    let sig = Signature::from_scalars(r_bytes, s_bytes)
        .map_err(|e| TxError::InvalidSignature(format!("bad r/s: {e}")))?;
    let recid = RecoveryId::from_byte(recovery_id)
        .ok_or_else(|| TxError::InvalidSignature(format!("bad recovery id {recovery_id}")))?;

    let key = VerifyingKey::recover_from_prehash(prehash.as_slice(), &sig, recid)
        .map_err(|e| TxError::InvalidSignature(format!("recovery failed: {e}")))?;

    pubkey_to_address(key.to_encoded_point(false).as_bytes())
}

/// Applies EIP-55 mixed-case checksum encoding to an address.
pub fn checksum_address(address: &Address) -> String {
    let hex_part = hex::encode(address.as_slice());

    // EIP-55: hash the lowercase hex address (without 0x).
    let hash = Keccak256::digest(hex_part.as_bytes());

    let mut checksummed = String::with_capacity(42);
    checksummed.push_str("0x");

    for (i, c) in hex_part.chars().enumerate() {
        // High nibble for even positions, low nibble for odd.
        let nibble = if i % 2 == 0 {
            hash[i / 2] >> 4
        } else {
            hash[i / 2] & 0x0f
        };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            checksummed.push(c.to_ascii_uppercase());
        } else {
            checksummed.push(c);
        }
    }

    checksummed
}
