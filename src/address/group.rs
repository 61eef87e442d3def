//! Address group (shard) computation

use bitcoin::base58;

use crate::error::WalletError;

/// Number of address groups on every Alephium network.
pub const TOTAL_NUMBER_OF_GROUPS: u8 = 4;

const P2PKH: u8 = 0x00;
const P2MPKH: u8 = 0x01;
const P2SH: u8 = 0x02;
const P2C: u8 = 0x03;

/// Compute the group an address belongs to from its base58 hash.
pub fn group_of_address(address: &str) -> Result<u8, WalletError> {
    let bytes = base58::decode(address)
        .map_err(|e| WalletError::InvalidAddress(format!("{}: {}", address, e)))?;

    let (address_type, payload) = bytes
        .split_first()
        .ok_or_else(|| WalletError::InvalidAddress(format!("{}: empty", address)))?;

    match *address_type {
        P2PKH | P2SH => {
            if payload.len() != 32 {
                return Err(WalletError::InvalidAddress(format!(
                    "{}: expected 32 byte hash, got {}",
                    address,
                    payload.len()
                )));
            }
            Ok(group_of_lockup_hash(payload))
        }
        // compact-int key count, then the first public key hash
        P2MPKH => payload
            .get(1..33)
            .map(group_of_lockup_hash)
            .ok_or_else(|| WalletError::InvalidAddress(format!("{}: truncated", address))),
        P2C => payload
            .last()
            .map(|b| b % TOTAL_NUMBER_OF_GROUPS)
            .ok_or_else(|| WalletError::InvalidAddress(format!("{}: truncated", address))),
        other => Err(WalletError::InvalidAddress(format!(
            "{}: unknown address type {}",
            address, other
        ))),
    }
}

fn group_of_lockup_hash(hash: &[u8]) -> u8 {
    let hint = djb2(hash) | 1;
    xor_byte(hint) % TOTAL_NUMBER_OF_GROUPS
}

fn djb2(bytes: &[u8]) -> u32 {
    bytes.iter().fold(5381u32, |hash, b| {
        (hash << 5).wrapping_add(hash).wrapping_add(*b as u32)
    })
}

fn xor_byte(value: u32) -> u8 {
    let [b0, b1, b2, b3] = value.to_be_bytes();
    b0 ^ b1 ^ b2 ^ b3
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(address_type: u8, payload: &[u8]) -> String {
        let mut bytes = vec![address_type];
        bytes.extend_from_slice(payload);
        base58::encode(&bytes)
    }

    #[test]
    fn test_p2pkh_groups() {
        assert_eq!(group_of_address(&encode(P2PKH, &[0u8; 32])).unwrap(), 3);
        assert_eq!(group_of_address(&encode(P2PKH, &[0xffu8; 32])).unwrap(), 2);

        let sequential: Vec<u8> = (0u8..32).collect();
        assert_eq!(group_of_address(&encode(P2PKH, &sequential)).unwrap(), 1);
    }

    #[test]
    fn test_p2sh_uses_the_same_rule() {
        assert_eq!(
            group_of_address(&encode(P2SH, &[1u8; 32])).unwrap(),
            group_of_address(&encode(P2PKH, &[1u8; 32])).unwrap()
        );
    }

    #[test]
    fn test_p2c_uses_last_byte() {
        let mut id = [0u8; 32];
        id[31] = 6;
        assert_eq!(group_of_address(&encode(P2C, &id)).unwrap(), 2);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(group_of_address("0OIl").is_err());
        assert!(group_of_address(&encode(P2PKH, &[0u8; 5])).is_err());
        assert!(group_of_address(&encode(0x09, &[0u8; 32])).is_err());
    }
}
