use sha3::{Digest, Keccak256};

/// Hashing capability handed to components that derive selectors or topics.
pub trait Hasher: Send + Sync {
    fn keccak256(&self, data: &[u8]) -> [u8; 32];

    /// First four bytes of the keccak digest of a canonical function signature.
    fn selector(&self, signature: &str) -> [u8; 4] {
        let digest = self.keccak256(signature.as_bytes());
        [digest[0], digest[1], digest[2], digest[3]]
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Keccak256Hasher;

impl Hasher for Keccak256Hasher {
    fn keccak256(&self, data: &[u8]) -> [u8; 32] {
        let mut hasher = Keccak256::new();
        hasher.update(data);
        hasher.finalize().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keccak256_matches_empty_string_vector() {
        let digest = hex::encode(Keccak256Hasher.keccak256(b""));
        assert_eq!(
            digest,
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn selector_matches_known_erc20_transfer() {
        let selector = Keccak256Hasher.selector("transfer(address,uint256)");
        assert_eq!(hex::encode(selector), "a9059cbb");
    }
}
