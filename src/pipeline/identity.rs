use sha2::{Digest, Sha256};

pub fn hash(data: impl AsRef<[u8]>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data.as_ref());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digest() {
        assert_eq!(
            hash(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn deterministic_and_order_sensitive() {
        assert_eq!(hash(b"gpx data"), hash(b"gpx data".to_vec()));
        assert_ne!(hash(b"ab"), hash(b"ba"));
        assert_eq!(hash(b"").len(), 64);
    }
}
