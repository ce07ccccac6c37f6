use md5::{Digest, Md5};
use serde::{Serialize, Serializer};
use std::fmt::{self, Display};

///
/// Checksum
///
/// MD5 digest of an entity's natural key.
/// Used for dedup and display only; identity matching goes by name.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Checksum([u8; 16]);

impl Checksum {
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let mut hasher = Md5::new();
        hasher.update(name.as_bytes());

        let mut out = [0u8; 16];
        out.copy_from_slice(&hasher.finalize());

        Self(out)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Lowercase hex rendering, as stored alongside the entity.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Checksum {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

///
/// TESTS
///
