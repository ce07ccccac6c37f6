use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
};

///
/// Id
///
/// Typed store-assigned identity.
/// Carries entity context without changing the underlying key type, so a tag
/// id can never be passed where a performer id is expected.
/// Serializes identically to the raw `u64` key.
///

#[repr(transparent)]
pub struct Id<E> {
    key: u64,
    _marker: PhantomData<fn() -> E>,
}

impl<E> Id<E> {
    /// Construct a typed identity from a raw store key.
    ///
    /// Only stores should call this; the pipeline never invents identities.
    #[must_use]
    pub const fn from_raw(key: u64) -> Self {
        Self {
            key,
            _marker: PhantomData,
        }
    }

    /// Returns the underlying key.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.key
    }
}

impl<E> Clone for Id<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Id<E> {}

impl<E> fmt::Debug for Id<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.key)
    }
}

impl<E> fmt::Display for Id<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)
    }
}

impl<E> Eq for Id<E> {}

impl<E> PartialEq for Id<E> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<E> Hash for Id<E> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl<E> Ord for Id<E> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl<E> PartialOrd for Id<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Serialize for Id<E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.key.serialize(serializer)
    }
}

impl<'de, E> Deserialize<'de> for Id<E> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u64::deserialize(deserializer).map(Self::from_raw)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::Id;

    struct Left;

    #[test]
    fn id_serializes_as_raw_key() {
        let id = Id::<Left>::from_raw(42);

        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        assert_eq!(serde_json::from_str::<Id<Left>>("42").unwrap(), id);
    }

    #[test]
    fn id_orders_by_key() {
        let a = Id::<Left>::from_raw(1);
        let b = Id::<Left>::from_raw(2);

        assert!(a < b);
        assert_eq!(a.raw(), 1);
        assert_eq!(format!("{b}"), "2");
    }
}
