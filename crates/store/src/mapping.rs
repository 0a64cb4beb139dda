//! Chained hash table over raw byte keys and values.

use std::hash::{Hash, Hasher};

/// Fixed bucket count; prime, so low bits of weak hashes still spread.
const BUCKET_COUNT: usize = 251;

#[derive(Debug)]
struct Record {
    key: Vec<u8>,
    value: Vec<u8>,
}

/// A key-to-value mapping over arbitrary byte strings.
///
/// Keys are compared byte-for-byte over their full length, never by pointer
/// or prefix. Both key and value bytes are copied in at [`create`] time and
/// owned by the table until [`remove`].
///
/// Duplicate keys are not rejected: creating the same key twice yields two
/// records, and because insertion *prepends* to the bucket chain, the most
/// recently created record shadows older ones in [`resolve`]. [`remove`]
/// deletes only the newest match, unshadowing the previous one.
///
/// Not thread-safe; see the crate docs.
///
/// [`create`]: MappingTable::create
/// [`resolve`]: MappingTable::resolve
/// [`remove`]: MappingTable::remove
#[derive(Debug)]
pub struct MappingTable {
    buckets: Vec<Vec<Record>>,
    len: usize,
}

impl MappingTable {
    /// Create an empty table.
    pub fn new() -> Self {
        MappingTable {
            buckets: (0..BUCKET_COUNT).map(|_| Vec::new()).collect(),
            len: 0,
        }
    }

    fn bucket_of(key: &[u8]) -> usize {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % BUCKET_COUNT as u64) as usize
    }

    /// Copy `key` and `value` into owned storage and insert the record.
    ///
    /// No uniqueness check is performed; see the type docs for duplicate-key
    /// shadowing semantics.
    pub fn create(&mut self, key: &[u8], value: &[u8]) {
        let bucket = Self::bucket_of(key);
        self.buckets[bucket].insert(
            0,
            Record {
                key: key.to_vec(),
                value: value.to_vec(),
            },
        );
        self.len += 1;
    }

    /// Look up the newest record whose key equals `key` byte-for-byte.
    ///
    /// A miss is an ordinary negative result, not an error. The returned
    /// slice stays owned by the table.
    pub fn resolve(&self, key: &[u8]) -> Option<&[u8]> {
        self.buckets[Self::bucket_of(key)]
            .iter()
            .find(|r| r.key == key)
            .map(|r| r.value.as_slice())
    }

    /// Remove the newest record matching `key`, freeing its storage.
    ///
    /// Returns whether a record was removed; absence is a no-op.
    pub fn remove(&mut self, key: &[u8]) -> bool {
        let chain = &mut self.buckets[Self::bucket_of(key)];
        match chain.iter().position(|r| r.key == key) {
            Some(pos) => {
                chain.remove(pos);
                self.len -= 1;
                true
            }
            None => false,
        }
    }

    /// Number of records currently stored (duplicates counted).
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for MappingTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_resolve_remove() {
        let mut table = MappingTable::new();
        for i in 0..100u32 {
            table.create(&i.to_be_bytes(), format!("value-{i}").as_bytes());
        }
        assert_eq!(table.len(), 100);
        for i in 0..100u32 {
            assert_eq!(
                table.resolve(&i.to_be_bytes()),
                Some(format!("value-{i}").as_bytes())
            );
        }
        assert!(table.remove(&42u32.to_be_bytes()));
        assert_eq!(table.resolve(&42u32.to_be_bytes()), None);
        assert!(!table.remove(&42u32.to_be_bytes()));
        assert_eq!(table.len(), 99);
    }

    #[test]
    fn test_exact_byte_equality() {
        let mut table = MappingTable::new();
        table.create(b"ab", b"1");
        // Same prefix, different length: distinct keys.
        assert_eq!(table.resolve(b"a"), None);
        assert_eq!(table.resolve(b"abc"), None);
        assert_eq!(table.resolve(b"ab"), Some(b"1".as_slice()));
    }

    #[test]
    fn test_newest_duplicate_shadows() {
        let mut table = MappingTable::new();
        table.create(b"addr", b"old");
        table.create(b"addr", b"new");
        assert_eq!(table.resolve(b"addr"), Some(b"new".as_slice()));
        // Removing the newest unshadows the older record.
        assert!(table.remove(b"addr"));
        assert_eq!(table.resolve(b"addr"), Some(b"old".as_slice()));
        assert!(table.remove(b"addr"));
        assert_eq!(table.resolve(b"addr"), None);
    }

    #[test]
    fn test_empty_key_is_a_key() {
        let mut table = MappingTable::new();
        table.create(b"", b"empty");
        assert_eq!(table.resolve(b""), Some(b"empty".as_slice()));
    }
}
