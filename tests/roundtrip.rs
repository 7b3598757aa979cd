use mixpak::{decode, Archive, DecodeOptions, Entry};
use proptest::prelude::*;

fn entries_strategy() -> impl Strategy<Value = Vec<(String, Vec<u8>)>> {
    proptest::collection::vec(
        ("[A-Za-z0-9_.]{1,12}", proptest::collection::vec(any::<u8>(), 0..64)),
        0..16,
    )
}

fn as_pairs(ar: &Archive) -> Vec<(String, Vec<u8>)> {
    ar.entries()
        .iter()
        .map(|e| (e.name().to_owned(), e.data().to_vec()))
        .collect()
}

proptest! {
    /// decode(encode(A)) == A as a multiset of (name, content) pairs.
    #[test]
    fn roundtrip_preserves_entries(entries in entries_strategy()) {
        let mut ar = Archive::new();
        for (name, data) in &entries {
            ar.add(Entry::new(name.clone(), data.clone()));
        }

        let back = decode(&ar.to_bytes().unwrap(), DecodeOptions::default()).unwrap();
        prop_assert_eq!(back.len(), entries.len());

        let mut want = entries.clone();
        let mut got = as_pairs(&back);
        want.sort();
        got.sort();
        prop_assert_eq!(got, want);
    }

    /// Re-encoding a decoded archive must itself decode to the same
    /// entries, even though the bytes may legally differ from the source.
    #[test]
    fn reencode_decodes_identically(entries in entries_strategy()) {
        let mut ar = Archive::new();
        for (name, data) in &entries {
            ar.add(Entry::new(name.clone(), data.clone()));
        }

        let once = decode(&ar.to_bytes().unwrap(), DecodeOptions::default()).unwrap();
        let twice = decode(&once.to_bytes().unwrap(), DecodeOptions::default()).unwrap();

        let mut first = as_pairs(&once);
        let mut second = as_pairs(&twice);
        first.sort();
        second.sort();
        prop_assert_eq!(first, second);
    }

    /// Arbitrary junk must come back as an error, never a panic.
    #[test]
    fn decode_never_panics_on_junk(data in proptest::collection::vec(any::<u8>(), 0..256)) {
        let _ = decode(&data, DecodeOptions::default());
        let _ = decode(&data, DecodeOptions::lenient());
    }
}
