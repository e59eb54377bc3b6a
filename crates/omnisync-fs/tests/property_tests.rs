use omnisync_fs::NormalizedPath;
use proptest::prelude::*;

proptest! {
    #[test]
    fn test_normalization_invariants(s in "\\PC*") {
        let path = NormalizedPath::new(&s);
        let as_str = path.as_str();

        prop_assert!(!as_str.contains('\\'));

        // A leading `//` marks a network path; no other doubled separators survive
        let is_network = as_str.starts_with("//") && !as_str.starts_with("///");
        if is_network {
            prop_assert!(!as_str[2..].contains("//"));
        } else {
            prop_assert!(!as_str.contains("//"));
        }

        let roundtripped = NormalizedPath::new(path.to_native());
        prop_assert_eq!(path, roundtripped);
    }

    #[test]
    fn test_join_then_relative_recovers_segment(
        base in "/[a-zA-Z0-9_]{1,8}(/[a-zA-Z0-9_]{1,8}){0,3}",
        rel in "[a-zA-Z0-9_]{1,8}(/[a-zA-Z0-9_.]{1,8}){0,3}",
    ) {
        let base = NormalizedPath::new(&base);
        let joined = base.join(&rel);
        let recovered = joined.relative_to(&base).unwrap();
        prop_assert_eq!(recovered, NormalizedPath::new(&rel));
    }
}
