//! Property-based tests for the config container.

use super::container::{is_upper_key, Config};
use proptest::prelude::*;
use serde_json::Value;
use std::collections::BTreeMap;

fn upper_key_strategy() -> impl Strategy<Value = String> {
    "[A-Z][A-Z0-9_]{0,15}"
}

fn any_key_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z_][A-Za-z0-9_]{0,15}"
}

fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-z ]{0,20}".prop_map(Value::from),
    ]
}

fn entries_strategy(
    key: impl Strategy<Value = String>,
) -> impl Strategy<Value = BTreeMap<String, Value>> {
    prop::collection::btree_map(key, value_strategy(), 0..20)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 2000,
        .. ProptestConfig::default()
    })]

    // Later updates win for every key they carry
    #[test]
    fn update_later_wins(
        low in entries_strategy(upper_key_strategy()),
        high in entries_strategy(upper_key_strategy())
    ) {
        let mut config = Config::new();
        config.update(low.clone());
        config.update(high.clone());

        for (key, value) in &high {
            prop_assert_eq!(&config[key.as_str()], value);
        }
        for (key, value) in &low {
            if !high.contains_key(key) {
                prop_assert_eq!(&config[key.as_str()], value);
            }
        }
    }

    // from_mapping keeps exactly the upper-case keys
    #[test]
    fn from_mapping_keeps_upper_keys(entries in entries_strategy(any_key_strategy())) {
        let mut config = Config::new();
        let merged = config.from_mapping(entries.clone());

        let expected: Vec<&String> = entries.keys().filter(|k| is_upper_key(k)).collect();
        prop_assert_eq!(merged, expected.len());
        prop_assert_eq!(config.keys().collect::<Vec<_>>(), expected);
    }

    // Equality only depends on the key/value set, not on insertion order
    #[test]
    fn equality_ignores_insertion_order(entries in entries_strategy(upper_key_strategy())) {
        let forward: Config = entries.clone().into_iter().collect();
        let backward: Config = entries.into_iter().rev().collect();
        prop_assert_eq!(forward, backward);
    }

    // Trimmed namespace keys plus the prefix give back the original keys
    #[test]
    fn namespace_trim_round_trips(entries in entries_strategy(upper_key_strategy())) {
        let config: Config = entries.clone().into_iter().collect();
        let prefix = "A";
        let trimmed = config.get_namespace(prefix, false, true);

        let expected: BTreeMap<String, Value> = entries
            .into_iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .collect();
        let restored: BTreeMap<String, Value> = trimmed
            .into_iter()
            .map(|(k, v)| (format!("{prefix}{k}"), v))
            .collect();
        prop_assert_eq!(restored, expected);
    }
}
