//! Property and scenario tests for sorting, searching and the registry.

use proptest::prelude::*;
use record_registry::search::{binary_search_all, linear_search};
use record_registry::sort::{is_sorted_by, merge_sort, quick_sort};
use record_registry::{
    Algorithm, CsvStore, Layout, OrderedList, Record, RecordOrder, Registry, RegistryError,
    SortKey,
};

fn arb_algorithm() -> impl Strategy<Value = Algorithm> {
    prop_oneof![
        Just(Algorithm::Bubble),
        Just(Algorithm::Insertion),
        Just(Algorithm::Selection),
        Just(Algorithm::Merge),
        Just(Algorithm::Quick),
    ]
}

fn counts(values: &[i32]) -> std::collections::BTreeMap<i32, usize> {
    let mut map = std::collections::BTreeMap::new();
    for v in values {
        *map.entry(*v).or_insert(0) += 1;
    }
    map
}

// =============================================================================
// Sort / Search Properties
// =============================================================================

proptest! {
    #[test]
    fn sort_yields_sorted_permutation(
        values in prop::collection::vec(-50i32..50, 0..64),
        algorithm in arb_algorithm(),
    ) {
        let mut sorted = values.clone();
        algorithm.sort(&mut sorted);

        prop_assert_eq!(sorted.len(), values.len());
        prop_assert!(is_sorted_by(&sorted, i32::cmp));
        prop_assert_eq!(counts(&sorted), counts(&values));
    }

    #[test]
    fn stable_algorithms_match_std_stable_sort(
        pairs in prop::collection::vec((0u8..4, any::<u16>()), 0..48),
        algorithm in arb_algorithm(),
    ) {
        prop_assume!(algorithm.is_stable());
        let mut expected = pairs.clone();
        expected.sort_by_key(|p| p.0);

        let mut sorted = pairs;
        algorithm.sort_by(&mut sorted, |a, b| a.0.cmp(&b.0));
        prop_assert_eq!(sorted, expected);
    }

    #[test]
    fn linear_search_finds_occurring_keys(
        values in prop::collection::vec(0i32..20, 0..40),
        key in 0i32..20,
    ) {
        match linear_search(&values, &key) {
            Some(i) => {
                prop_assert_eq!(values[i], key);
                prop_assert!(!values[..i].contains(&key));
            }
            None => prop_assert!(!values.contains(&key)),
        }
    }

    #[test]
    fn binary_search_agrees_with_membership(
        mut values in prop::collection::vec(-100i32..100, 0..50),
        key in -100i32..100,
    ) {
        values.sort();
        match binary_search_all(&values, &key) {
            Some(i) => prop_assert_eq!(values[i], key),
            None => prop_assert!(!values.contains(&key)),
        }
    }

    #[test]
    fn list_visits_in_reverse_insertion_order(ids in prop::collection::vec(any::<i64>(), 0..30)) {
        let list: OrderedList<Record> = ids.iter().map(|id| Record::new(*id, "r")).collect();
        let visited: Vec<i64> = list.iter().map(Record::id).collect();
        let mut expected = ids.clone();
        expected.reverse();
        prop_assert_eq!(visited, expected);
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_quick_merge_and_binary_search() {
    let mut quick = [5, 3, 8, 1];
    let mut merge = quick;
    quick_sort(&mut quick);
    merge_sort(&mut merge);
    assert_eq!(quick, [1, 3, 5, 8]);
    assert_eq!(merge, [1, 3, 5, 8]);

    assert_eq!(binary_search_all(&quick, &8), Some(3));
    assert_eq!(binary_search_all(&quick, &4), None);
}

#[test]
fn test_duplicate_scenario() {
    let mut registry = Registry::default();
    registry.add(Record::new(1, "A")).unwrap();
    registry.add(Record::new(2, "B")).unwrap();
    assert!(matches!(
        registry.add(Record::new(1, "C")),
        Err(RegistryError::DuplicateKey { id: 1 })
    ));
    assert_eq!(registry.len(), 2);

    for algorithm in Algorithm::ALL {
        assert_eq!(
            registry.list_sorted(RecordOrder::Id, algorithm),
            vec![Record::new(1, "A"), Record::new(2, "B")]
        );
    }
}

#[test]
fn test_snapshot_lifecycle() {
    let mut registry = Registry::default().with_algorithm(Algorithm::Quick);
    for (id, name) in [(30, "Zed"), (10, "Amy"), (20, "Kai")] {
        registry.add(Record::new(id, name)).unwrap();
    }

    registry.build_snapshot(RecordOrder::Name);
    assert_eq!(
        registry.find_sorted_key(&SortKey::Name("Kai".into())).unwrap().id(),
        20
    );
    assert!(matches!(
        registry.find_sorted_key(&SortKey::Id(20)),
        Err(RegistryError::PreconditionViolated(_))
    ));

    registry.remove(20).unwrap();
    assert!(matches!(
        registry.find_sorted_key(&SortKey::Name("Amy".into())),
        Err(RegistryError::PreconditionViolated(_))
    ));

    registry.build_snapshot(RecordOrder::Id);
    assert!(matches!(
        registry.find_sorted_key(&SortKey::Id(20)),
        Err(RegistryError::NotFound { .. })
    ));
    assert_eq!(registry.find_sorted_key(&SortKey::Id(30)).unwrap().name, "Zed");
}

#[test]
fn test_csv_round_trip_through_registry() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hospitals.csv");
    std::fs::write(
        &path,
        "id,name,location,patients\n1,\"CHUK\",Kigali,250\n2,King Faisal,Kigali,180\n",
    )
    .unwrap();

    let mut store = CsvStore::new(&path, Layout::Hospital);
    let mut registry = Registry::open(&store, Layout::Hospital).unwrap();
    assert_eq!(registry.iter().map(Record::id).collect::<Vec<_>>(), vec![2, 1]);

    let attributes = Layout::Hospital.parse_fields(&["Huye", "90"]).unwrap();
    registry
        .add(Record::with_attributes(3, "Butare", attributes))
        .unwrap();
    registry.remove(1).unwrap();
    registry.save(&mut store).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        content,
        "id,name,location,patients\n2,King Faisal,Kigali,180\n3,Butare,Huye,90\n"
    );

    let reopened = Registry::open(&store, Layout::Hospital).unwrap();
    assert_eq!(reopened.len(), 2);
    assert_eq!(reopened.find_exact(3).unwrap().name, "Butare");
}
