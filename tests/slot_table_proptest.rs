use std::collections::HashMap;
use std::hash::BuildHasherDefault;
use std::hash::Hasher;

use proptest::prelude::*;
use siphasher::sip::SipHasher;
use slot_table::Error;
use slot_table::SlotTable;

/// Maps every key to one of four hashes so probe runs overlap heavily.
#[derive(Default)]
struct ClumpingHasher(u64);

impl Hasher for ClumpingHasher {
    fn finish(&self) -> u64 {
        self.0 % 4
    }

    fn write(&mut self, bytes: &[u8]) {
        for b in bytes {
            self.0 = self.0.wrapping_mul(31).wrapping_add(*b as u64);
        }
    }
}

type Sip = BuildHasherDefault<SipHasher>;
type Clumping = BuildHasherDefault<ClumpingHasher>;

#[derive(Debug, Clone)]
enum Op {
    Insert(u8, i32),
    Remove(u8),
    Lookup(u8),
}

fn op_strategy(keys: u8) -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..keys, any::<i32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        (0..keys).prop_map(Op::Remove),
        (0..keys).prop_map(Op::Lookup),
    ]
}

// Replays operations against a std HashMap bounded to the same capacity and
// checks every result agrees.
fn check_against_model<S>(
    mut table: SlotTable<u8, i32, S>,
    ops: Vec<Op>,
) -> Result<(), TestCaseError>
where
    S: std::hash::BuildHasher + Clone,
{
    let capacity = table.capacity();
    let mut model: HashMap<u8, i32> = HashMap::new();

    for op in ops {
        match op {
            Op::Insert(k, v) => {
                let result = table.insert(k, v);
                if model.contains_key(&k) || model.len() < capacity {
                    prop_assert_eq!(result, Ok(model.insert(k, v)));
                } else {
                    prop_assert_eq!(result, Err(Error::TableFull { capacity }));
                }
            }
            Op::Remove(k) => {
                let expected = model.remove(&k).ok_or(Error::KeyNotFound);
                prop_assert_eq!(table.remove(&k), expected);
            }
            Op::Lookup(k) => {
                prop_assert_eq!(table.lookup(&k).ok(), model.get(&k));
                prop_assert_eq!(table.contains_key(&k), model.contains_key(&k));
                prop_assert_eq!(*table.get_or(&k, &-1), *model.get(&k).unwrap_or(&-1));
            }
        }

        prop_assert_eq!(table.len(), model.len());
        prop_assert!(table.len() <= table.capacity());
    }

    let pairs: HashMap<u8, i32> = table.iter().map(|(k, v)| (*k, *v)).collect();
    prop_assert_eq!(&pairs, &model);

    let copy = table.clone();
    prop_assert_eq!(copy.len(), model.len());
    prop_assert!(copy == table);

    Ok(())
}

proptest! {
    #[test]
    fn prop_matches_hashmap_model(
        capacity in 1usize..=12,
        ops in proptest::collection::vec(op_strategy(16), 1..200),
    ) {
        let table = SlotTable::with_capacity_and_hasher(capacity, Sip::default()).unwrap();
        check_against_model(table, ops)?;
    }

    #[test]
    fn prop_matches_hashmap_model_with_clumped_hashes(
        capacity in 1usize..=12,
        ops in proptest::collection::vec(op_strategy(16), 1..200),
    ) {
        let table = SlotTable::with_capacity_and_hasher(capacity, Clumping::default()).unwrap();
        check_against_model(table, ops)?;
    }

    #[test]
    fn prop_equality_ignores_order_and_capacity(
        pairs in proptest::collection::hash_map(any::<u8>(), any::<i32>(), 0..20),
        extra in 0usize..30,
    ) {
        let mut forward: Vec<(u8, i32)> = pairs.iter().map(|(k, v)| (*k, *v)).collect();
        forward.sort_unstable();
        let mut backward = forward.clone();
        backward.reverse();

        let capacity = pairs.len().max(1);
        let a = SlotTable::from_mapping_with_hasher(forward, Some(capacity), Sip::default()).unwrap();
        let b = SlotTable::from_mapping_with_hasher(backward, Some(capacity + extra), Sip::default()).unwrap();

        prop_assert!(a == b);
        prop_assert_eq!(a.keys(), b.keys());
    }
}
