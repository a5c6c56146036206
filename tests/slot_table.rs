#![cfg(any(feature = "std", feature = "foldhash"))]

use std::collections::BTreeMap;

use slot_table::DEFAULT_CAPACITY_FACTOR;
use slot_table::Error;
use slot_table::SlotTable;

#[test]
fn greeting_table() -> Result<(), Error> {
    let mut table = SlotTable::with_capacity(100)?;
    table.insert("hola", "hello")?;
    table.insert("adios", "goodbye")?;
    table.insert("gracias", "thanks")?;

    assert_eq!(table.len(), 3);
    assert_eq!(table.lookup("hola")?, &"hello");
    assert_eq!(table.get_or("hallo", &"?"), &"?");
    assert_eq!(table.remove("missing"), Err(Error::KeyNotFound));

    table.insert("hola", "hi")?;
    assert_eq!(table.len(), 3);
    assert_eq!(table.lookup("hola")?, &"hi");

    assert_eq!(table.remove("adios")?, "goodbye");
    assert!(!table.contains_key("adios"));
    assert_eq!(table.len(), 2);
    Ok(())
}

#[test]
fn capacity_one_fills_up() -> Result<(), Error> {
    let mut table = SlotTable::with_capacity(1)?;
    table.insert(1u32, ())?;
    assert_eq!(table.insert(2u32, ()), Err(Error::TableFull { capacity: 1 }));
    Ok(())
}

#[test]
fn zero_capacity() {
    assert_eq!(
        SlotTable::<u32, u32>::with_capacity(0).err(),
        Some(Error::InvalidCapacity { capacity: 0 })
    );
}

#[test]
fn rebuild_into_larger_table() -> Result<(), Error> {
    let mut small = SlotTable::with_capacity(2)?;
    small.insert(1, "one")?;
    small.insert(2, "two")?;
    assert!(small.insert(3, "three").is_err());

    let mut large = SlotTable::from_mapping(
        small.iter().map(|(k, v)| (*k, *v)).collect::<Vec<_>>(),
        Some(small.capacity() * 2),
    )?;
    large.insert(3, "three")?;

    assert_eq!(large.capacity(), 4);
    assert_eq!(large.len(), 3);
    assert_eq!(large.lookup(&1)?, &"one");
    Ok(())
}

#[test]
fn from_mapping_and_rendering() -> Result<(), Error> {
    let mapping = BTreeMap::from([("a".to_string(), 1)]);
    let table = SlotTable::from_mapping(mapping, None)?;

    assert_eq!(table.capacity(), DEFAULT_CAPACITY_FACTOR);
    assert_eq!(table.to_string(), r#"{"a": 1}"#);
    assert_eq!(format!("{table:?}"), r#"SlotTable::from_mapping({"a": 1})"#);
    Ok(())
}

#[test]
fn equality_across_capacities() -> Result<(), Error> {
    let h1 = SlotTable::from_mapping([("a", 1), ("b", 2), ("c", 3)], Some(50))?;
    let h2 = SlotTable::from_mapping([("b", 2), ("a", 1), ("c", 3)], Some(100))?;
    assert_eq!(h1, h2);

    let copy = h1.clone();
    assert_eq!(copy, h1);
    assert_eq!(copy.capacity(), 50);
    Ok(())
}
