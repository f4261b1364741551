pub mod tables;

use redb::{
    Database, Key, ReadOnlyTable, ReadTransaction, ReadableTable, Table, TableDefinition, Value,
    WriteTransaction,
};
use serde::{de::DeserializeOwned, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;
use std::sync::Arc;

use crate::error::Result;

/// Database handle type (Arc-wrapped for sharing across handlers)
pub type Db = Arc<Database>;

const BINCODE_CONFIG: bincode::config::Configuration = bincode::config::standard();

/// Open or create the redb database at the given path
///
/// Creates all required tables on first run.
pub fn open_database(path: impl AsRef<Path>) -> Result<Db> {
    tracing::info!("Opening database at: {:?}", path.as_ref());

    // Create parent directory if it doesn't exist
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| {
                tracing::error!("Failed to create database directory: {}", e);
                e
            })?;
        }
    }

    let db = Database::create(path)?;
    init_tables(&db)?;

    tracing::info!("Database initialized successfully");

    Ok(Arc::new(db))
}

/// Create every table so that read transactions never see a missing table
pub fn init_tables(db: &Database) -> Result<()> {
    let write_txn = db.begin_write()?;
    {
        let _ = write_txn.open_table(tables::SEQUENCES)?;
        let _ = write_txn.open_table(tables::USERS)?;
        let _ = write_txn.open_table(tables::USERNAMES)?;
        let _ = write_txn.open_table(tables::EMAILS)?;
        let _ = write_txn.open_table(tables::INGREDIENTS)?;
        let _ = write_txn.open_table(tables::TAGS)?;
        let _ = write_txn.open_table(tables::RECIPES)?;
        let _ = write_txn.open_table(tables::RECIPE_INGREDIENTS)?;
        let _ = write_txn.open_table(tables::RECIPE_TAGS)?;
        let _ = write_txn.open_table(tables::FAVORITES)?;
        let _ = write_txn.open_table(tables::SHOPPING_CART)?;
        let _ = write_txn.open_table(tables::SUBSCRIPTIONS)?;
    }
    write_txn.commit()?;
    Ok(())
}

/// Read access shared by read and write transactions
///
/// Lets read-model code run both on a snapshot and inside the write
/// transaction that is about to commit.
pub trait Snapshot {
    type Reader<'a, K: Key + 'static, V: Value + 'static>: ReadableTable<K, V>
    where
        Self: 'a;

    fn table<'a, K: Key + 'static, V: Value + 'static>(
        &'a self,
        definition: TableDefinition<K, V>,
    ) -> Result<Self::Reader<'a, K, V>>;
}

impl Snapshot for ReadTransaction {
    type Reader<'a, K: Key + 'static, V: Value + 'static>
        = ReadOnlyTable<K, V>
    where
        Self: 'a;

    fn table<'a, K: Key + 'static, V: Value + 'static>(
        &'a self,
        definition: TableDefinition<K, V>,
    ) -> Result<Self::Reader<'a, K, V>> {
        Ok(self.open_table(definition)?)
    }
}

impl Snapshot for WriteTransaction {
    type Reader<'a, K: Key + 'static, V: Value + 'static>
        = Table<'a, K, V>
    where
        Self: 'a;

    fn table<'a, K: Key + 'static, V: Value + 'static>(
        &'a self,
        definition: TableDefinition<K, V>,
    ) -> Result<Self::Reader<'a, K, V>> {
        Ok(self.open_table(definition)?)
    }
}

pub fn encode<T: Serialize>(record: &T) -> Result<Vec<u8>> {
    Ok(bincode::serde::encode_to_vec(record, BINCODE_CONFIG)?)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let (record, _) = bincode::serde::decode_from_slice(bytes, BINCODE_CONFIG)?;
    Ok(record)
}

/// Allocate the next id for an entity inside the caller's write transaction
///
/// The counter update rolls back together with the rest of the transaction.
pub fn next_id(write_txn: &WriteTransaction, entity: &str) -> Result<u64> {
    let mut sequences = write_txn.open_table(tables::SEQUENCES)?;
    let current = sequences.get(entity)?.map(|v| v.value()).unwrap_or(0);
    let next = current + 1;
    sequences.insert(entity, next)?;
    Ok(next)
}

/// Read and decode a record from an id-keyed table
pub fn read_record<T: DeserializeOwned>(
    table: &impl ReadableTable<u64, &'static [u8]>,
    id: u64,
) -> Result<Option<T>> {
    match table.get(id)? {
        Some(bytes) => Ok(Some(decode(bytes.value())?)),
        None => Ok(None),
    }
}

/// Decode every record of an id-keyed table, in id order
pub fn read_all<T: DeserializeOwned>(
    table: &impl ReadableTable<u64, &'static [u8]>,
) -> Result<Vec<(u64, T)>> {
    let mut records = Vec::new();
    for entry in table.iter()? {
        let (id, bytes) = entry?;
        records.push((id.value(), decode(bytes.value())?));
    }
    Ok(records)
}

pub fn write_record<T: Serialize>(
    table: &mut Table<'_, u64, &'static [u8]>,
    id: u64,
    record: &T,
) -> Result<()> {
    let bytes = encode(record)?;
    table.insert(id, bytes.as_slice())?;
    Ok(())
}

/// Key range covering every pair whose first component is `first`
pub fn pair_prefix(first: u64) -> RangeInclusive<(u64, u64)> {
    (first, 0)..=(first, u64::MAX)
}

/// Second components of every pair that starts with `first`, in key order
pub fn pair_seconds<V: Value + 'static>(
    table: &impl ReadableTable<(u64, u64), V>,
    first: u64,
) -> Result<Vec<u64>> {
    let mut seconds = Vec::new();
    for entry in table.range(pair_prefix(first))? {
        let (key, _) = entry?;
        seconds.push(key.value().1);
    }
    Ok(seconds)
}

/// First components of every pair that ends with `second` (full scan)
pub fn pair_firsts<V: Value + 'static>(
    table: &impl ReadableTable<(u64, u64), V>,
    second: u64,
) -> Result<Vec<u64>> {
    let mut firsts = Vec::new();
    for entry in table.iter()? {
        let (key, _) = entry?;
        let (first, other) = key.value();
        if other == second {
            firsts.push(first);
        }
    }
    Ok(firsts)
}

/// Delete every pair starting with `first`; returns how many rows went away
pub fn remove_pairs_with_first<V: Value + 'static>(
    table: &mut Table<'_, (u64, u64), V>,
    first: u64,
) -> Result<usize> {
    let seconds = pair_seconds(&*table, first)?;
    for second in &seconds {
        table.remove((first, *second))?;
    }
    Ok(seconds.len())
}

/// Delete every pair ending with `second`; returns how many rows went away
pub fn remove_pairs_with_second<V: Value + 'static>(
    table: &mut Table<'_, (u64, u64), V>,
    second: u64,
) -> Result<usize> {
    let firsts = pair_firsts(&*table, second)?;
    for first in &firsts {
        table.remove((*first, second))?;
    }
    Ok(firsts.len())
}
