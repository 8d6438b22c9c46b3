use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use crate::repositories::errors::table_store_errors::TableStoreError;
use crate::repositories::table_store::{Table, TableRecord, TableStore, WriteCondition};

type Rows = BTreeMap<(String, String), TableRecord>;

/// Process-local table store with the same conditional-write semantics as the
/// DynamoDB store. Used for tests and local runs.
#[derive(Default)]
pub struct InMemoryTableStore {
    tables: RwLock<HashMap<Table, Rows>>,
}

impl InMemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn check(
        condition: WriteCondition,
        current: Option<&TableRecord>,
    ) -> Result<(), TableStoreError> {
        match (condition, current) {
            (WriteCondition::NotExists, Some(_)) => Err(TableStoreError::PreconditionFailed),
            (WriteCondition::VersionMatches(expected), Some(current))
                if current.version != expected =>
            {
                Err(TableStoreError::PreconditionFailed)
            }
            (WriteCondition::VersionMatches(_), None) => Err(TableStoreError::PreconditionFailed),
            _ => Ok(()),
        }
    }

    /// Number of rows held in `table`.
    pub async fn len(&self, table: Table) -> usize {
        self.tables.read().await.get(&table).map_or(0, |rows| rows.len())
    }
}

#[async_trait]
impl TableStore for InMemoryTableStore {
    async fn get(
        &self,
        table: Table,
        partition_key: &str,
        row_key: &str,
    ) -> Result<Option<TableRecord>, TableStoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(&table)
            .and_then(|rows| rows.get(&(partition_key.to_string(), row_key.to_string())))
            .cloned())
    }

    async fn get_all(
        &self,
        table: Table,
        partition_key: &str,
    ) -> Result<Vec<TableRecord>, TableStoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(&table)
            .map(|rows| {
                rows.values()
                    .filter(|record| record.pk == partition_key)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn upsert(
        &self,
        table: Table,
        record: &TableRecord,
        condition: WriteCondition,
    ) -> Result<u64, TableStoreError> {
        let mut tables = self.tables.write().await;
        let rows = tables.entry(table).or_default();
        let key = (record.pk.clone(), record.rk.clone());

        Self::check(condition, rows.get(&key))?;

        let version = condition.next_version(record);
        rows.insert(
            key,
            TableRecord {
                version,
                ..record.clone()
            },
        );
        Ok(version)
    }

    async fn delete(
        &self,
        table: Table,
        partition_key: &str,
        row_key: &str,
        condition: WriteCondition,
    ) -> Result<(), TableStoreError> {
        let mut tables = self.tables.write().await;
        let rows = tables.entry(table).or_default();
        let key = (partition_key.to_string(), row_key.to_string());

        Self::check(condition, rows.get(&key))?;
        rows.remove(&key);
        Ok(())
    }
}
