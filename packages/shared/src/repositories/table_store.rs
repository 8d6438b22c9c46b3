use async_trait::async_trait;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_dynamo::aws_sdk_dynamodb_1::{from_item, to_item};
use std::collections::HashMap;

use crate::config::TableNames;
use crate::models::game_index::GamePartition;
use crate::repositories::errors::table_store_errors::TableStoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Games,
    WaitingForYou,
    WaitingForOpponent,
    Archive,
}

impl Table {
    pub fn for_partition(partition: GamePartition) -> Table {
        match partition {
            GamePartition::WaitingForYou => Table::WaitingForYou,
            GamePartition::WaitingForOpponent => Table::WaitingForOpponent,
            GamePartition::Archive => Table::Archive,
        }
    }
}

/// A single keyed row. The payload is the JSON form of the stored model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRecord {
    pub pk: String,
    pub rk: String,
    pub version: u64,
    pub payload: String,
}

impl TableRecord {
    pub fn from_value<T: Serialize>(
        partition_key: &str,
        row_key: &str,
        value: &T,
    ) -> Result<Self, TableStoreError> {
        let payload = serde_json::to_string(value)
            .map_err(|e| TableStoreError::Serialization(e.to_string()))?;
        Ok(TableRecord {
            pk: partition_key.to_string(),
            rk: row_key.to_string(),
            version: 0,
            payload,
        })
    }

    pub fn to_value<T: DeserializeOwned>(&self) -> Result<T, TableStoreError> {
        serde_json::from_str(&self.payload)
            .map_err(|e| TableStoreError::Serialization(e.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteCondition {
    Unconditional,
    NotExists,
    VersionMatches(u64),
}

impl WriteCondition {
    /// Version the record carries once the write succeeds.
    pub fn next_version(&self, record: &TableRecord) -> u64 {
        match self {
            WriteCondition::Unconditional => record.version + 1,
            WriteCondition::NotExists => 1,
            WriteCondition::VersionMatches(expected) => expected + 1,
        }
    }
}

/// Keyed table storage offering single-key operations only.
#[async_trait]
pub trait TableStore: Send + Sync {
    async fn get(
        &self,
        table: Table,
        partition_key: &str,
        row_key: &str,
    ) -> Result<Option<TableRecord>, TableStoreError>;

    async fn get_all(
        &self,
        table: Table,
        partition_key: &str,
    ) -> Result<Vec<TableRecord>, TableStoreError>;

    /// Writes `record` if `condition` holds and returns the stored version.
    async fn upsert(
        &self,
        table: Table,
        record: &TableRecord,
        condition: WriteCondition,
    ) -> Result<u64, TableStoreError>;

    /// Removes a row if `condition` holds. An unconditional delete of a
    /// missing row succeeds.
    async fn delete(
        &self,
        table: Table,
        partition_key: &str,
        row_key: &str,
        condition: WriteCondition,
    ) -> Result<(), TableStoreError>;
}

pub struct DynamoDbTableStore {
    pub client: Client,
    pub tables: TableNames,
}

impl DynamoDbTableStore {
    pub fn new(client: Client, tables: TableNames) -> Self {
        Self { client, tables }
    }

    fn table_name(&self, table: Table) -> &str {
        match table {
            Table::Games => &self.tables.games,
            Table::WaitingForYou => &self.tables.waiting_for_you,
            Table::WaitingForOpponent => &self.tables.waiting_for_opponent,
            Table::Archive => &self.tables.archive,
        }
    }

    fn decode(item: HashMap<String, AttributeValue>) -> Result<TableRecord, TableStoreError> {
        from_item(item).map_err(|e| TableStoreError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl TableStore for DynamoDbTableStore {
    async fn get(
        &self,
        table: Table,
        partition_key: &str,
        row_key: &str,
    ) -> Result<Option<TableRecord>, TableStoreError> {
        let output = self
            .client
            .get_item()
            .table_name(self.table_name(table))
            .key("pk", AttributeValue::S(partition_key.to_string()))
            .key("rk", AttributeValue::S(row_key.to_string()))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| TableStoreError::Backend(e.to_string()))?;

        output.item.map(Self::decode).transpose()
    }

    async fn get_all(
        &self,
        table: Table,
        partition_key: &str,
    ) -> Result<Vec<TableRecord>, TableStoreError> {
        let mut records = Vec::new();
        let mut start_key = None;

        loop {
            let output = self
                .client
                .query()
                .table_name(self.table_name(table))
                .key_condition_expression("pk = :pk")
                .expression_attribute_values(":pk", AttributeValue::S(partition_key.to_string()))
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .map_err(|e| TableStoreError::Backend(e.to_string()))?;

            if let Some(items) = output.items {
                for item in items {
                    records.push(Self::decode(item)?);
                }
            }

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        Ok(records)
    }

    async fn upsert(
        &self,
        table: Table,
        record: &TableRecord,
        condition: WriteCondition,
    ) -> Result<u64, TableStoreError> {
        let version = condition.next_version(record);
        let stored = TableRecord {
            version,
            ..record.clone()
        };
        let item = to_item(&stored).map_err(|e| TableStoreError::Serialization(e.to_string()))?;

        let request = self
            .client
            .put_item()
            .table_name(self.table_name(table))
            .set_item(Some(item));

        let request = match condition {
            WriteCondition::Unconditional => request,
            WriteCondition::NotExists => request.condition_expression("attribute_not_exists(pk)"),
            WriteCondition::VersionMatches(expected) => request
                .condition_expression("version = :expected")
                .expression_attribute_values(":expected", AttributeValue::N(expected.to_string())),
        };

        match request.send().await {
            Ok(_) => Ok(version),
            Err(e) => {
                if let SdkError::ServiceError(service_err) = &e {
                    if service_err.err().is_conditional_check_failed_exception() {
                        return Err(TableStoreError::PreconditionFailed);
                    }
                }
                Err(TableStoreError::Backend(e.to_string()))
            }
        }
    }

    async fn delete(
        &self,
        table: Table,
        partition_key: &str,
        row_key: &str,
        condition: WriteCondition,
    ) -> Result<(), TableStoreError> {
        let request = self
            .client
            .delete_item()
            .table_name(self.table_name(table))
            .key("pk", AttributeValue::S(partition_key.to_string()))
            .key("rk", AttributeValue::S(row_key.to_string()));

        let request = match condition {
            WriteCondition::Unconditional => request,
            WriteCondition::NotExists => request.condition_expression("attribute_not_exists(pk)"),
            WriteCondition::VersionMatches(expected) => request
                .condition_expression("version = :expected")
                .expression_attribute_values(":expected", AttributeValue::N(expected.to_string())),
        };

        match request.send().await {
            Ok(_) => Ok(()),
            Err(e) => {
                if let SdkError::ServiceError(service_err) = &e {
                    if service_err.err().is_conditional_check_failed_exception() {
                        return Err(TableStoreError::PreconditionFailed);
                    }
                }
                Err(TableStoreError::Backend(e.to_string()))
            }
        }
    }
}
