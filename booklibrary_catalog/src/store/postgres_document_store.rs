use anyhow::Context;
use serde_json::{json, Value};
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls, Row, Statement};

use crate::api::DocumentId;
use crate::store::{
    Collection, Document, DocumentStore, Filter, FilterOp, StoreError, MAX_IN_QUERY_SIZE,
};

pub struct PostgresDocumentStore {
    client: Client,
}

#[derive(Debug, Clone)]
pub struct PostgresDocumentStoreConfig {
    pub hostname: String,
    pub username: String,
    pub password: String,
}

impl PostgresDocumentStore {
    pub async fn init(config: PostgresDocumentStoreConfig) -> anyhow::Result<Self> {
        let connection_str = format!(
            "postgresql://{}:{}@{}",
            config.username, config.password, config.hostname
        );
        tracing::info!(
            "Postgres connection to {} as {}",
            config.hostname,
            config.username
        );
        let (client, connection) = tokio_postgres::connect(&connection_str, NoTls)
            .await
            .context("Failed to start postgres")?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("Postgres connection error: {}", e);
            }
        });

        for collection in Collection::ALL {
            client
                .batch_execute(&format!(
                    "
        CREATE TABLE IF NOT EXISTS {} (
            id              SERIAL PRIMARY KEY,
            params          JSONB
            )
        ",
                    collection.table()
                ))
                .await
                .with_context(|| format!("Failed to setup {} table", collection.table()))?;
        }

        Ok(Self { client })
    }

    async fn select_documents(
        &self,
        collection: Collection,
        where_clause: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Document>, StoreError> {
        let stmt: Statement = self
            .client
            .prepare(&format!(
                "SELECT id::TEXT, params FROM {} {}",
                collection.table(),
                where_clause
            ))
            .await?;

        let rows = self.client.query(&stmt, params).await?;
        rows.iter().map(row_to_document).collect()
    }
}

fn row_to_document(row: &Row) -> Result<Document, StoreError> {
    Ok(Document {
        id: row.try_get(0)?,
        data: row.try_get(1)?,
    })
}

/// Builds `WHERE` clause for the filters, parameters are bound as (field, value) pairs
fn filters_where_clause(filters: &[Filter]) -> String {
    if filters.is_empty() {
        return String::new();
    }
    let clauses: Vec<String> = filters
        .iter()
        .enumerate()
        .map(|(i, filter)| {
            let field_param = 2 * i + 1;
            let value_param = 2 * i + 2;
            match filter.op {
                FilterOp::Equal => {
                    format!("params -> (${}::TEXT) = ${}::JSONB", field_param, value_param)
                }
                FilterOp::ArrayContains => {
                    format!("params -> (${}::TEXT) @> ${}::JSONB", field_param, value_param)
                }
            }
        })
        .collect();
    format!("WHERE {}", clauses.join(" AND "))
}

fn filter_value(filter: &Filter) -> Value {
    match filter.op {
        FilterOp::Equal => filter.value.clone(),
        FilterOp::ArrayContains => json!([filter.value]),
    }
}

#[async_trait::async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn create(
        &self,
        collection: Collection,
        record: Value,
    ) -> Result<DocumentId, StoreError> {
        let stmt: Statement = self
            .client
            .prepare(&format!(
                "INSERT INTO {} (params) VALUES ($1) RETURNING id::TEXT",
                collection.table()
            ))
            .await?;

        let rows = self.client.query(&stmt, &[&record]).await?;

        let id: DocumentId = rows
            .first()
            .ok_or_else(|| StoreError::StoreUnavailable("Id not returned".to_string()))?
            .try_get(0)?;

        Ok(id)
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Value, StoreError> {
        let stmt: Statement = self
            .client
            .prepare(&format!(
                "SELECT params FROM {} WHERE id::TEXT = ($1)",
                collection.table()
            ))
            .await?;

        let rows = self.client.query(&stmt, &[&id]).await?;

        let details: Value = rows
            .first()
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_string(),
            })?
            .try_get(0)?;

        Ok(details)
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
    ) -> Result<(), StoreError> {
        let stmt: Statement = self
            .client
            .prepare(&format!(
                "UPDATE {} SET params = params || ($1)::JSONB WHERE id::TEXT = ($2) RETURNING id",
                collection.table()
            ))
            .await?;

        let rows = self.client.query(&stmt, &[&patch, &id]).await?;
        if rows.is_empty() {
            Err(StoreError::NotFound {
                collection,
                id: id.to_string(),
            })
        } else {
            Ok(())
        }
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        let stmt: Statement = self
            .client
            .prepare(&format!(
                "DELETE FROM {} WHERE id::TEXT = ($1)",
                collection.table()
            ))
            .await?;

        self.client.execute(&stmt, &[&id]).await?;
        Ok(())
    }

    async fn list_all(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        self.select_documents(collection, "", &[]).await
    }

    async fn query(
        &self,
        collection: Collection,
        filters: &[Filter],
    ) -> Result<Vec<Document>, StoreError> {
        let fields: Vec<String> = filters.iter().map(|f| f.field.clone()).collect();
        let values: Vec<Value> = filters.iter().map(filter_value).collect();
        let params: Vec<&(dyn ToSql + Sync)> = fields
            .iter()
            .zip(values.iter())
            .flat_map(|(field, value)| {
                [field as &(dyn ToSql + Sync), value as &(dyn ToSql + Sync)]
            })
            .collect();

        self.select_documents(collection, &filters_where_clause(filters), &params)
            .await
    }

    async fn query_by_ids(
        &self,
        collection: Collection,
        ids: &[DocumentId],
    ) -> Result<Vec<Document>, StoreError> {
        if ids.len() > MAX_IN_QUERY_SIZE {
            return Err(StoreError::TooManyIds(ids.len()));
        }
        let ids = ids.to_vec();
        self.select_documents(collection, "WHERE id::TEXT = ANY($1)", &[&ids])
            .await
    }
}
