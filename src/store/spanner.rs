use anyhow::{Context, Result};
use gcloud_gax::grpc::Code;
use gcloud_googleapis::spanner::admin::database::v1::{
    CreateDatabaseRequest, GetDatabaseDdlRequest, GetDatabaseRequest, UpdateDatabaseDdlRequest,
};
use gcloud_googleapis::spanner::admin::instance::v1::{
    CreateInstanceRequest, GetInstanceRequest, Instance,
};
use gcloud_spanner::admin::client::Client as AdminClient;
use gcloud_spanner::admin::AdminClientConfig;
use gcloud_spanner::client::{Client, ClientConfig, Error as SpannerError};
use gcloud_spanner::key::Key;
use gcloud_spanner::mutation::{delete, insert, update};
use gcloud_spanner::row::Row;
use gcloud_spanner::statement::{Statement, ToKind};
use std::sync::Arc;

use super::{ItemStore, StoreError};
use crate::config::{Config, DatabaseUrl};
use crate::models::{Item, ItemPatch};

const TABLE: &str = "items";
const COLUMNS: [&str; 3] = ["id", "name", "price"];

/// Item store backed by a Cloud Spanner table
#[derive(Clone)]
pub struct SpannerStore {
    inner: Arc<Client>,
}

impl SpannerStore {
    /// Connect to the database named by `url`.
    ///
    /// The instance, database and `items` table are created first if they
    /// don't exist. `ClientConfig::default()` picks up `SPANNER_EMULATOR_HOST`
    /// on its own.
    pub async fn connect(url: &DatabaseUrl, config: &Config) -> Result<Self> {
        auto_provision(url, config).await?;

        let database_path = url.database_path();

        match &config.spanner_emulator_host {
            Some(host) => tracing::info!("Connecting to Spanner emulator at: {}", host),
            None => tracing::info!("Connecting to production Spanner"),
        }

        let client = Client::new(&database_path, ClientConfig::default())
            .await
            .context("Failed to create Spanner client")?;

        tracing::info!(
            "Successfully connected to Spanner database: {}",
            database_path
        );

        Ok(Self {
            inner: Arc::new(client),
        })
    }

    async fn query_items(&self, statement: Statement) -> Result<Vec<Item>> {
        let mut tx = self
            .inner
            .single()
            .await
            .context("Failed to create read transaction")?;

        let mut result_set = tx
            .query(statement)
            .await
            .context("Failed to query items from Spanner")?;

        let mut items = Vec::new();
        while let Some(row) = result_set
            .next()
            .await
            .context("Failed to read row from Spanner")?
        {
            items.push(item_from_row(&row)?);
        }
        Ok(items)
    }

    async fn query_one(&self, statement: Statement) -> Result<Option<Item>> {
        Ok(self.query_items(statement).await?.into_iter().next())
    }

    async fn next_id(&self) -> Result<i64> {
        let statement = Statement::new("SELECT COALESCE(MAX(id), 0) + 1 AS next_id FROM items");

        let mut tx = self
            .inner
            .single()
            .await
            .context("Failed to create read transaction for next id")?;

        let mut result_set = tx
            .query(statement)
            .await
            .context("Failed to query next item id")?;

        match result_set
            .next()
            .await
            .context("Failed to read next item id")?
        {
            Some(row) => row
                .column_by_name::<i64>("next_id")
                .context("Failed to decode next item id"),
            None => Ok(1),
        }
    }
}

fn item_from_row(row: &Row) -> Result<Item> {
    Ok(Item {
        id: row.column_by_name("id").context("Failed to decode id")?,
        name: row.column_by_name("name").context("Failed to decode name")?,
        price: row.column_by_name("price").context("Failed to decode price")?,
    })
}

fn is_status(err: &SpannerError, code: Code) -> bool {
    matches!(err, SpannerError::GRPC(status) if status.code() == code)
}

impl ItemStore for SpannerStore {
    /// Read every row ordered by primary key
    async fn list(&self) -> Result<Vec<Item>, StoreError> {
        let statement = Statement::new("SELECT id, name, price FROM items ORDER BY id ASC");
        let items = self.query_items(statement).await?;

        tracing::debug!("Listed {} items", items.len());
        Ok(items)
    }

    async fn get(&self, id: i64) -> Result<Option<Item>, StoreError> {
        let mut statement = Statement::new("SELECT id, name, price FROM items WHERE id = @id");
        statement.add_param("id", &id);

        let item = self.query_one(statement).await?;
        match &item {
            Some(_) => tracing::debug!("Read item with id: {}", id),
            None => tracing::debug!("Item not found with id: {}", id),
        }
        Ok(item)
    }

    /// Read the row at `index` with `LIMIT 1 OFFSET @offset`
    ///
    /// Negative indexes are rejected before reaching Spanner, which would
    /// otherwise fail the query with `INVALID_ARGUMENT`.
    async fn get_by_index(&self, index: i64) -> Result<Item, StoreError> {
        if index < 0 {
            return Err(StoreError::IndexOutOfRange(index));
        }

        let mut statement = Statement::new(
            "SELECT id, name, price FROM items ORDER BY id ASC LIMIT 1 OFFSET @offset",
        );
        statement.add_param("offset", &index);

        self.query_one(statement)
            .await?
            .ok_or(StoreError::IndexOutOfRange(index))
    }

    /// Insert a row with an `insert` mutation
    ///
    /// An `insert` fails with `ALREADY_EXISTS` on a taken key, which maps to
    /// `StoreError::AlreadyExists`. Without an explicit id the next id is read
    /// first, so two concurrent creates can race; the loser gets `AlreadyExists`.
    async fn create(&self, id: Option<i64>, name: String, price: f64) -> Result<Item, StoreError> {
        let id = match id {
            Some(id) => id,
            None => self.next_id().await?,
        };

        let mutation = insert(TABLE, &COLUMNS, &[&id, &name, &price]);

        match self.inner.apply(vec![mutation]).await {
            Ok(_) => {
                tracing::debug!("Inserted item with id: {}", id);
                Ok(Item { id, name, price })
            }
            Err(err) if is_status(&err, Code::AlreadyExists) => Err(StoreError::AlreadyExists(id)),
            Err(err) => Err(anyhow::Error::new(err)
                .context("Failed to insert item into Spanner")
                .into()),
        }
    }

    /// Overwrite `name` and `price` with an `update` mutation, which fails
    /// with `NOT_FOUND` on a missing key
    async fn update(&self, id: i64, name: String, price: f64) -> Result<Item, StoreError> {
        let mutation = update(TABLE, &COLUMNS, &[&id, &name, &price]);

        match self.inner.apply(vec![mutation]).await {
            Ok(_) => {
                tracing::debug!("Updated item with id: {}", id);
                Ok(Item { id, name, price })
            }
            Err(err) if is_status(&err, Code::NotFound) => Err(StoreError::NotFound(id)),
            Err(err) => Err(anyhow::Error::new(err)
                .context("Failed to update item in Spanner")
                .into()),
        }
    }

    /// Write only the supplied columns, then read the row back
    ///
    /// # Arguments
    /// * `id` - Primary key of the row
    /// * `patch` - Columns to overwrite
    ///
    /// # Errors
    /// Returns `StoreError::NotFound` if the row doesn't exist, or
    /// `StoreError::Backend` if the mutation or read fails
    async fn patch(&self, id: i64, patch: ItemPatch) -> Result<Item, StoreError> {
        if !patch.is_empty() {
            // `&dyn ToKind` isn't Send, so the values must not outlive the mutation
            let mutation = {
                let mut columns: Vec<&str> = vec!["id"];
                let mut values: Vec<&dyn ToKind> = vec![&id];
                if let Some(name) = &patch.name {
                    columns.push("name");
                    values.push(name);
                }
                if let Some(price) = &patch.price {
                    columns.push("price");
                    values.push(price);
                }
                update(TABLE, &columns, &values)
            };

            match self.inner.apply(vec![mutation]).await {
                Ok(_) => tracing::debug!("Patched item with id: {}", id),
                Err(err) if is_status(&err, Code::NotFound) => {
                    return Err(StoreError::NotFound(id));
                }
                Err(err) => {
                    return Err(anyhow::Error::new(err)
                        .context("Failed to patch item in Spanner")
                        .into());
                }
            }
        }

        self.get(id).await?.ok_or(StoreError::NotFound(id))
    }

    async fn patch_at_index(&self, index: i64, patch: ItemPatch) -> Result<Item, StoreError> {
        let target = self.get_by_index(index).await?;

        // The row may be deleted between the two calls
        match self.patch(target.id, patch).await {
            Err(StoreError::NotFound(_)) => Err(StoreError::IndexOutOfRange(index)),
            result => result,
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        // Delete mutations succeed on missing keys, so existence is checked first.
        if self.get(id).await?.is_none() {
            return Ok(false);
        }

        let mutation = delete(TABLE, Key::new(&id));
        self.inner
            .apply(vec![mutation])
            .await
            .context("Failed to delete item from Spanner")?;

        tracing::debug!("Deleted item with id: {}", id);
        Ok(true)
    }

    /// Executes `SELECT 1` to verify the database is reachable
    async fn health_check(&self) -> Result<(), StoreError> {
        let statement = Statement::new("SELECT 1");

        let mut tx = self
            .inner
            .single()
            .await
            .context("Failed to create health check transaction")?;

        let mut result_set = tx
            .query(statement)
            .await
            .context("Failed to execute health check query")?;

        if result_set
            .next()
            .await
            .context("Failed to read health check result")?
            .is_some()
        {
            tracing::debug!("Health check query succeeded");
            Ok(())
        } else {
            Err(anyhow::anyhow!("Health check query returned no results").into())
        }
    }
}

/// Automatically provision Spanner instance, database, and table
///
/// Each resource is checked first and only created when missing, so connecting
/// to an existing database is a no-op apart from the lookups.
async fn auto_provision(url: &DatabaseUrl, config: &Config) -> Result<()> {
    tracing::info!("Starting auto-provisioning checks...");

    let admin_client = AdminClient::new(AdminClientConfig::default())
        .await
        .context("Failed to create Spanner admin client")?;

    ensure_instance_exists(&admin_client, url, config).await?;
    ensure_database_exists(&admin_client, url).await?;
    ensure_table_exists(&admin_client, &url.database_path()).await?;

    tracing::info!("Auto-provisioning complete");
    Ok(())
}

/// Ensure the Spanner instance exists, creating it if necessary
///
/// The emulator only accepts `emulator-config`; production instances get a
/// single-node regional config.
async fn ensure_instance_exists(
    admin_client: &AdminClient,
    url: &DatabaseUrl,
    config: &Config,
) -> Result<()> {
    let project_path = url.project_path();
    let instance_path = url.instance_path();

    let get_request = GetInstanceRequest {
        name: instance_path.clone(),
        field_mask: None,
    };

    match admin_client.instance().get_instance(get_request, None).await {
        Ok(_) => {
            tracing::info!("Instance already exists: {}", instance_path);
            Ok(())
        }
        Err(status) if status.code() == Code::NotFound => {
            tracing::info!("Instance not found, creating: {}", instance_path);

            let instance_config = if config.spanner_emulator_host.is_some() {
                format!("{}/instanceConfigs/emulator-config", project_path)
            } else {
                format!("{}/instanceConfigs/regional-us-central1", project_path)
            };

            let create_request = CreateInstanceRequest {
                parent: project_path,
                instance_id: url.instance.clone(),
                instance: Some(Instance {
                    name: instance_path.clone(),
                    config: instance_config,
                    display_name: format!("{} instance", url.instance),
                    node_count: 1,
                    ..Default::default()
                }),
            };

            let mut operation = admin_client
                .instance()
                .create_instance(create_request, None)
                .await
                .context("Failed to start instance creation")?;

            operation
                .wait(None)
                .await
                .context("Failed to create instance")?;

            tracing::info!("Instance created successfully: {}", instance_path);
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!(
            "Failed to check instance existence: {}",
            e.message()
        )),
    }
}

/// Ensure the Spanner database exists, creating it if necessary
async fn ensure_database_exists(admin_client: &AdminClient, url: &DatabaseUrl) -> Result<()> {
    let database_path = url.database_path();

    let get_request = GetDatabaseRequest {
        name: database_path.clone(),
    };

    match admin_client
        .database()
        .get_database(get_request, None)
        .await
    {
        Ok(_) => {
            tracing::info!("Database already exists: {}", database_path);
            Ok(())
        }
        Err(status) if status.code() == Code::NotFound => {
            tracing::info!("Database not found, creating: {}", database_path);

            let create_request = CreateDatabaseRequest {
                parent: url.instance_path(),
                create_statement: format!("CREATE DATABASE `{}`", url.database),
                extra_statements: vec![],
                encryption_config: None,
                database_dialect: 1, // Google Standard SQL
                proto_descriptors: vec![],
            };

            let mut operation = admin_client
                .database()
                .create_database(create_request, None)
                .await
                .context("Failed to start database creation")?;

            operation
                .wait(None)
                .await
                .context("Failed to create database")?;

            tracing::info!("Database created successfully: {}", database_path);
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!(
            "Failed to check database existence: {}",
            e.message()
        )),
    }
}

/// Ensure the items table exists, creating it if necessary
async fn ensure_table_exists(admin_client: &AdminClient, database_path: &str) -> Result<()> {
    let get_ddl_request = GetDatabaseDdlRequest {
        database: database_path.to_string(),
    };

    let ddl_response = admin_client
        .database()
        .get_database_ddl(get_ddl_request, None)
        .await
        .context("Failed to get database DDL")?;

    let table_exists = ddl_response
        .into_inner()
        .statements
        .iter()
        .any(|stmt| stmt.contains("CREATE TABLE items") || stmt.contains("CREATE TABLE `items`"));

    if table_exists {
        tracing::info!("Table 'items' already exists");
        return Ok(());
    }

    tracing::info!("Table 'items' not found, creating...");

    let create_table_ddl = r#"
CREATE TABLE items (
    id INT64 NOT NULL,
    name STRING(MAX) NOT NULL,
    price FLOAT64 NOT NULL,
) PRIMARY KEY (id)
"#
    .trim()
    .to_string();

    let update_request = UpdateDatabaseDdlRequest {
        database: database_path.to_string(),
        statements: vec![create_table_ddl],
        operation_id: String::new(),
        proto_descriptors: vec![],
        throughput_mode: false,
    };

    let mut operation = admin_client
        .database()
        .update_database_ddl(update_request, None)
        .await
        .context("Failed to start table creation")?;

    operation
        .wait(None)
        .await
        .context("Failed to create table")?;

    tracing::info!("Table 'items' created successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Connect to a fresh-ish database on the local emulator, or `None` when it isn't running
    async fn emulator_store(instance: &str) -> Option<SpannerStore> {
        unsafe {
            std::env::set_var("SPANNER_EMULATOR_HOST", "localhost:9010");
        }

        let url: DatabaseUrl = format!(
            "projects/test-project/instances/{}/databases/{}-db",
            instance, instance
        )
        .parse()
        .unwrap();
        let config = Config {
            database_url: Some(url.clone()),
            spanner_emulator_host: Some("localhost:9010".to_string()),
            ..Config::default()
        };

        let store = SpannerStore::connect(&url, &config).await;

        unsafe {
            std::env::remove_var("SPANNER_EMULATOR_HOST");
        }

        match store {
            Ok(store) => {
                // Leftovers from earlier runs against the same emulator
                for item in store.list().await.unwrap() {
                    store.delete(item.id).await.unwrap();
                }
                Some(store)
            }
            Err(e) => {
                println!("Spanner test skipped (emulator may not be running): {}", e);
                None
            }
        }
    }

    #[test]
    fn test_store_is_clonable() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<SpannerStore>();
    }

    #[test]
    fn test_store_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SpannerStore>();
    }

    #[tokio::test]
    async fn test_create_get_and_conflict() {
        let Some(store) = emulator_store("crud-test-instance").await else {
            return;
        };

        let created = store.create(None, "Apple".to_string(), 1.99).await.unwrap();
        assert_eq!(created.id, 1);

        let fetched = store.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);

        let duplicate = store.create(Some(created.id), "Other".to_string(), 5.0).await;
        assert!(matches!(duplicate, Err(StoreError::AlreadyExists(1))));

        assert!(store.get(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_patch_delete() {
        let Some(store) = emulator_store("mutate-test-instance").await else {
            return;
        };

        store.create(Some(10), "Pear".to_string(), 2.0).await.unwrap();

        let updated = store.update(10, "Plum".to_string(), 3.0).await.unwrap();
        assert_eq!(updated.name, "Plum");

        let patched = store
            .patch(10, ItemPatch { name: None, price: Some(4.5) })
            .await
            .unwrap();
        assert_eq!(patched.name, "Plum");
        assert_eq!(patched.price, 4.5);

        assert!(matches!(
            store.update(11, "Nope".to_string(), 0.0).await,
            Err(StoreError::NotFound(11))
        ));

        assert!(store.delete(10).await.unwrap());
        assert!(!store.delete(10).await.unwrap());
        assert!(!store.delete(999).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_and_index_order() {
        let Some(store) = emulator_store("order-test-instance").await else {
            return;
        };

        for id in [30, 10, 20] {
            store.create(Some(id), format!("item-{}", id), 1.0).await.unwrap();
        }

        let ids: Vec<i64> = store.list().await.unwrap().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![10, 20, 30]);

        assert_eq!(store.get_by_index(0).await.unwrap().id, 10);
        assert!(matches!(
            store.get_by_index(3).await,
            Err(StoreError::IndexOutOfRange(3))
        ));
        assert!(matches!(
            store.get_by_index(-1).await,
            Err(StoreError::IndexOutOfRange(-1))
        ));

        let patched = store
            .patch_at_index(2, ItemPatch { name: Some("Last".to_string()), price: None })
            .await
            .unwrap();
        assert_eq!(patched.id, 30);
        assert_eq!(patched.name, "Last");
        assert!(matches!(
            store.patch_at_index(3, ItemPatch::default()).await,
            Err(StoreError::IndexOutOfRange(3))
        ));
    }
}
