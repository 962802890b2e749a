//! Boundary to the CRM itself.
//!
//! The converters never talk to the CRM; workflow steps do, through [`CrmService`]. Live
//! connectivity lives outside this crate. [`InMemoryService`] backs tests and dry runs.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::value::{EntityReference, NativeValue, NativeValues};

/// One CRM record in native form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub logical_name: String,
    pub id: Uuid,
    #[serde(default)]
    pub attributes: NativeValues,
}

impl Entity {
    pub fn new(logical_name: impl Into<String>, id: Uuid) -> Self {
        Self {
            logical_name: logical_name.into(),
            id,
            attributes: NativeValues::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: NativeValues) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: NativeValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }
}

/// Which attributes a retrieve returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ColumnSet {
    #[default]
    All,
    Columns(Vec<String>),
}

impl ColumnSet {
    pub fn includes(&self, attribute: &str) -> bool {
        match self {
            ColumnSet::All => true,
            ColumnSet::Columns(columns) => columns.iter().any(|column| column == attribute),
        }
    }
}

#[async_trait]
pub trait CrmService: Send + Sync {
    /// Every record of `entity_name`.
    async fn retrieve_multiple(&self, entity_name: &str, columns: &ColumnSet) -> Result<Vec<Entity>, ServiceError>;

    /// Creates a record and returns its id. A nil id asks the service to assign one.
    async fn create(&self, entity: Entity) -> Result<Uuid, ServiceError>;

    /// Writes the supplied attributes; attributes absent from `entity` keep their values.
    async fn update(&self, entity: Entity) -> Result<(), ServiceError>;

    async fn delete(&self, reference: &EntityReference) -> Result<(), ServiceError>;
}

type Store = HashMap<String, Vec<Entity>>;

/// Process-local [`CrmService`]. Records keep creation order per entity.
#[derive(Debug, Clone, Default)]
pub struct InMemoryService {
    records: Arc<RwLock<Store>>,
}

impl InMemoryService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `entity` as-is, replacing any record with the same id.
    pub async fn seed(&self, entity: Entity) {
        let mut store = self.records.write().await;
        let records = store.entry(entity.logical_name.clone()).or_default();
        match records.iter_mut().find(|existing| existing.id == entity.id) {
            Some(existing) => *existing = entity,
            None => records.push(entity),
        }
    }

    pub async fn get(&self, reference: &EntityReference) -> Option<Entity> {
        let store = self.records.read().await;
        store
            .get(&reference.logical_name)?
            .iter()
            .find(|entity| entity.id == reference.id)
            .cloned()
    }

    pub async fn count(&self, entity_name: &str) -> usize {
        let store = self.records.read().await;
        store.get(entity_name).map_or(0, Vec::len)
    }
}

#[async_trait]
impl CrmService for InMemoryService {
    async fn retrieve_multiple(&self, entity_name: &str, columns: &ColumnSet) -> Result<Vec<Entity>, ServiceError> {
        let store = self.records.read().await;
        let Some(records) = store.get(entity_name) else {
            return Ok(Vec::new());
        };
        Ok(records
            .iter()
            .map(|entity| Entity {
                logical_name: entity.logical_name.clone(),
                id: entity.id,
                attributes: entity
                    .attributes
                    .iter()
                    .filter(|(name, _)| columns.includes(name))
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect(),
            })
            .collect())
    }

    async fn create(&self, mut entity: Entity) -> Result<Uuid, ServiceError> {
        if entity.logical_name.is_empty() {
            return Err(ServiceError::Rejected {
                message: "entity logical name is required".to_string(),
            });
        }
        if entity.id.is_nil() {
            entity.id = Uuid::new_v4();
        }

        let mut store = self.records.write().await;
        let records = store.entry(entity.logical_name.clone()).or_default();
        if records.iter().any(|existing| existing.id == entity.id) {
            return Err(ServiceError::Rejected {
                message: format!("{} record '{}' already exists", entity.logical_name, entity.id),
            });
        }
        let id = entity.id;
        records.push(entity);
        Ok(id)
    }

    async fn update(&self, entity: Entity) -> Result<(), ServiceError> {
        let mut store = self.records.write().await;
        let existing = store
            .get_mut(&entity.logical_name)
            .and_then(|records| records.iter_mut().find(|existing| existing.id == entity.id))
            .ok_or_else(|| ServiceError::NotFound {
                entity: entity.logical_name.clone(),
                id: entity.id.to_string(),
            })?;
        for (name, value) in entity.attributes {
            existing.attributes.insert(name, value);
        }
        Ok(())
    }

    async fn delete(&self, reference: &EntityReference) -> Result<(), ServiceError> {
        let mut store = self.records.write().await;
        let not_found = || ServiceError::NotFound {
            entity: reference.logical_name.clone(),
            id: reference.id.to_string(),
        };
        let records = store.get_mut(&reference.logical_name).ok_or_else(not_found)?;
        let position = records
            .iter()
            .position(|entity| entity.id == reference.id)
            .ok_or_else(not_found)?;
        records.remove(position);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(name: &str) -> Entity {
        Entity::new("account", Uuid::nil()).with_attribute("name", NativeValue::string(name))
    }

    #[tokio::test]
    async fn create_assigns_id_and_retrieve_returns_it() {
        let service = InMemoryService::new();
        let id = service.create(account("Contoso")).await.expect("created");
        assert!(!id.is_nil());

        let records = service.retrieve_multiple("account", &ColumnSet::All).await.expect("retrieved");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, id);
        assert_eq!(records[0].attributes["name"], NativeValue::string("Contoso"));

        assert!(service.retrieve_multiple("contact", &ColumnSet::All).await.expect("retrieved").is_empty());
    }

    #[tokio::test]
    async fn column_set_filters_attributes() {
        let service = InMemoryService::new();
        let entity = account("Contoso").with_attribute("revenue", NativeValue::Money(10.into()));
        service.create(entity).await.expect("created");

        let records = service
            .retrieve_multiple("account", &ColumnSet::Columns(vec!["revenue".to_string()]))
            .await
            .expect("retrieved");
        assert_eq!(records[0].attributes.len(), 1);
        assert!(records[0].attributes.contains_key("revenue"));
    }

    #[tokio::test]
    async fn update_merges_supplied_attributes() {
        let service = InMemoryService::new();
        let entity = account("Contoso").with_attribute("telephone1", NativeValue::string("555"));
        let id = service.create(entity).await.expect("created");

        let patch = Entity::new("account", id)
            .with_attribute("name", NativeValue::string("Fabrikam"))
            .with_attribute("fax", NativeValue::Null);
        service.update(patch).await.expect("updated");

        let stored = service.get(&EntityReference::new("account", id)).await.expect("present");
        assert_eq!(stored.attributes["name"], NativeValue::string("Fabrikam"));
        assert_eq!(stored.attributes["telephone1"], NativeValue::string("555"));
        assert_eq!(stored.attributes["fax"], NativeValue::Null);
    }

    #[tokio::test]
    async fn update_and_delete_of_missing_record_fail() {
        let service = InMemoryService::new();
        let missing = EntityReference::new("account", Uuid::new_v4());

        let err = service.update(Entity::new("account", missing.id)).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));

        let err = service.delete(&missing).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let service = InMemoryService::new();
        let id = service.create(account("Contoso")).await.expect("created");
        service.delete(&EntityReference::new("account", id)).await.expect("deleted");
        assert_eq!(service.count("account").await, 0);
    }

    #[tokio::test]
    async fn duplicate_id_is_rejected() {
        let service = InMemoryService::new();
        let id = Uuid::new_v4();
        service.create(Entity::new("account", id)).await.expect("created");
        let err = service.create(Entity::new("account", id)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Rejected { .. }));
    }
}
