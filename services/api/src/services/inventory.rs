//! Inventory ledger service

use std::sync::Arc;

use domain::{InventoryMovement, Material, MaterialDraft};
use tracing::info;

use super::log_failure;
use crate::repositories::{MaterialStore, StoreError, StoreResult};

#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn MaterialStore>,
}

impl InventoryService {
    pub fn new(store: Arc<dyn MaterialStore>) -> Self {
        Self { store }
    }

    pub async fn create_material(&self, draft: MaterialDraft) -> StoreResult<Material> {
        let draft = draft
            .validated()
            .map_err(StoreError::from)
            .inspect_err(|e| log_failure("Material creation", e))?;

        let material = self
            .store
            .insert(&draft)
            .await
            .inspect_err(|e| log_failure("Material creation", e))?;

        info!(
            "Created material {} '{}' with {} in stock",
            material.id, material.name, material.quantity
        );
        Ok(material)
    }

    /// Replace every editable field of a material
    pub async fn update_material(&self, id: i64, draft: MaterialDraft) -> StoreResult<Material> {
        let draft = draft
            .validated()
            .map_err(StoreError::from)
            .inspect_err(|e| log_failure("Material update", e))?;

        let material = self
            .store
            .replace(id, &draft)
            .await
            .inspect_err(|e| log_failure("Material update", e))?;

        info!("Updated material {}", material.id);
        Ok(material)
    }

    /// Apply a signed stock change on behalf of `actor`
    pub async fn apply_delta(
        &self,
        material_id: i64,
        delta: i32,
        actor: Option<i64>,
    ) -> StoreResult<Material> {
        let material = self
            .store
            .apply_delta(material_id, delta, actor)
            .await
            .inspect_err(|e| log_failure("Stock change", e))?;

        info!(
            "Material {} stock changed by {:+} to {}",
            material.id, delta, material.quantity
        );
        Ok(material)
    }

    /// Orders that name the material are left alone
    pub async fn delete_material(&self, material_id: i64) -> StoreResult<()> {
        self.store
            .delete(material_id)
            .await
            .inspect_err(|e| log_failure("Material deletion", e))?;

        info!("Deleted material {}", material_id);
        Ok(())
    }

    pub async fn list_materials(&self) -> StoreResult<Vec<Material>> {
        self.store
            .list()
            .await
            .inspect_err(|e| log_failure("Material listing", e))
    }

    pub async fn list_movements(&self, material_id: i64) -> StoreResult<Vec<InventoryMovement>> {
        self.store
            .movements(material_id)
            .await
            .inspect_err(|e| log_failure("Movement listing", e))
    }
}
