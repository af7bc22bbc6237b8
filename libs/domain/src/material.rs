//! Materials and the inventory ledger

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult, required};

/// A stocked material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: i64,
    pub name: String,
    pub size: String,
    pub color: String,
    pub quantity: i32,
    pub material_type: String,
    pub image_url: String,
    /// Weak reference; may point at a deleted section
    pub section_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Material {
    /// Apply a signed stock change.
    ///
    /// The material is left untouched when the change is rejected.
    pub fn apply_delta(&mut self, delta: i32) -> DomainResult<()> {
        if delta == 0 {
            return Err(DomainError::validation("Quantity change must not be zero"));
        }

        let next = self
            .quantity
            .checked_add(delta)
            .ok_or_else(|| DomainError::validation("Quantity change is out of range"))?;

        if next < 0 {
            return Err(DomainError::InsufficientStock {
                material_id: self.id,
                available: i64::from(self.quantity),
                requested: -i64::from(delta),
            });
        }

        self.quantity = next;
        Ok(())
    }

    /// Overwrite the editable fields with an already validated draft
    pub fn replace_with(&mut self, draft: &MaterialDraft) {
        self.name = draft.name.clone();
        self.size = draft.size.clone();
        self.color = draft.color.clone();
        self.quantity = draft.quantity;
        self.material_type = draft.material_type.clone();
        self.image_url = draft.image_url.clone();
        self.section_id = draft.section_id;
    }
}

/// Editable fields of a material, used for both create and full update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default)]
    pub material_type: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub section_id: Option<i64>,
}

impl MaterialDraft {
    /// Normalize the draft, rejecting a blank name or negative stock
    pub fn validated(self) -> DomainResult<Self> {
        let name = required("Material name", &self.name)?;
        if self.quantity < 0 {
            return Err(DomainError::validation("Quantity must not be negative"));
        }

        Ok(Self {
            name,
            size: self.size.trim().to_string(),
            color: self.color.trim().to_string(),
            material_type: self.material_type.trim().to_string(),
            image_url: self.image_url.trim().to_string(),
            ..self
        })
    }
}

/// One accepted stock change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryMovement {
    pub id: i64,
    pub material_id: i64,
    pub quantity_change: i32,
    pub updated_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn material(quantity: i32) -> Material {
        let now = Utc::now();
        Material {
            id: 7,
            name: "Steel sheet".to_string(),
            size: "2x1".to_string(),
            color: "grey".to_string(),
            quantity,
            material_type: "metal".to_string(),
            image_url: String::new(),
            section_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn deduction_to_exactly_zero_is_allowed() {
        let mut m = material(10);
        m.apply_delta(-10).unwrap();
        assert_eq!(m.quantity, 0);
    }

    #[test]
    fn deduction_below_zero_is_insufficient_stock() {
        let mut m = material(10);
        let err = m.apply_delta(-15).unwrap_err();
        assert_eq!(
            err,
            DomainError::InsufficientStock {
                material_id: 7,
                available: 10,
                requested: 15
            }
        );
        assert_eq!(m.quantity, 10);
    }

    #[test]
    fn zero_delta_is_rejected() {
        let mut m = material(3);
        assert!(matches!(m.apply_delta(0), Err(DomainError::Validation(_))));
    }

    #[test]
    fn overflow_is_a_validation_error() {
        let mut m = material(i32::MAX);
        assert!(matches!(m.apply_delta(1), Err(DomainError::Validation(_))));
        assert_eq!(m.quantity, i32::MAX);
    }

    #[test]
    fn most_negative_delta_reports_magnitude() {
        let mut m = material(0);
        match m.apply_delta(i32::MIN) {
            Err(DomainError::InsufficientStock { requested, .. }) => {
                assert_eq!(requested, 2_147_483_648)
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn draft_validation() {
        let blank = MaterialDraft {
            name: "  ".to_string(),
            ..Default::default()
        };
        assert!(blank.validated().is_err());

        let negative = MaterialDraft {
            name: "Bolt".to_string(),
            quantity: -1,
            ..Default::default()
        };
        assert!(negative.validated().is_err());

        let ok = MaterialDraft {
            name: " Bolt ".to_string(),
            color: " red".to_string(),
            quantity: 4,
            section_id: Some(2),
            ..Default::default()
        }
        .validated()
        .unwrap();
        assert_eq!(ok.name, "Bolt");
        assert_eq!(ok.color, "red");
        assert_eq!(ok.section_id, Some(2));
    }

    #[test]
    fn replace_keeps_identity() {
        let mut m = material(1);
        let draft = MaterialDraft {
            name: "Copper".to_string(),
            quantity: 9,
            ..Default::default()
        };
        m.replace_with(&draft);
        assert_eq!(m.id, 7);
        assert_eq!(m.name, "Copper");
        assert_eq!(m.quantity, 9);
        assert_eq!(m.color, "");
    }
}
