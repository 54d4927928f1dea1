// src/models/warehouse.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use crate::{
    common::patch::Patch,
    models::branch::{check_text_patch, validate_required_bool_patch},
};

// ---
// 1. Warehouse (O "Almacén")
// ---
#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct Warehouse {
    #[serde(rename = "id_almacen")]
    pub id: i32,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion")]
    pub description: Option<String>,
    // 'true' para o almacén principal da empresa
    #[serde(rename = "es_principal")]
    pub is_primary: bool,
    #[serde(rename = "estado")]
    pub active: bool,
    #[serde(rename = "fecha_creacion")]
    pub created_at: DateTime<Utc>,

    #[serde(skip_serializing)]
    pub company_id: i32,
}

// ---
// 2. BranchWarehouseLink (A "Ponte" Sucursal-Almacén)
// ---
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct BranchWarehouseLink {
    #[serde(rename = "sucursales_id_sucursal")]
    pub branch_id: i32,
    #[serde(rename = "almacenes_id_almacen")]
    pub warehouse_id: i32,
}

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate)]
pub struct CreateWarehousePayload {
    #[validate(
        required(code = "warehouse_name_required"),
        length(max = 70, code = "warehouse_name_length")
    )]
    pub nombre: Option<String>,

    #[validate(length(max = 300, code = "warehouse_description_length"))]
    pub descripcion: Option<String>,

    #[serde(default)]
    pub es_principal: bool,

    pub estado: Option<bool>,

    // Sucursal que o almacén atende desde a criação.
    #[validate(required(code = "branch_required"))]
    pub sucursal_id: Option<i32>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateWarehousePayload {
    #[serde(default)]
    #[validate(custom(function = "validate_warehouse_name_patch"))]
    pub nombre: Patch<String>,

    #[serde(default)]
    #[validate(custom(function = "validate_warehouse_description_patch"))]
    pub descripcion: Patch<String>,

    #[serde(default)]
    #[validate(custom(function = "validate_required_bool_patch"))]
    pub es_principal: Patch<bool>,

    #[serde(default)]
    #[validate(custom(function = "validate_required_bool_patch"))]
    pub estado: Patch<bool>,
}

#[derive(Debug, Deserialize)]
pub struct LinkBranchPayload {
    pub sucursal_id: i32,
}

#[derive(Debug, Clone)]
pub struct NewWarehouse {
    pub name: String,
    pub description: Option<String>,
    pub is_primary: bool,
    pub active: bool,
}

// Chamado depois de `validate()`, que já exige o nombre.
impl From<CreateWarehousePayload> for NewWarehouse {
    fn from(payload: CreateWarehousePayload) -> Self {
        Self {
            name: payload.nombre.unwrap_or_default(),
            description: payload.descripcion,
            is_primary: payload.es_principal,
            active: payload.estado.unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WarehouseChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub is_primary: Option<bool>,
    pub active: Option<bool>,
}

impl From<UpdateWarehousePayload> for WarehouseChanges {
    fn from(payload: UpdateWarehousePayload) -> Self {
        Self {
            name: payload.nombre.into_value(),
            description: payload.descripcion.into_nullable(),
            is_primary: payload.es_principal.into_value(),
            active: payload.estado.into_value(),
        }
    }
}

impl WarehouseChanges {
    pub fn apply_to(&self, warehouse: &mut Warehouse) {
        if let Some(name) = &self.name {
            warehouse.name = name.clone();
        }
        if let Some(description) = &self.description {
            warehouse.description = description.clone();
        }
        if let Some(is_primary) = self.is_primary {
            warehouse.is_primary = is_primary;
        }
        if let Some(active) = self.active {
            warehouse.active = active;
        }
    }
}

fn validate_warehouse_name_patch(value: &Patch<String>) -> Result<(), ValidationError> {
    check_text_patch(value, 70, false, "warehouse_name_length")
}

fn validate_warehouse_description_patch(value: &Patch<String>) -> Result<(), ValidationError> {
    check_text_patch(value, 300, true, "warehouse_description_length")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_a_branch() {
        let payload: CreateWarehousePayload =
            serde_json::from_str(r#"{"nombre": "Bodega Norte"}"#).unwrap();
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["sucursal_id"][0].code, "branch_required");
    }

    #[test]
    fn create_defaults() {
        let payload: CreateWarehousePayload =
            serde_json::from_str(r#"{"nombre": "Bodega Norte", "sucursal_id": 3}"#).unwrap();
        assert!(payload.validate().is_ok());

        let new_warehouse = NewWarehouse::from(payload);
        assert!(!new_warehouse.is_primary);
        assert!(new_warehouse.active);
    }

    #[test]
    fn update_applies_only_supplied_fields() {
        let payload: UpdateWarehousePayload =
            serde_json::from_str(r#"{"descripcion": null, "es_principal": true}"#).unwrap();
        assert!(payload.validate().is_ok());

        let mut warehouse = Warehouse {
            id: 1,
            name: "Bodega".into(),
            description: Some("Fria".into()),
            is_primary: false,
            active: true,
            created_at: Utc::now(),
            company_id: 7,
        };
        WarehouseChanges::from(payload).apply_to(&mut warehouse);

        assert_eq!(warehouse.name, "Bodega");
        assert_eq!(warehouse.description, None);
        assert!(warehouse.is_primary);
        assert_eq!(warehouse.company_id, 7);
    }

    #[test]
    fn update_rejects_description_over_the_limit() {
        let payload = UpdateWarehousePayload {
            descripcion: Patch::Value("d".repeat(301)),
            ..Default::default()
        };
        let errors = payload.validate().unwrap_err();
        assert_eq!(
            errors.field_errors()["descripcion"][0].code,
            "warehouse_description_length"
        );
    }
}
