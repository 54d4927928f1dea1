// src/models/branch.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use crate::common::patch::Patch;

// ---
// 1. Branch (A "Sucursal")
// ---
// Nomes no JSON seguem as colunas em espanhol.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct Branch {
    #[serde(rename = "id_sucursal")]
    pub id: i32,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "direccion")]
    pub address: String,
    #[serde(rename = "telefono")]
    pub phone: Option<String>,
    #[serde(rename = "estado")]
    pub active: bool,
    #[serde(rename = "fecha_creacion")]
    pub created_at: DateTime<Utc>,

    // A empresa dona nunca sai na resposta; o contexto do usuário já a define.
    #[serde(skip_serializing)]
    pub company_id: i32,
}

// ---
// 2. UserBranchLink (A "Ponte" Usuário-Sucursal)
// ---
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct UserBranchLink {
    #[serde(rename = "usuarios_id_usuario")]
    pub user_id: i32,
    #[serde(rename = "sucursales_id_sucursal")]
    pub branch_id: i32,
}

// ---
// 3. BranchUser (Projeção de `usuarios`)
// ---
// A tabela de usuários pertence a outro serviço: aqui só lemos.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct BranchUser {
    #[serde(rename = "id_usuario")]
    pub id: i32,
    #[serde(rename = "nombre")]
    pub first_name: String,
    #[serde(rename = "apellido")]
    pub last_name: String,
    pub email: String,
    #[serde(rename = "es_dueno")]
    pub is_owner: bool,
    #[serde(rename = "estado")]
    pub active: bool,
    #[serde(rename = "fecha_creacion")]
    pub created_at: DateTime<Utc>,
}

// ---
// Payloads
// ---

// Os campos dos payloads têm o nome do JSON: é assim que aparecem em `details`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBranchPayload {
    #[validate(
        required(code = "branch_name_required"),
        length(max = 50, code = "branch_name_length")
    )]
    pub nombre: Option<String>,

    #[validate(
        required(code = "branch_address_required"),
        length(max = 100, code = "branch_address_length")
    )]
    pub direccion: Option<String>,

    #[validate(length(max = 15, code = "branch_phone_length"))]
    pub telefono: Option<String>,

    pub estado: Option<bool>,

    // Aceito no payload, mas a criação não vincula o almacén.
    pub almacen_id: Option<i32>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateBranchPayload {
    #[serde(default)]
    #[validate(custom(function = "validate_branch_name_patch"))]
    pub nombre: Patch<String>,

    #[serde(default)]
    #[validate(custom(function = "validate_branch_address_patch"))]
    pub direccion: Patch<String>,

    #[serde(default)]
    #[validate(custom(function = "validate_branch_phone_patch"))]
    pub telefono: Patch<String>,

    #[serde(default)]
    #[validate(custom(function = "validate_required_bool_patch"))]
    pub estado: Patch<bool>,
}

/// Dados já validados para o INSERT.
#[derive(Debug, Clone)]
pub struct NewBranch {
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub active: bool,
}

// Chamado depois de `validate()`, que já exige nombre e direccion.
impl From<CreateBranchPayload> for NewBranch {
    fn from(payload: CreateBranchPayload) -> Self {
        Self {
            name: payload.nombre.unwrap_or_default(),
            address: payload.direccion.unwrap_or_default(),
            phone: payload.telefono,
            active: payload.estado.unwrap_or(true),
        }
    }
}

/// Alterações de um PATCH. `None` = campo não enviado.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BranchChanges {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<Option<String>>,
    pub active: Option<bool>,
}

impl From<UpdateBranchPayload> for BranchChanges {
    fn from(payload: UpdateBranchPayload) -> Self {
        Self {
            name: payload.nombre.into_value(),
            address: payload.direccion.into_value(),
            phone: payload.telefono.into_nullable(),
            active: payload.estado.into_value(),
        }
    }
}

impl BranchChanges {
    pub fn apply_to(&self, branch: &mut Branch) {
        if let Some(name) = &self.name {
            branch.name = name.clone();
        }
        if let Some(address) = &self.address {
            branch.address = address.clone();
        }
        if let Some(phone) = &self.phone {
            branch.phone = phone.clone();
        }
        if let Some(active) = self.active {
            branch.active = active;
        }
    }
}

// ---
// Validações customizadas dos campos de PATCH
// ---

/// Regra comum: `null` só é aceito em coluna anulável e o texto respeita o limite.
pub(crate) fn check_text_patch(
    value: &Patch<String>,
    max: usize,
    nullable: bool,
    code: &'static str,
) -> Result<(), ValidationError> {
    match value {
        Patch::Null if !nullable => Err(ValidationError::new("not_nullable")),
        Patch::Value(text) if text.chars().count() > max => {
            let mut err = ValidationError::new(code);
            err.add_param("max".into(), &max);
            Err(err)
        }
        _ => Ok(()),
    }
}

fn validate_branch_name_patch(value: &Patch<String>) -> Result<(), ValidationError> {
    check_text_patch(value, 50, false, "branch_name_length")
}

fn validate_branch_address_patch(value: &Patch<String>) -> Result<(), ValidationError> {
    check_text_patch(value, 100, false, "branch_address_length")
}

fn validate_branch_phone_patch(value: &Patch<String>) -> Result<(), ValidationError> {
    check_text_patch(value, 15, true, "branch_phone_length")
}

pub(crate) fn validate_required_bool_patch(value: &Patch<bool>) -> Result<(), ValidationError> {
    if value.is_null() {
        return Err(ValidationError::new("not_nullable"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_defaults_to_active() {
        let payload: CreateBranchPayload =
            serde_json::from_str(r#"{"nombre": "Centro", "direccion": "Av. 1"}"#).unwrap();
        let new_branch = NewBranch::from(payload);
        assert!(new_branch.active);
        assert_eq!(new_branch.phone, None);
    }

    #[test]
    fn create_rejects_long_fields() {
        let payload = CreateBranchPayload {
            nombre: Some("x".repeat(51)),
            direccion: Some("Av. 1".into()),
            telefono: Some("1".repeat(16)),
            estado: None,
            almacen_id: None,
        };
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        let mut names: Vec<&str> = fields.keys().map(|k| k.as_ref()).collect();
        names.sort();
        assert_eq!(names, vec!["nombre", "telefono"]);
    }

    #[test]
    fn create_requires_name_and_address() {
        let payload: CreateBranchPayload =
            serde_json::from_str(r#"{"telefono": "5551234"}"#).unwrap();
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["nombre"][0].code, "branch_name_required");
        assert_eq!(fields["direccion"][0].code, "branch_address_required");
    }

    #[test]
    fn update_rejects_null_for_required_columns() {
        let payload: UpdateBranchPayload =
            serde_json::from_str(r#"{"nombre": null, "estado": null}"#).unwrap();
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["nombre"][0].code, "not_nullable");
        assert_eq!(fields["estado"][0].code, "not_nullable");
    }

    #[test]
    fn update_allows_clearing_the_phone() {
        let payload: UpdateBranchPayload =
            serde_json::from_str(r#"{"telefono": null}"#).unwrap();
        assert!(payload.validate().is_ok());

        let changes = BranchChanges::from(payload);
        assert_eq!(changes.phone, Some(None));
        assert_eq!(changes.name, None);
    }
}
