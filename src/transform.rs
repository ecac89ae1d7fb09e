//! Record → search document mapping.
//!
//! Each record kind has a fixed field mapping. Missing optional fields fall
//! back to an empty string, zero, or `true`, and the document identifier is
//! always `{type}_{source_id}` so repeated runs overwrite the same entry.
//! Capacity, price and the active flag are copied as the source sends them;
//! only absent or null values take the default.

use serde_json::{json, Value};
use thiserror::Error;

use crate::models::{ActivityDocument, PlanDocument, RecordKind, SearchDocument, SourceRecord};

/// Per-record failure while building a document.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    #[error("{kind} record has no usable '{key}' field")]
    MissingKey { kind: RecordKind, key: &'static str },
}

/// Build the stable document identifier.
pub fn document_id(kind: RecordKind, source_id: &str) -> String {
    format!("{}_{}", kind.as_str(), source_id)
}

/// Map a source record to its search document.
pub fn to_document(kind: RecordKind, record: &SourceRecord) -> Result<SearchDocument, TransformError> {
    match kind {
        RecordKind::Activity => activity_document(record).map(SearchDocument::Activity),
        RecordKind::Plan => plan_document(record).map(SearchDocument::Plan),
    }
}

pub fn activity_document(record: &SourceRecord) -> Result<ActivityDocument, TransformError> {
    let source_id = source_id(record, &["id"]).ok_or(TransformError::MissingKey {
        kind: RecordKind::Activity,
        key: "id",
    })?;

    Ok(ActivityDocument {
        id: document_id(RecordKind::Activity, &source_id),
        titulo: text(record, "titulo"),
        descripcion: text(record, "descripcion"),
        categoria: text(record, "categoria"),
        instructor: text(record, "instructor"),
        dia: text(record, "dia"),
        horario_inicio: text(record, "horario_inicio"),
        horario_final: text(record, "horario_final"),
        cupo_disponible: passthrough(record, "lugares", json!(0)),
        sucursal_id: text(record, "sucursal_id"),
    })
}

pub fn plan_document(record: &SourceRecord) -> Result<PlanDocument, TransformError> {
    let source_id = source_id(record, &["id", "_id"]).ok_or(TransformError::MissingKey {
        kind: RecordKind::Plan,
        key: "id",
    })?;

    Ok(PlanDocument {
        id: document_id(RecordKind::Plan, &source_id),
        nombre: text(record, "nombre"),
        descripcion: text(record, "descripcion"),
        precio_mensual: passthrough(record, "precio_mensual", json!(0)),
        tipo_acceso: text(record, "tipo_acceso"),
        duracion_dias: record
            .get("duracion_dias")
            .and_then(scalar_to_string)
            .unwrap_or_else(|| "30".to_string()),
        activo: passthrough(record, "activo", json!(true)),
    })
}

/// Extract the natural key, trying `keys` in order.
///
/// Understands plain strings and numbers as well as document-store
/// extended JSON (`{"$oid": "..."}`). Empty keys count as missing.
pub fn source_id(record: &SourceRecord, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| record.get(key))
        .find_map(|value| {
            let id = match value {
                Value::Object(map) => map.get("$oid").and_then(scalar_to_string),
                other => scalar_to_string(other),
            }?;
            let id = id.trim().to_string();
            (!id.is_empty()).then_some(id)
        })
}

fn text(record: &SourceRecord, key: &str) -> String {
    record
        .get(key)
        .and_then(scalar_to_string)
        .unwrap_or_default()
}

fn passthrough(record: &SourceRecord, key: &str, default: Value) -> Value {
    record.get(key).cloned().unwrap_or(default)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> SourceRecord {
        SourceRecord::from_value(value).unwrap()
    }

    #[test]
    fn test_activity_full_mapping() {
        let doc = activity_document(&record(json!({
            "id": 7,
            "titulo": "Yoga",
            "descripcion": "Clase suave",
            "categoria": "yoga",
            "instructor": "Ana",
            "dia": "Lunes",
            "horario_inicio": "09:00",
            "horario_final": "10:00",
            "lugares": 12,
            "sucursal_id": 3
        })))
        .unwrap();

        assert_eq!(doc.id, "activity_7");
        assert_eq!(doc.titulo, "Yoga");
        assert_eq!(doc.horario_final, "10:00");
        assert_eq!(doc.cupo_disponible, json!(12));
        assert_eq!(doc.sucursal_id, "3");
    }

    #[test]
    fn test_activity_defaults() {
        let doc = activity_document(&record(json!({ "id": 1, "sucursal_id": null }))).unwrap();
        assert_eq!(doc.titulo, "");
        assert_eq!(doc.instructor, "");
        assert_eq!(doc.cupo_disponible, json!(0));
        assert_eq!(doc.sucursal_id, "");
    }

    #[test]
    fn test_plan_mapping_and_defaults() {
        let doc = plan_document(&record(json!({
            "id": "665f1c2e9b",
            "nombre": "Plan Básico",
            "precio_mensual": 15000
        })))
        .unwrap();

        assert_eq!(doc.id, "plan_665f1c2e9b");
        assert_eq!(doc.precio_mensual, json!(15000));
        assert_eq!(doc.tipo_acceso, "");
        assert_eq!(doc.duracion_dias, "30");
        assert_eq!(doc.activo, json!(true));
    }

    #[test]
    fn test_plan_duration_is_stringified() {
        let doc = plan_document(&record(json!({
            "id": "p1",
            "duracion_dias": 90,
            "activo": false
        })))
        .unwrap();
        assert_eq!(doc.duracion_dias, "90");
        assert_eq!(doc.activo, json!(false));
    }

    #[test]
    fn test_non_numeric_values_pass_through() {
        let plan = plan_document(&record(json!({
            "id": "p1",
            "precio_mensual": "15000",
            "activo": "si"
        })))
        .unwrap();
        assert_eq!(plan.precio_mensual, json!("15000"));
        assert_eq!(plan.activo, json!("si"));

        let activity = activity_document(&record(json!({ "id": 1, "lugares": "12" }))).unwrap();
        assert_eq!(activity.cupo_disponible, json!("12"));
    }

    #[test]
    fn test_plan_store_oid_is_unwrapped() {
        let doc = plan_document(&record(json!({
            "_id": { "$oid": "507f1f77bcf86cd799439011" },
            "nombre": "Plan Premium"
        })))
        .unwrap();
        assert_eq!(doc.id, "plan_507f1f77bcf86cd799439011");
    }

    #[test]
    fn test_plan_prefers_api_id_over_store_id() {
        let rec = record(json!({ "id": "api-1", "_id": "store-1" }));
        assert_eq!(source_id(&rec, &["id", "_id"]).as_deref(), Some("api-1"));
    }

    #[test]
    fn test_missing_key_is_an_error() {
        let err = activity_document(&record(json!({ "titulo": "Sin id" }))).unwrap_err();
        assert_eq!(
            err,
            TransformError::MissingKey {
                kind: RecordKind::Activity,
                key: "id"
            }
        );

        // An empty key must not produce "plan_"
        assert!(plan_document(&record(json!({ "id": "  " }))).is_err());
    }

    #[test]
    fn test_document_id_format() {
        for id in ["1", "42", "abc"] {
            assert_eq!(document_id(RecordKind::Activity, id), format!("activity_{}", id));
            assert_eq!(document_id(RecordKind::Plan, id), format!("plan_{}", id));
        }
    }

    #[test]
    fn test_to_document_dispatches_on_kind() {
        let rec = record(json!({ "id": 5, "titulo": "Spinning", "nombre": "x" }));
        let doc = to_document(RecordKind::Activity, &rec).unwrap();
        assert_eq!(doc.kind(), RecordKind::Activity);
        assert_eq!(doc.id(), "activity_5");
        assert_eq!(doc.label(), "Spinning");
    }
}
