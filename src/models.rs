//! Core data models used throughout the synchronizer.
//!
//! These types represent the records read from systems of record, the
//! search documents submitted to the index, and the per-run tally.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

/// Record type, doubling as the search document `type` discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Activity,
    Plan,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Activity => "activity",
            RecordKind::Plan => "plan",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Raw record produced by a source before normalization.
///
/// Attributes vary per record type, so the record keeps the JSON object
/// as returned by the system of record.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRecord {
    pub fields: Map<String, Value>,
}

impl SourceRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Wrap a JSON value, rejecting anything that is not an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|v| !v.is_null())
    }
}

/// Activity projection submitted to the search index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityDocument {
    pub id: String,
    pub titulo: String,
    pub descripcion: String,
    pub categoria: String,
    pub instructor: String,
    pub dia: String,
    pub horario_inicio: String,
    pub horario_final: String,
    /// Passed through from `lugares` as the source sends it.
    pub cupo_disponible: Value,
    pub sucursal_id: String,
}

/// Plan projection submitted to the search index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDocument {
    pub id: String,
    pub nombre: String,
    pub descripcion: String,
    pub precio_mensual: Value,
    pub tipo_acceso: String,
    pub duracion_dias: String,
    pub activo: Value,
}

/// Normalized document submitted to the index.
///
/// Serializes flat, with the `type` discriminator next to the fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SearchDocument {
    Activity(ActivityDocument),
    Plan(PlanDocument),
}

impl SearchDocument {
    pub fn id(&self) -> &str {
        match self {
            SearchDocument::Activity(doc) => &doc.id,
            SearchDocument::Plan(doc) => &doc.id,
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            SearchDocument::Activity(_) => RecordKind::Activity,
            SearchDocument::Plan(_) => RecordKind::Plan,
        }
    }

    /// Human label for log lines (activity title or plan name).
    pub fn label(&self) -> &str {
        match self {
            SearchDocument::Activity(doc) => &doc.titulo,
            SearchDocument::Plan(doc) => &doc.nombre,
        }
    }
}

/// Per-invocation success/error counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTally {
    pub fetched: usize,
    pub indexed: usize,
    pub errors: usize,
}

impl RunTally {
    /// Fold another run into this one (used by `sync all`).
    pub fn absorb(&mut self, other: RunTally) {
        self.fetched += other.fetched;
        self.indexed += other.indexed;
        self.errors += other.errors;
    }
}

impl fmt::Display for RunTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Indexed: {}, Errors: {}", self.indexed, self.errors)
    }
}

/// Catalog entry used to create a plan through the subscriptions API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDefinition {
    pub nombre: String,
    #[serde(default)]
    pub descripcion: String,
    /// Kept as written in the catalog, so whole prices stay integers.
    pub precio_mensual: Number,
    pub tipo_acceso: String,
    #[serde(default = "default_duracion_dias")]
    pub duracion_dias: u32,
    #[serde(default = "default_activo")]
    pub activo: bool,
    #[serde(default)]
    pub actividades_permitidas: Vec<String>,
}

fn default_duracion_dias() -> u32 {
    30
}

fn default_activo() -> bool {
    true
}
