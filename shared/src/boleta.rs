//! Boleta normalization.
//!
//! The backend (and the sheet behind it) has used several spellings for the
//! same columns over time. Records are mapped once, here, into [`Boleta`];
//! nothing downstream reads alias keys.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const ID_KEYS: &[&str] = &["id", "ID", "Id", "id_boleta", "boleta_id", "idBoleta", "folio", "Folio", "numero", "Numero"];
const TOTAL_KEYS: &[&str] = &["total", "Total", "TOTAL", "monto", "Monto", "monto_total", "montoTotal", "total_boleta", "valor"];
const FECHA_KEYS: &[&str] = &["fecha", "Fecha", "FECHA", "fecha_emision", "fechaEmision", "fecha_boleta", "date", "created_at"];
const CLIENTE_KEYS: &[&str] = &["cliente", "Cliente", "nombre_cliente", "razon_social", "razonSocial", "rut_cliente", "rut"];
const ESTADO_KEYS: &[&str] = &["estado", "Estado", "status", "estado_factura"];

/// Canonical receipt as consumed by the store and its readers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Boleta {
    pub id: Option<String>,
    pub total: Option<f64>,
    pub fecha: Option<String>,
    pub cliente: Option<String>,
    pub estado: Option<String>,
    /// Original record, untouched.
    pub raw: Map<String, Value>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ListShapeError {
    #[error("expected a JSON array or an object with an `items` array, got {0}")]
    UnexpectedShape(&'static str),
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn first_present<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find(|value| match value {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            _ => true,
        })
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn is_grouped_thousands(s: &str, sep: char) -> bool {
    let unsigned = s.trim_start_matches('-');
    let mut parts = unsigned.split(sep);
    let head = parts.next().unwrap_or_default();
    let tail: Vec<&str> = parts.collect();
    !tail.is_empty()
        && (1..=3).contains(&head.len())
        && tail.iter().all(|group| group.len() == 3)
}

/// Parses amounts such as `12990`, `"$ 12.990"`, `"1.234,50"` or `"1,234.50"`.
/// A lone separator followed by exactly three digits is read as a thousands
/// separator (`"12.990"` is 12990).
pub fn parse_amount(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
                .collect();
            if cleaned.is_empty() {
                return None;
            }

            let normalized = match (cleaned.rfind('.'), cleaned.rfind(',')) {
                (Some(dot), Some(comma)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
                (Some(_), Some(_)) => cleaned.replace(',', ""),
                (Some(_), None) if is_grouped_thousands(&cleaned, '.') => cleaned.replace('.', ""),
                (None, Some(_)) if is_grouped_thousands(&cleaned, ',') => cleaned.replace(',', ""),
                (None, Some(_)) => cleaned.replace(',', "."),
                _ => cleaned,
            };
            normalized.parse().ok()
        }
        _ => None,
    }
}

/// Maps one backend record to a [`Boleta`]. Non-object entries yield `None`.
pub fn normalize_boleta(value: Value) -> Option<Boleta> {
    let Value::Object(record) = value else {
        return None;
    };

    Some(Boleta {
        id: first_present(&record, ID_KEYS).and_then(scalar_to_string),
        total: first_present(&record, TOTAL_KEYS).and_then(parse_amount),
        fecha: first_present(&record, FECHA_KEYS).and_then(scalar_to_string),
        cliente: first_present(&record, CLIENTE_KEYS).and_then(scalar_to_string),
        estado: first_present(&record, ESTADO_KEYS).and_then(scalar_to_string),
        raw: record,
    })
}

/// Accepts a bare array or an `{ "items": [...] }` wrapper.
pub fn normalize_list(payload: Value) -> Result<Vec<Boleta>, ListShapeError> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut wrapper) => match wrapper.remove("items") {
            Some(Value::Array(items)) => items,
            Some(other) => return Err(ListShapeError::UnexpectedShape(json_kind(&other))),
            None => return Err(ListShapeError::UnexpectedShape("object without items")),
        },
        other => return Err(ListShapeError::UnexpectedShape(json_kind(&other))),
    };

    Ok(items.into_iter().filter_map(normalize_boleta).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_aliases_resolve_to_canonical_fields() {
        let boleta = normalize_boleta(json!({
            "Folio": 1021,
            "Monto": "$ 12.990",
            "fecha_emision": "2025-01-15",
            "razon_social": "Comercial IMA Ltda",
            "Estado": "pendiente",
            "extra": true
        }))
        .unwrap();

        assert_eq!(boleta.id.as_deref(), Some("1021"));
        assert_eq!(boleta.total, Some(12990.0));
        assert_eq!(boleta.fecha.as_deref(), Some("2025-01-15"));
        assert_eq!(boleta.cliente.as_deref(), Some("Comercial IMA Ltda"));
        assert_eq!(boleta.estado.as_deref(), Some("pendiente"));
        assert_eq!(boleta.raw.get("extra"), Some(&json!(true)));
    }

    #[test]
    fn test_first_non_empty_alias_wins() {
        let boleta = normalize_boleta(json!({"id": "", "folio": "B-7", "total": null, "monto": 500})).unwrap();
        assert_eq!(boleta.id.as_deref(), Some("B-7"));
        assert_eq!(boleta.total, Some(500.0));
        assert!(boleta.fecha.is_none());
    }

    #[test]
    fn test_parse_amount_formats() {
        assert_eq!(parse_amount(&json!(1500)), Some(1500.0));
        assert_eq!(parse_amount(&json!("12.99")), Some(12.99));
        assert_eq!(parse_amount(&json!("1.234.567")), Some(1234567.0));
        assert_eq!(parse_amount(&json!("1.234,50")), Some(1234.5));
        assert_eq!(parse_amount(&json!("1,234.50")), Some(1234.5));
        assert_eq!(parse_amount(&json!("10,5")), Some(10.5));
        assert_eq!(parse_amount(&json!("sin monto")), None);
        assert_eq!(parse_amount(&json!(true)), None);
    }

    #[test]
    fn test_list_shapes() {
        let bare = normalize_list(json!([{"id": 1}, "basura", {"id": 2}])).unwrap();
        assert_eq!(bare.len(), 2);

        let wrapped = normalize_list(json!({"items": [{"id": 3}], "total": 1})).unwrap();
        assert_eq!(wrapped[0].id.as_deref(), Some("3"));

        assert_eq!(
            normalize_list(json!({"detail": "x"})),
            Err(ListShapeError::UnexpectedShape("object without items"))
        );
        assert!(normalize_list(json!("nope")).is_err());
    }
}
