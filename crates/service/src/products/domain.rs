use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::validation::{normalize_id, parse_price};

/// A product record as persisted in the catalogue document.
///
/// `id` is always held in its string form; documents written by older tools
/// may carry numeric ids and those are normalised on read. Fields outside the
/// known set are kept in `extra` so rewriting the document never drops them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub nombre: String,
    #[serde(deserialize_with = "de_precio")]
    pub precio: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imagen: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Create payload. Fields stay untyped so the service can report type
/// mistakes as validation errors instead of failing at deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precio: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imagen: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewProduct {
    pub fn new(nombre: impl Into<String>, precio: f64) -> Self {
        Self {
            nombre: Some(Value::String(nombre.into())),
            precio: Some(Value::from(precio)),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<Value>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_imagen(mut self, imagen: impl Into<String>) -> Self {
        self.imagen = Some(Value::String(imagen.into()));
        self
    }
}

/// Partial update: field name to new value. `id` may be present only with the
/// record's current id.
pub type ProductPatch = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Created,
    Updated,
}

/// Result of a successful create or update.
#[derive(Debug, Clone, PartialEq)]
pub struct Saved {
    pub status: SaveStatus,
    pub product: Product,
}

fn de_id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let v = Value::deserialize(d)?;
    normalize_id(&v).ok_or_else(|| D::Error::custom("id must be a string or a number"))
}

fn de_precio<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let v = Value::deserialize(d)?;
    parse_price(&v).ok_or_else(|| D::Error::custom("precio must be a number"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_ids_and_string_prices_are_normalised() {
        let p: Product = serde_json::from_value(json!({"id": 1, "nombre": "Fries", "precio": "3"})).unwrap();
        assert_eq!(p.id, "1");
        assert_eq!(p.precio, 3.0);

        let p: Product = serde_json::from_str(r#"{"id": 2.0, "nombre": "Shake", "precio": 2}"#).unwrap();
        assert_eq!(p.id, "2");
    }

    #[test]
    fn unknown_fields_survive_a_rewrite() {
        let raw = json!({"id": "7", "nombre": "Shake", "precio": 2.5, "categoria": "bebidas", "stock": 4});
        let p: Product = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(p.extra.get("categoria"), Some(&json!("bebidas")));
        assert_eq!(serde_json::to_value(&p).unwrap(), raw);
    }

    #[test]
    fn optional_fields_are_omitted_when_absent() {
        let p = Product {
            id: "1".into(),
            nombre: "Burger".into(),
            precio: 5.5,
            descripcion: None,
            imagen: None,
            extra: Map::new(),
        };
        let v = serde_json::to_value(p).unwrap();
        assert_eq!(v, json!({"id": "1", "nombre": "Burger", "precio": 5.5}));
    }

    #[test]
    fn records_without_required_fields_are_rejected() {
        assert!(serde_json::from_value::<Product>(json!({"id": "1", "precio": 1})).is_err());
        assert!(serde_json::from_value::<Product>(json!({"id": {"x": 1}, "nombre": "a", "precio": 1})).is_err());
    }

    #[test]
    fn new_product_null_fields_read_as_absent() {
        let np: NewProduct = serde_json::from_value(json!({"nombre": "Burger", "precio": 5, "id": null, "extra_field": true})).unwrap();
        assert!(np.id.is_none());
        assert_eq!(np.extra.get("extra_field"), Some(&json!(true)));
    }
}
