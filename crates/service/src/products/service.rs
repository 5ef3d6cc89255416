use std::{collections::HashSet, sync::Arc};

use serde_json::Value;
use tracing::{debug, info, instrument};

use super::domain::{NewProduct, Product, ProductPatch, SaveStatus, Saved};
use super::validation::{is_blank, is_valid_image_url, normalize_id, parse_price};
use crate::errors::ServiceError;
use crate::storage::{Entry, JsonListStore};

const MSG_INCOMPLETE: &str = "Datos del producto incompletos o inválidos (requiere nombre y precio positivo).";
const MSG_BAD_IMAGE: &str = "La URL de la imagen debe ser un formato válido (JPG, PNG, GIF, WEBP).";
const MSG_BAD_PRICE_UPDATE: &str = "El precio debe ser un número positivo para modificar.";
const MSG_ID_IMMUTABLE: &str = "No se permite cambiar el ID de un producto existente.";
const MSG_NOTHING_TO_UPDATE: &str = "No se proporcionaron campos para actualizar.";

/// CRUD over the product catalogue document.
///
/// Every call reads the current document; every mutation runs inside
/// [`JsonListStore::update`] and so is serialised with other mutations.
/// Stored elements that are not valid products are never returned or
/// modified, but they stay in the document and their ids stay taken.
#[derive(Clone)]
pub struct ProductService {
    store: Arc<JsonListStore<Product>>,
}

impl ProductService {
    pub fn new(store: Arc<JsonListStore<Product>>) -> Self { Self { store } }

    /// Open the catalogue at `path`.
    pub async fn open<P: Into<std::path::PathBuf>>(path: P) -> Result<Self, ServiceError> {
        Ok(Self::new(JsonListStore::new(path).await?))
    }

    /// All products, or those whose `nombre` contains `nombre` ignoring case.
    /// A filter that matches nothing is a `NotFound`; an empty catalogue without
    /// a filter is just an empty list.
    pub async fn list(&self, nombre: Option<&str>) -> Result<Vec<Product>, ServiceError> {
        let products = self.store.load_records().await?;
        let Some(filter) = nombre.filter(|f| !f.is_empty()) else {
            return Ok(products);
        };

        let needle = filter.to_lowercase();
        let matched: Vec<Product> = products
            .into_iter()
            .filter(|p| p.nombre.to_lowercase().contains(&needle))
            .collect();
        if matched.is_empty() {
            return Err(ServiceError::NotFound(format!(
                "No se encontraron productos con el nombre '{filter}'."
            )));
        }
        debug!(filter, count = matched.len(), "filtered products");
        Ok(matched)
    }

    pub async fn get(&self, id: &str) -> Result<Product, ServiceError> {
        self.store
            .load_records()
            .await?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| ServiceError::NotFound(format!("Producto con ID '{id}' no encontrado.")))
    }

    /// Validate and append a new product.
    ///
    /// # Examples
    /// ```
    /// use service::products::{NewProduct, ProductService, SaveStatus};
    /// let path = std::env::temp_dir().join(format!("doc_products_{}.json", uuid::Uuid::new_v4()));
    /// let svc = tokio_test::block_on(ProductService::open(&path)).unwrap();
    /// let saved = tokio_test::block_on(svc.create(NewProduct::new("Burger", 5.5))).unwrap();
    /// assert_eq!(saved.status, SaveStatus::Created);
    /// assert_eq!(saved.product.precio, 5.5);
    /// ```
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: NewProduct) -> Result<Saved, ServiceError> {
        let NewProduct { id, nombre, precio, descripcion, imagen, extra } = input;

        let nombre = match nombre {
            Some(Value::String(s)) if !s.trim().is_empty() => s,
            _ => return Err(ServiceError::Validation(MSG_INCOMPLETE.into())),
        };
        let precio = precio
            .as_ref()
            .and_then(parse_price)
            .filter(|p| *p >= 0.0)
            .ok_or_else(|| ServiceError::Validation(MSG_INCOMPLETE.into()))?;
        let descripcion = optional_text(descripcion, "La descripción debe ser un texto.")?;
        let imagen = match imagen.filter(|v| !is_blank(v)) {
            None => None,
            Some(Value::String(url)) if is_valid_image_url(&url) => Some(url),
            Some(_) => return Err(ServiceError::Validation(MSG_BAD_IMAGE.into())),
        };
        let requested_id = match id.filter(|v| !is_blank(v)) {
            None => None,
            Some(v) => Some(normalize_id(&v).ok_or_else(|| {
                ServiceError::Validation("El ID debe ser un texto o un número.".into())
            })?),
        };

        let product = self
            .store
            .update(move |entries| {
                let taken = taken_ids(entries);
                let id = match requested_id {
                    Some(id) if taken.contains(&id) => {
                        return Err(ServiceError::DuplicateId(format!("El ID '{id}' ya existe.")));
                    }
                    Some(id) => id,
                    None => next_id(&taken),
                };
                let product = Product { id, nombre, precio, descripcion, imagen, extra };
                entries.push(Entry::Record(product.clone()));
                Ok(product)
            })
            .await?;

        info!(id = %product.id, nombre = %product.nombre, "product created");
        Ok(Saved { status: SaveStatus::Created, product })
    }

    /// Merge `patch` into the product with `id`.
    ///
    /// Blank values are skipped, `precio` must be positive and `imagen` must be
    /// an image URL. A patch that changes nothing is a `Validation` error and
    /// leaves the document as it was. The stored record only changes if the
    /// whole patch is valid.
    #[instrument(skip(self, patch), fields(id = %id))]
    pub async fn update(&self, id: &str, patch: ProductPatch) -> Result<Saved, ServiceError> {
        let product = self
            .store
            .update(|entries| {
                let slot = entries
                    .iter_mut()
                    .filter_map(Entry::record_mut)
                    .find(|p| p.id == id)
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("Producto con ID '{id}' no encontrado para actualizar."))
                    })?;
                let merged = apply_patch(slot, &patch)?;
                *slot = merged.clone();
                Ok(merged)
            })
            .await?;

        info!(id = %product.id, fields = patch.len(), "product updated");
        Ok(Saved { status: SaveStatus::Updated, product })
    }

    /// Remove the product with `id`; returns the confirmation message.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: &str) -> Result<String, ServiceError> {
        self.store
            .update(|entries| {
                let before = entries.len();
                entries.retain(|e| e.record().map_or(true, |p| p.id != id));
                if entries.len() == before {
                    return Err(ServiceError::NotFound(format!(
                        "Producto con ID '{id}' no encontrado para eliminar."
                    )));
                }
                Ok(())
            })
            .await?;

        info!(%id, "product deleted");
        Ok(format!("Producto con ID '{id}' eliminado correctamente."))
    }
}

fn optional_text(v: Option<Value>, msg: &str) -> Result<Option<String>, ServiceError> {
    match v {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(ServiceError::Validation(msg.into())),
    }
}

fn apply_patch(current: &Product, patch: &ProductPatch) -> Result<Product, ServiceError> {
    let mut next = current.clone();
    let mut changed = 0usize;

    for (key, value) in patch {
        if key == "id" {
            if is_blank(value) || normalize_id(value).as_deref() == Some(current.id.as_str()) {
                continue;
            }
            return Err(ServiceError::ImmutableField(MSG_ID_IMMUTABLE.into()));
        }
        if is_blank(value) {
            continue;
        }

        let differs = match key.as_str() {
            "precio" => {
                let precio = parse_price(value)
                    .filter(|p| *p > 0.0)
                    .ok_or_else(|| ServiceError::Validation(MSG_BAD_PRICE_UPDATE.into()))?;
                let differs = precio != next.precio;
                next.precio = precio;
                differs
            }
            "imagen" => match value.as_str() {
                Some(url) if is_valid_image_url(url) => replace_text(&mut next.imagen, url),
                _ => return Err(ServiceError::Validation(MSG_BAD_IMAGE.into())),
            },
            "nombre" => match value.as_str() {
                Some(s) if s != next.nombre => {
                    next.nombre = s.to_string();
                    true
                }
                Some(_) => false,
                None => return Err(ServiceError::Validation("El nombre debe ser un texto.".into())),
            },
            "descripcion" => match value.as_str() {
                Some(s) => replace_text(&mut next.descripcion, s),
                None => return Err(ServiceError::Validation("La descripción debe ser un texto.".into())),
            },
            _ => next.extra.insert(key.clone(), value.clone()).as_ref() != Some(value),
        };
        if differs {
            changed += 1;
        }
    }

    if changed == 0 {
        return Err(ServiceError::Validation(MSG_NOTHING_TO_UPDATE.into()));
    }
    Ok(next)
}

// true when `slot` held something else
fn replace_text(slot: &mut Option<String>, value: &str) -> bool {
    if slot.as_deref() == Some(value) {
        return false;
    }
    *slot = Some(value.to_string());
    true
}

fn taken_ids(entries: &[Entry<Product>]) -> HashSet<String> {
    entries
        .iter()
        .filter_map(|e| match e {
            Entry::Record(p) => Some(p.id.clone()),
            Entry::Opaque(v) => v.get("id").and_then(normalize_id),
        })
        .collect()
}

/// Current Unix time in milliseconds, bumped past any id already taken.
fn next_id(taken: &HashSet<String>) -> String {
    let mut candidate = chrono::Utc::now().timestamp_millis();
    while taken.contains(&candidate.to_string()) {
        candidate += 1;
    }
    candidate.to_string()
}
