use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Number;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
    },
}

/// Units on hand for a product. A count of zero and the textual
/// "out of stock" marker both land on [`Stock::OutOfStock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stock {
    Available(u64),
    OutOfStock,
}

impl<'de> Deserialize<'de> for Stock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Count(u64),
            Marker(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Count(0) => Ok(Stock::OutOfStock),
            Raw::Count(units) => Ok(Stock::Available(units)),
            Raw::Marker(marker) if marker.trim().eq_ignore_ascii_case("out of stock") => {
                Ok(Stock::OutOfStock)
            }
            Raw::Marker(marker) => Err(de::Error::custom(format!(
                "unrecognized stock marker '{marker}'"
            ))),
        }
    }
}

// The shape of one catalog entry (matches catalog.json)
#[derive(Debug, Clone, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Description")]
    pub description: String,
    // Kept as the JSON number so `2399` renders as `2399`, not `2399.0`
    #[serde(rename = "Price")]
    pub price: Number,
    #[serde(rename = "Stock_availability", alias = "Stock_availabiility")]
    pub stock: Stock,
}

/// Read-only product catalog, loaded once at startup.
///
/// Records keep their file order for listing; lookups go through an index
/// keyed by the exact name bytes. No case folding, no trimming.
#[derive(Debug, Default)]
pub struct Catalog {
    products: Vec<ProductRecord>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(products: Vec<ProductRecord>) -> Self {
        let mut index = HashMap::with_capacity(products.len());
        for (position, product) in products.iter().enumerate() {
            if index.contains_key(&product.name) {
                // First record wins, same as scanning the list front to back
                tracing::warn!("Duplicate catalog entry '{}' ignored for lookup", product.name);
                continue;
            }
            index.insert(product.name.clone(), position);
        }
        Self { products, index }
    }

    pub fn from_json(content: &str) -> Result<Self, CatalogError> {
        let products: Vec<ProductRecord> =
            serde_json::from_str(content).map_err(|source| CatalogError::Parse { source })?;
        Ok(Self::new(products))
    }

    // Reads the catalog file and indexes it
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();

        let content = fs::read_to_string(path)
            .await
            .map_err(|source| CatalogError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let catalog = Self::from_json(&content)?;
        tracing::info!("Loaded {} products from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn lookup(&self, name: &str) -> Option<&ProductRecord> {
        self.index.get(name).map(|&position| &self.products[position])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProductRecord> {
        self.products.iter()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
