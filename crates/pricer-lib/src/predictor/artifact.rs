//! Loading and holding trained model artifacts
//!
//! Two on-disk formats are supported:
//! - `.json` tree ensemble documents (see [`TreeEnsembleDocument`])
//! - `.onnx` graphs evaluated with tract, with their column list and feature
//!   importances in a `<stem>.schema.json` sidecar

use super::inference::OnnxRegressor;
use super::schema::{FeatureSchema, FeatureVector};
use super::tree::{TreeEnsemble, TreeEnsembleDocument};
use super::Regressor;
use crate::error::{PricingError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Provenance of a loaded artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactInfo {
    pub name: String,
    pub path: String,
    pub backend: String,
    pub checksum: String,
    pub size_bytes: usize,
    pub feature_count: usize,
}

/// Sidecar describing the inputs of an ONNX artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaSidecar {
    #[serde(default)]
    pub name: Option<String>,
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub feature_importances: HashMap<String, f64>,
}

/// An immutable trained regressor together with its input schema
pub struct ModelArtifact {
    schema: Arc<FeatureSchema>,
    importances: HashMap<String, f64>,
    regressor: Box<dyn Regressor>,
    info: ArtifactInfo,
}

impl fmt::Debug for ModelArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelArtifact")
            .field("info", &self.info)
            .field("columns", &self.schema.len())
            .finish()
    }
}

impl ModelArtifact {
    /// Assemble an artifact from parts already in memory
    pub fn new(
        name: impl Into<String>,
        schema: FeatureSchema,
        importances: HashMap<String, f64>,
        regressor: Box<dyn Regressor>,
    ) -> Result<Self> {
        let name = name.into();
        validate_importances(&importances).map_err(|reason| PricingError::artifact(&name, reason))?;
        Ok(Self::assemble(name, schema, importances, regressor))
    }

    fn assemble(
        name: String,
        schema: FeatureSchema,
        importances: HashMap<String, f64>,
        regressor: Box<dyn Regressor>,
    ) -> Self {
        let info = ArtifactInfo {
            name: name.clone(),
            path: String::new(),
            backend: regressor.backend().to_string(),
            checksum: String::new(),
            size_bytes: 0,
            feature_count: schema.len(),
        };
        Self {
            schema: Arc::new(schema),
            importances,
            regressor,
            info,
        }
    }

    /// Load an artifact from disk, picking the backend from the file extension
    pub fn load(path: &Path) -> Result<Self> {
        let display = path.display().to_string();
        let bytes = fs::read(path).map_err(|e| PricingError::artifact(&display, e))?;
        let checksum = compute_checksum(&bytes);

        let mut artifact = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_tree_document(path, &bytes)?,
            Some("onnx") => Self::from_onnx(path, &bytes)?,
            other => {
                return Err(PricingError::artifact(
                    &display,
                    format!("unsupported artifact format {:?}", other.unwrap_or("")),
                ))
            }
        };

        artifact.info.path = display;
        artifact.info.checksum = checksum;
        artifact.info.size_bytes = bytes.len();

        debug!(
            model = %artifact.info.name,
            backend = %artifact.info.backend,
            columns = artifact.schema.len(),
            "Model artifact parsed"
        );
        Ok(artifact)
    }

    fn from_tree_document(path: &Path, bytes: &[u8]) -> Result<Self> {
        let display = path.display().to_string();
        let doc: TreeEnsembleDocument =
            serde_json::from_slice(bytes).map_err(|e| PricingError::artifact(&display, e))?;
        let schema = FeatureSchema::new(doc.feature_names.iter().cloned())
            .map_err(|e| PricingError::artifact(&display, e))?;
        let ensemble =
            TreeEnsemble::from_document(&doc).map_err(|e| PricingError::artifact(&display, e))?;
        validate_importances(&doc.feature_importances)
            .map_err(|e| PricingError::artifact(&display, e))?;
        let name = doc.name.clone().unwrap_or_else(|| file_stem(path));
        Ok(Self::assemble(name, schema, doc.feature_importances, Box::new(ensemble)))
    }

    fn from_onnx(path: &Path, bytes: &[u8]) -> Result<Self> {
        let display = path.display().to_string();
        let sidecar_path = path.with_extension("schema.json");
        let sidecar_bytes = fs::read(&sidecar_path).map_err(|e| {
            PricingError::artifact(&display, format!("schema sidecar {}: {}", sidecar_path.display(), e))
        })?;
        let sidecar: SchemaSidecar = serde_json::from_slice(&sidecar_bytes)
            .map_err(|e| PricingError::artifact(&display, e))?;
        let schema = FeatureSchema::new(sidecar.feature_names.iter().cloned())
            .map_err(|e| PricingError::artifact(&display, e))?;
        let regressor = OnnxRegressor::from_bytes(bytes, schema.len())
            .map_err(|e| PricingError::artifact(&display, format!("{:#}", e)))?;
        validate_importances(&sidecar.feature_importances)
            .map_err(|e| PricingError::artifact(&display, e))?;
        let name = sidecar.name.clone().unwrap_or_else(|| file_stem(path));
        Ok(Self::assemble(name, schema, sidecar.feature_importances, Box::new(regressor)))
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn schema(&self) -> &Arc<FeatureSchema> {
        &self.schema
    }

    pub fn importances(&self) -> &HashMap<String, f64> {
        &self.importances
    }

    pub fn importance(&self, column: &str) -> Option<f64> {
        self.importances.get(column).copied()
    }

    pub fn info(&self) -> &ArtifactInfo {
        &self.info
    }

    /// Run the regressor on a vector built for this artifact's schema
    pub fn evaluate(&self, features: &FeatureVector) -> Result<f64> {
        features.check_against(&self.schema, self.name())?;
        let value = self
            .regressor
            .predict(features.values())
            .map_err(|e| PricingError::evaluation(self.name(), format!("{:#}", e)))?;
        if !value.is_finite() {
            return Err(PricingError::evaluation(
                self.name(),
                format!("non-finite prediction {}", value),
            ));
        }
        Ok(value)
    }
}

fn validate_importances(importances: &HashMap<String, f64>) -> std::result::Result<(), String> {
    match importances
        .iter()
        .find(|(_, w)| !w.is_finite() || **w < 0.0)
    {
        Some((column, weight)) => Err(format!(
            "importance for '{}' must be a non-negative number, got {}",
            column, weight
        )),
        None => Ok(()),
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("model")
        .to_string()
}

/// Compute SHA256 checksum of data
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
