//! Host collaborators the layout core calls out to.
//!
//! Rendering, persistence transport, asset services and dialogs belong to
//! the host UI. The core only sees these traits plus a few in-process
//! implementations that hosts and tests can use directly.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{LayoutError, Result};
use crate::geometry::Size;
use crate::region::RegionId;

/// Live measurement of rendered regions.
pub trait SurfaceMeasure: Send + Sync {
    fn measure(&self, region_id: &str) -> Option<Size>;
}

/// Surface backed by a fixed size table, with an optional fallback size.
#[derive(Debug, Default, Clone)]
pub struct FixedSurface {
    sizes: HashMap<RegionId, Size>,
    fallback: Option<Size>,
}

impl FixedSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fallback(mut self, size: Size) -> Self {
        self.fallback = Some(size);
        self
    }

    pub fn with_size(mut self, region_id: impl Into<RegionId>, size: Size) -> Self {
        self.sizes.insert(region_id.into(), size);
        self
    }

    pub fn set_size(&mut self, region_id: impl Into<RegionId>, size: Size) {
        self.sizes.insert(region_id.into(), size);
    }
}

impl SurfaceMeasure for FixedSurface {
    fn measure(&self, region_id: &str) -> Option<Size> {
        self.sizes.get(region_id).copied().or(self.fallback)
    }
}

/// Persistence of serialized template documents.
pub trait TemplateStore {
    fn load(&self, template_id: &str) -> Result<String>;
    fn save(&mut self, template_id: &str, document: &str) -> Result<()>;
}

/// In-process store keyed by template id.
#[derive(Debug, Default, Clone)]
pub struct MemoryTemplateStore {
    documents: HashMap<String, String>,
}

impl MemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, template_id: impl Into<String>, document: impl Into<String>) {
        self.documents.insert(template_id.into(), document.into());
    }

    pub fn get(&self, template_id: &str) -> Option<&str> {
        self.documents.get(template_id).map(String::as_str)
    }
}

impl TemplateStore for MemoryTemplateStore {
    fn load(&self, template_id: &str) -> Result<String> {
        self.documents
            .get(template_id)
            .cloned()
            .ok_or_else(|| LayoutError::Service(format!("template `{template_id}` not found")))
    }

    fn save(&mut self, template_id: &str, document: &str) -> Result<()> {
        self.documents
            .insert(template_id.to_string(), document.to_string());
        Ok(())
    }
}

/// Request relating an existing asset to a freshly converted widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetConversionRequest {
    pub original_asset_id: String,
    pub owner_id: String,
    pub widget_id: String,
    pub widget_name: String,
    pub target_asset_type: String,
    pub shared_asset: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// Completed asset service call as delivered back by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetResponse {
    pub status: ResponseStatus,
    /// Raw response body; JSON for both outcomes in practice.
    pub body: String,
}

impl AssetResponse {
    pub fn success(body: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Success,
            body: body.into(),
        }
    }

    pub fn error(body: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }

    /// Parsed body, or `Null` when it is empty or not JSON.
    pub fn data(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }

    pub fn error_message(&self) -> String {
        extract_default_error_message(&self.body)
    }
}

pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred.";

/// Pull the user-facing message out of a failed service response.
///
/// Looks for the first `defaultMessage` string in a JSON body, falls back to
/// the trimmed body text, then to a generic message.
pub fn extract_default_error_message(body: &str) -> String {
    let trimmed = body.trim();
    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => find_default_message(&value)
            .unwrap_or(UNKNOWN_ERROR_MESSAGE)
            .to_string(),
        Err(_) if !trimmed.is_empty() => trimmed.to_string(),
        Err(_) => UNKNOWN_ERROR_MESSAGE.to_string(),
    }
}

fn find_default_message(value: &Value) -> Option<&str> {
    match value {
        Value::Object(map) => map
            .get("defaultMessage")
            .and_then(Value::as_str)
            .or_else(|| map.values().find_map(find_default_message)),
        Value::Array(items) => items.iter().find_map(find_default_message),
        _ => None,
    }
}

/// Asynchronous asset service. `create_asset` only dispatches; the host
/// delivers the [`AssetResponse`] later through the template model.
pub trait AssetService {
    fn create_asset(&mut self, request: &AssetConversionRequest) -> Result<()>;
}

/// Asset service that queues requests for the host to answer.
#[derive(Debug, Default, Clone)]
pub struct QueuedAssetService {
    requests: Vec<AssetConversionRequest>,
}

impl QueuedAssetService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> &[AssetConversionRequest] {
        &self.requests
    }

    pub fn drain(&mut self) -> Vec<AssetConversionRequest> {
        std::mem::take(&mut self.requests)
    }
}

impl AssetService for QueuedAssetService {
    fn create_asset(&mut self, request: &AssetConversionRequest) -> Result<()> {
        self.requests.push(request.clone());
        Ok(())
    }
}

/// Blocking warning dialog.
pub trait WarningSink: Send + Sync {
    fn warn(&self, title: &str, content: &str);
}

#[derive(Debug, Default)]
pub struct NullWarnings;

impl WarningSink for NullWarnings {
    fn warn(&self, _title: &str, _content: &str) {}
}

/// Keeps every warning for later inspection.
#[derive(Debug, Default)]
pub struct RecordingWarnings {
    entries: Mutex<Vec<(String, String)>>,
}

impl RecordingWarnings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(String, String)> {
        self.entries
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl WarningSink for RecordingWarnings {
    fn warn(&self, title: &str, content: &str) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.push((title.to_string(), content.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_message_is_found_in_nested_errors() {
        let body = r#"{"Errors":[{"code":"x","defaultMessage":"Asset is locked"}]}"#;
        assert_eq!(extract_default_error_message(body), "Asset is locked");
    }

    #[test]
    fn plain_text_and_empty_bodies_fall_back() {
        assert_eq!(extract_default_error_message(" timeout "), "timeout");
        assert_eq!(extract_default_error_message(""), UNKNOWN_ERROR_MESSAGE);
        assert_eq!(extract_default_error_message("{}"), UNKNOWN_ERROR_MESSAGE);
    }

    #[test]
    fn memory_store_round_trips_documents() {
        let mut store = MemoryTemplateStore::new();
        assert!(store.load("t1").is_err());
        store.save("t1", "{}").unwrap();
        assert_eq!(store.load("t1").unwrap(), "{}");
    }

    #[test]
    fn fixed_surface_uses_fallback() {
        let surface = FixedSurface::new()
            .with_fallback(Size::new(960, 400))
            .with_size("nav", Size::new(200, 400));
        assert_eq!(surface.measure("nav"), Some(Size::new(200, 400)));
        assert_eq!(surface.measure("other"), Some(Size::new(960, 400)));
        assert_eq!(FixedSurface::new().measure("nav"), None);
    }
}
