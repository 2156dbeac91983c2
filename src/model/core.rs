use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use crate::codec::{RegionTreeDocument, TemplateDocument, regions_from_tree_with, tree_from_regions};
use crate::editor::{Direction, EditScope, LayoutEditor, RemovedRegion, editor_for, widgets};
use crate::error::{LayoutError, Result};
use crate::logging::{LogLevel, event_with_fields, json_kv, json_str};
use crate::metrics::{EditMetricSnapshot, EditMetrics};
use crate::region::{LayoutMode, Region, RegionId, RegionTree, WalkResult, Widget, WidgetId, walk};
use crate::services::{
    AssetConversionRequest, AssetResponse, AssetService, FixedSurface, NullWarnings,
    SurfaceMeasure, TemplateStore, WarningSink,
};

use super::config::ModelConfig;
use super::conversion::{AssetSource, ConversionOutcome, ConversionState, PendingConversion};

type Fields = Vec<(String, Value)>;

/// One loaded template: its region tree, the editor for its layout mode and
/// the bookkeeping around persistence and pending widget conversions.
pub struct TemplateModel {
    metadata: TemplateDocument,
    tree: RegionTree,
    editor: Box<dyn LayoutEditor>,
    warnings: Arc<dyn WarningSink>,
    config: ModelConfig,
    pending: HashMap<WidgetId, PendingConversion>,
    saved_hash: Option<blake3::Hash>,
    started: Instant,
}

impl TemplateModel {
    /// Model over a stored document. The freshly loaded model is clean.
    pub fn from_document(document: TemplateDocument, config: ModelConfig) -> Result<Self> {
        let tree = regions_from_tree_with(&document, config.id_registry())?;
        let metadata = TemplateDocument {
            region_tree: RegionTreeDocument::default(),
            ..document
        };
        let mut model = Self::assemble(metadata, tree, config);
        model.saved_hash = Some(model.current_hash()?);
        model.log(
            LogLevel::Info,
            "persistence",
            "template_loaded",
            vec![
                json_str("template", model.metadata.id.clone()),
                json_kv("regions", model.tree.region_count()),
                json_str("mode", mode_name(model.mode())),
            ],
        );
        Ok(model)
    }

    /// New template holding a single empty region. It stays dirty until saved.
    pub fn create(
        id: impl Into<String>,
        name: impl Into<String>,
        source_template_name: impl Into<String>,
        config: ModelConfig,
    ) -> Self {
        let metadata = TemplateDocument {
            id: id.into(),
            name: name.into(),
            source_template_name: source_template_name.into(),
            ..TemplateDocument::default()
        };
        let tree = RegionTree::with_registry(metadata.mode(), config.id_registry());
        Self::assemble(metadata, tree, config)
    }

    pub fn load(store: &dyn TemplateStore, template_id: &str, config: ModelConfig) -> Result<Self> {
        let text = store.load(template_id)?;
        Self::from_document(TemplateDocument::from_json(&text)?, config)
    }

    fn assemble(metadata: TemplateDocument, tree: RegionTree, config: ModelConfig) -> Self {
        let surface: Arc<dyn SurfaceMeasure> = Arc::new(FixedSurface::new());
        Self {
            editor: editor_for(tree.mode(), surface),
            metadata,
            tree,
            warnings: Arc::new(NullWarnings),
            config,
            pending: HashMap::new(),
            saved_hash: None,
            started: Instant::now(),
        }
    }

    /// Measure rendered regions through `surface` from now on.
    pub fn with_surface(mut self, surface: Arc<dyn SurfaceMeasure>) -> Self {
        self.editor = editor_for(self.tree.mode(), surface);
        self
    }

    pub fn with_warnings(mut self, warnings: Arc<dyn WarningSink>) -> Self {
        self.warnings = warnings;
        self
    }

    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn mode(&self) -> LayoutMode {
        self.tree.mode()
    }

    pub fn scope(&self) -> EditScope {
        self.config.scope
    }

    pub fn set_scope(&mut self, scope: EditScope) {
        self.config.scope = scope;
    }

    pub fn tree(&self) -> &RegionTree {
        &self.tree
    }

    pub fn editor(&self) -> &dyn LayoutEditor {
        self.editor.as_ref()
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn pending_conversions(&self) -> impl Iterator<Item = &PendingConversion> {
        self.pending.values()
    }

    /// Current state as a storable document.
    pub fn document(&self) -> TemplateDocument {
        TemplateDocument {
            region_tree: tree_from_regions(&self.tree),
            ..self.metadata.clone()
        }
    }

    fn current_hash(&self) -> Result<blake3::Hash> {
        let text = self.document().to_json()?;
        Ok(blake3::hash(text.as_bytes()))
    }

    /// Whether the tree differs from what was last loaded or saved.
    pub fn is_dirty(&self) -> bool {
        match (self.saved_hash, self.current_hash()) {
            (Some(saved), Ok(current)) => saved != current,
            _ => true,
        }
    }

    pub fn save(&mut self, store: &mut dyn TemplateStore) -> Result<()> {
        let text = self.document().to_json()?;
        if let Err(err) = store.save(&self.metadata.id, &text) {
            self.log(
                LogLevel::Error,
                "persistence",
                "template_save_failed",
                vec![
                    json_str("template", self.metadata.id.clone()),
                    json_str("error", err.to_string()),
                ],
            );
            return Err(err);
        }
        self.saved_hash = Some(blake3::hash(text.as_bytes()));
        self.with_metrics(EditMetrics::record_save);
        self.log(
            LogLevel::Info,
            "persistence",
            "template_saved",
            vec![
                json_str("template", self.metadata.id.clone()),
                json_kv("bytes", text.len()),
            ],
        );
        Ok(())
    }

    pub fn add_region(&mut self, region_id: &str, direction: Direction) -> Result<RegionId> {
        let fields = vec![
            json_str("region", region_id),
            json_str("direction", direction.as_str()),
        ];
        self.apply("add_region", fields, |editor, tree, _| {
            editor.add_region(tree, region_id, direction)
        })
    }

    pub fn remove_region(&mut self, region_id: &str, delete_content: bool) -> Result<RemovedRegion> {
        let fields = vec![
            json_str("region", region_id),
            json_kv("delete_content", delete_content),
        ];
        let removed = self.apply("remove_region", fields, |editor, tree, _| {
            editor.remove_region(tree, region_id, delete_content)
        })?;
        if delete_content {
            let count = count_widgets(&removed.region);
            self.with_metrics(|metrics| metrics.record_widgets_removed(count));
        }
        Ok(removed)
    }

    pub fn add_widget(
        &mut self,
        region_id: &str,
        definition_id: &str,
        before: Option<&str>,
    ) -> Result<WidgetId> {
        let fields = vec![
            json_str("region", region_id),
            json_str("definition", definition_id),
        ];
        let widget_id = self.apply("add_widget", fields, |editor, tree, scope| {
            editor.add_widget(tree, scope, region_id, definition_id, before)
        })?;
        self.with_metrics(EditMetrics::record_widget_added);
        Ok(widget_id)
    }

    pub fn remove_widget(&mut self, region_id: &str, widget_id: &str) -> Result<bool> {
        let fields = vec![json_str("region", region_id), json_str("widget", widget_id)];
        let removed = self.apply("remove_widget", fields, |editor, tree, _| {
            editor.remove_widget(tree, region_id, widget_id)
        })?;
        if removed {
            self.with_metrics(|metrics| metrics.record_widgets_removed(1));
        }
        Ok(removed)
    }

    pub fn move_widget(
        &mut self,
        from_region: &str,
        widget_id: &str,
        to_region: &str,
        index: usize,
    ) -> Result<bool> {
        let fields = vec![
            json_str("from", from_region),
            json_str("widget", widget_id),
            json_str("to", to_region),
            json_kv("index", index),
        ];
        self.apply("move_widget", fields, |editor, tree, _| {
            editor.move_widget(tree, from_region, widget_id, to_region, index)
        })
    }

    pub fn move_region(&mut self, region_id: &str, index: usize) -> Result<bool> {
        let fields = vec![json_str("region", region_id), json_kv("index", index)];
        self.apply("move_region", fields, |editor, tree, _| {
            editor.move_region(tree, region_id, index)
        })
    }

    /// Visit every region from the root until `visit` stops the walk.
    pub fn each_region<'a, F>(&'a self, visit: F) -> bool
    where
        F: FnMut(&'a Region) -> WalkResult,
    {
        self.tree.each_region(visit)
    }

    /// Change attributes of one region in place; `false` if it is absent.
    pub fn edit_region(&mut self, region_id: &str, edit: impl FnOnce(&mut Region)) -> Result<bool> {
        let fields = vec![json_str("region", region_id)];
        self.apply("edit_region", fields, |_, tree, _| {
            Ok(tree.edit_region(region_id, edit))
        })
    }

    /// Change the parent of `region_id`; the closure also gets the child index.
    pub fn edit_region_parent(
        &mut self,
        region_id: &str,
        edit: impl FnOnce(&mut Region, usize),
    ) -> Result<bool> {
        let fields = vec![json_str("region", region_id)];
        self.apply("edit_region_parent", fields, |_, tree, _| {
            Ok(tree.edit_region_parent(region_id, edit))
        })
    }

    pub fn edit_widget(&mut self, widget_id: &str, edit: impl FnOnce(&mut Widget)) -> Result<bool> {
        let fields = vec![json_str("widget", widget_id)];
        self.apply("edit_widget", fields, |_, tree, _| {
            Ok(tree.edit_widget(widget_id, edit))
        })
    }

    /// Replace a widget with a rich-text widget placed right before it.
    ///
    /// Without an asset the original is dropped at once. With one, an asset
    /// request is dispatched and both widgets stay until
    /// [`complete_conversion`](Self::complete_conversion) is called with the
    /// response.
    pub fn convert_widget(
        &mut self,
        region_id: &str,
        widget_id: &str,
        source: Option<AssetSource>,
        service: &mut dyn AssetService,
    ) -> Result<ConversionState> {
        let original = self
            .tree
            .region(region_id)
            .ok_or_else(|| LayoutError::RegionNotFound(region_id.to_string()))?
            .widget(widget_id)
            .cloned()
            .ok_or_else(|| LayoutError::WidgetNotFound(widget_id.to_string()))?;

        let new_id = self.tree.next_widget_id();
        let replacement = Widget::new(
            new_id.clone(),
            self.config.conversion.widget_definition_id.clone(),
        )
        .with_name(original.name.clone());
        widgets::insert_widget(&mut self.tree, region_id, replacement, Some(widget_id))?;

        let mut fields = vec![
            json_str("region", region_id),
            json_str("widget", widget_id),
            json_str("replacement", new_id.clone()),
        ];

        let Some(source) = source else {
            widgets::remove_widget(&mut self.tree, region_id, widget_id)?;
            self.with_metrics(EditMetrics::record_conversion);
            self.log(LogLevel::Info, "conversion", "widget_converted", fields);
            return Ok(ConversionState::Done(ConversionOutcome::Converted {
                data: Value::Null,
            }));
        };

        let request = AssetConversionRequest {
            original_asset_id: source.asset_id,
            owner_id: source.owner_id,
            widget_id: new_id.clone(),
            widget_name: original.name,
            target_asset_type: self.config.conversion.target_asset_type.clone(),
            shared_asset: source.shared,
        };
        if let Err(err) = service.create_asset(&request) {
            widgets::remove_widget(&mut self.tree, region_id, &new_id)?;
            fields.push(json_str("error", err.to_string()));
            self.log(LogLevel::Error, "conversion", "conversion_request_failed", fields);
            return Err(err);
        }

        self.pending.insert(
            new_id.clone(),
            PendingConversion {
                region_id: region_id.to_string(),
                original_widget_id: widget_id.to_string(),
                widget_id: new_id.clone(),
            },
        );
        self.log(LogLevel::Info, "conversion", "conversion_pending", fields);
        Ok(ConversionState::Pending { widget_id: new_id })
    }

    /// Finish a pending conversion: success drops the original widget,
    /// failure drops the replacement.
    pub fn complete_conversion(
        &mut self,
        widget_id: &str,
        response: &AssetResponse,
    ) -> Result<ConversionOutcome> {
        let pending = self
            .pending
            .remove(widget_id)
            .ok_or_else(|| LayoutError::NoPendingConversion(widget_id.to_string()))?;

        let (outcome, dropped) = if response.is_success() {
            let data = response.data();
            (
                ConversionOutcome::Converted { data },
                pending.original_widget_id.as_str(),
            )
        } else {
            let message = response.error_message();
            (
                ConversionOutcome::RolledBack { message },
                pending.widget_id.as_str(),
            )
        };

        // Widgets can move while the request is in flight.
        let holder = self
            .tree
            .widget_owner(dropped)
            .map(|region| region.id.clone());
        if let Some(region_id) = holder {
            widgets::remove_widget(&mut self.tree, &region_id, dropped)?;
        }

        let mut fields = vec![
            json_str("widget", pending.widget_id.clone()),
            json_str("original", pending.original_widget_id.clone()),
        ];
        match &outcome {
            ConversionOutcome::Converted { .. } => {
                self.with_metrics(EditMetrics::record_conversion);
                self.log(LogLevel::Info, "conversion", "widget_converted", fields);
            }
            ConversionOutcome::RolledBack { message } => {
                fields.push(json_str("error", message.clone()));
                self.log(LogLevel::Warn, "conversion", "conversion_rolled_back", fields);
            }
        }
        Ok(outcome)
    }

    pub fn metrics_snapshot(&self) -> Option<EditMetricSnapshot> {
        let metrics = self.config.metrics.as_ref()?;
        let guard = metrics.lock().ok()?;
        Some(guard.snapshot(self.started.elapsed()))
    }

    /// Log the current counters under the configured metrics target.
    pub fn emit_metrics(&self) {
        if let (Some(logger), Some(snapshot)) = (self.config.logger.as_ref(), self.metrics_snapshot())
        {
            let _ = logger.log_event(snapshot.to_log_event(&self.config.metrics_target));
        }
    }

    fn apply<T>(
        &mut self,
        operation: &str,
        mut fields: Fields,
        edit: impl FnOnce(&dyn LayoutEditor, &mut RegionTree, EditScope) -> Result<T>,
    ) -> Result<T> {
        let result = edit(self.editor.as_ref(), &mut self.tree, self.config.scope);
        match &result {
            Ok(_) => {
                self.with_metrics(EditMetrics::record_applied);
                fields.push(json_str("outcome", "applied"));
                self.log(LogLevel::Info, "edit", operation, fields);
            }
            Err(LayoutError::Rejected(rejection)) => {
                let (title, content) = rejection.warning();
                self.warnings.warn(title, content);
                self.with_metrics(EditMetrics::record_rejected);
                fields.push(json_str("outcome", "rejected"));
                fields.push(json_str("reason", rejection.to_string()));
                self.log(LogLevel::Warn, "edit", operation, fields);
            }
            Err(err) => {
                fields.push(json_str("outcome", "failed"));
                fields.push(json_str("error", err.to_string()));
                self.log(LogLevel::Error, "edit", operation, fields);
            }
        }
        result
    }

    fn with_metrics(&self, record: impl FnOnce(&mut EditMetrics)) {
        if let Some(metrics) = self.config.metrics.as_ref()
            && let Ok(mut guard) = metrics.lock()
        {
            record(&mut *guard);
        }
    }

    fn log(&self, level: LogLevel, area: &str, message: &str, fields: Fields) {
        if let Some(logger) = self.config.logger.as_ref() {
            let event = event_with_fields(level, &self.config.target(area), message, fields);
            let _ = logger.log_event(event);
        }
    }
}

fn mode_name(mode: LayoutMode) -> &'static str {
    match mode {
        LayoutMode::Base => "base",
        LayoutMode::Responsive => "responsive",
    }
}

fn count_widgets(region: &Region) -> usize {
    let mut count = 0;
    walk(region, &mut |node: &Region| {
        count += node.widgets.len();
        WalkResult::Continue
    });
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Rejection;
    use crate::logging::{Logger, MemorySink};
    use crate::region::Owner;
    use crate::services::{MemoryTemplateStore, QueuedAssetService, RecordingWarnings};
    use serde_json::json;

    fn config(sink: &Arc<MemorySink>) -> ModelConfig {
        let mut config = ModelConfig::default()
            .with_logger(Logger::from_shared(sink.clone()))
            .with_seed(11);
        config.enable_metrics();
        config
    }

    fn first_region(model: &TemplateModel) -> RegionId {
        model.tree().root().children[0].id.clone()
    }

    fn widget_ids(model: &TemplateModel, region_id: &str) -> Vec<String> {
        model
            .tree()
            .region(region_id)
            .unwrap()
            .widgets
            .iter()
            .map(|widget| widget.id.clone())
            .collect()
    }

    #[test]
    fn save_load_and_dirty_tracking() {
        let sink = Arc::new(MemorySink::new());
        let mut store = MemoryTemplateStore::new();
        let mut model = TemplateModel::create("t1", "Home", "base", config(&sink));
        assert!(model.is_dirty());

        model.save(&mut store).unwrap();
        assert!(!model.is_dirty());

        let first = first_region(&model);
        let added = model.add_region(&first, Direction::South).unwrap();
        model.add_widget(&added, "percRichText", None).unwrap();
        assert!(model.is_dirty());
        model.save(&mut store).unwrap();
        assert!(!model.is_dirty());

        let reloaded = TemplateModel::load(&store, "t1", config(&sink)).unwrap();
        assert!(!reloaded.is_dirty());
        assert_eq!(reloaded.name(), "Home");
        assert_eq!(reloaded.tree().root(), model.tree().root());
        assert_eq!(reloaded.document(), model.document());

        let snapshot = model.metrics_snapshot().unwrap();
        assert_eq!(snapshot.saves, 2);
        assert_eq!(snapshot.applied, 2);
        assert_eq!(snapshot.widgets_added, 1);
        assert!(sink.messages().contains(&"template_loaded".to_string()));
    }

    #[test]
    fn rejected_edits_warn_and_leave_the_tree_alone() {
        let sink = Arc::new(MemorySink::new());
        let warnings = Arc::new(RecordingWarnings::new());
        let mut model =
            TemplateModel::create("t1", "Home", "base", config(&sink)).with_warnings(warnings.clone());
        let before = model.tree().root().clone();

        let only = first_region(&model);
        let err = model.remove_region(&only, true).unwrap_err();
        assert_eq!(err.rejection(), Some(Rejection::LastRootChild));
        assert_eq!(model.tree().root(), &before);
        assert_eq!(
            warnings.entries(),
            vec![(
                "Region Warning".to_string(),
                "The layout must keep at least one region.".to_string()
            )]
        );

        let event = sink.events().pop().unwrap();
        assert_eq!(event.level, LogLevel::Warn);
        assert_eq!(event.target, "region_layout::model.edit");
        assert_eq!(event.message, "remove_region");
        assert_eq!(event.field("outcome"), Some(&json!("rejected")));
        assert_eq!(model.metrics_snapshot().unwrap().rejected, 1);
    }

    #[test]
    fn missing_regions_are_errors_not_warnings() {
        let sink = Arc::new(MemorySink::new());
        let warnings = Arc::new(RecordingWarnings::new());
        let mut model =
            TemplateModel::create("t1", "Home", "base", config(&sink)).with_warnings(warnings.clone());

        assert!(matches!(
            model.add_widget("ghost", "percTitle", None),
            Err(LayoutError::RegionNotFound(_))
        ));
        assert!(warnings.entries().is_empty());
        assert_eq!(sink.events().pop().unwrap().level, LogLevel::Error);
    }

    #[test]
    fn page_scope_refuses_widgets_on_rows() {
        let sink = Arc::new(MemorySink::new());
        let warnings = Arc::new(RecordingWarnings::new());
        let config = config(&sink).with_scope(EditScope::Page);
        let mut model = TemplateModel::create("t2", "Grid", "perc.resp.base", config)
            .with_warnings(warnings.clone());
        assert_eq!(model.mode(), LayoutMode::Responsive);

        let row = first_region(&model);
        let err = model.add_widget(&row, "percRichText", None).unwrap_err();
        assert_eq!(err.rejection(), Some(Rejection::WidgetOnRow));
        assert_eq!(warnings.entries()[0].0, "Widget Warning");

        model.set_scope(EditScope::Template);
        let widget_id = model.add_widget(&row, "percRichText", None).unwrap();
        let holder = model.tree().widget_owner(&widget_id).unwrap();
        assert!(holder.is_column());
        assert_eq!(holder.owner, Owner::Page);
    }

    #[test]
    fn seeded_models_generate_the_same_widget_ids() {
        let sink = Arc::new(MemorySink::new());
        let mut a = TemplateModel::create("a", "A", "base", config(&sink));
        let mut b = TemplateModel::create("b", "B", "base", config(&sink));
        let region = first_region(&a);
        assert_eq!(
            a.add_widget(&region, "percTitle", None).unwrap(),
            b.add_widget(&region, "percTitle", None).unwrap()
        );
    }

    #[test]
    fn conversion_without_asset_replaces_in_place() {
        let sink = Arc::new(MemorySink::new());
        let mut model = TemplateModel::create("t1", "Home", "base", config(&sink));
        let region = first_region(&model);
        let html = model.add_widget(&region, "percRawHtml", None).unwrap();
        let title = model.add_widget(&region, "percTitle", None).unwrap();

        let mut service = QueuedAssetService::new();
        let state = model
            .convert_widget(&region, &html, None, &mut service)
            .unwrap();
        assert_eq!(
            state,
            ConversionState::Done(ConversionOutcome::Converted { data: Value::Null })
        );

        let ids = widget_ids(&model, &region);
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[1], title);
        assert_eq!(model.tree().widget(&ids[0]).unwrap().definition_id, "percRichText");
        assert!(model.tree().widget(&html).is_none());
        assert!(service.requests().is_empty());
    }

    #[test]
    fn conversion_with_asset_waits_for_the_response() {
        let sink = Arc::new(MemorySink::new());
        let mut model = TemplateModel::create("t1", "Home", "base", config(&sink));
        let region = first_region(&model);
        let html = model.add_widget(&region, "percRawHtml", None).unwrap();
        model
            .tree
            .edit_widget(&html, |widget| widget.name = "intro".into());

        let mut service = QueuedAssetService::new();
        let source = AssetSource::new("asset-1", "page-9").shared(true);
        let ConversionState::Pending { widget_id } = model
            .convert_widget(&region, &html, Some(source), &mut service)
            .unwrap()
        else {
            panic!("conversion should wait for the asset service");
        };

        assert_eq!(widget_ids(&model, &region), vec![widget_id.clone(), html.clone()]);
        let request = &service.requests()[0];
        assert_eq!(request.original_asset_id, "asset-1");
        assert_eq!(request.owner_id, "page-9");
        assert_eq!(request.widget_id, widget_id);
        assert_eq!(request.widget_name, "intro");
        assert_eq!(request.target_asset_type, "percRichTextAsset");
        assert!(request.shared_asset);
        assert_eq!(model.pending_conversions().count(), 1);

        let outcome = model
            .complete_conversion(&widget_id, &AssetResponse::success(r#"{"id":"asset-2"}"#))
            .unwrap();
        assert_eq!(outcome, ConversionOutcome::Converted { data: json!({"id": "asset-2"}) });
        assert_eq!(widget_ids(&model, &region), vec![widget_id.clone()]);
        assert!(matches!(
            model.complete_conversion(&widget_id, &AssetResponse::success("")),
            Err(LayoutError::NoPendingConversion(_))
        ));
    }

    #[test]
    fn failed_conversion_rolls_back_the_replacement() {
        let sink = Arc::new(MemorySink::new());
        let mut model = TemplateModel::create("t1", "Home", "base", config(&sink));
        let region = first_region(&model);
        let html = model.add_widget(&region, "percRawHtml", None).unwrap();

        let mut service = QueuedAssetService::new();
        let state = model
            .convert_widget(&region, &html, Some(AssetSource::new("a", "p")), &mut service)
            .unwrap();
        let ConversionState::Pending { widget_id } = state else {
            panic!("expected a pending conversion");
        };

        let response = AssetResponse::error(r#"{"Errors":[{"defaultMessage":"Asset is locked"}]}"#);
        let outcome = model.complete_conversion(&widget_id, &response).unwrap();
        assert_eq!(
            outcome,
            ConversionOutcome::RolledBack {
                message: "Asset is locked".into()
            }
        );
        assert_eq!(widget_ids(&model, &region), vec![html]);
        assert_eq!(model.pending_conversions().count(), 0);

        let event = sink.events().pop().unwrap();
        assert_eq!(event.target, "region_layout::model.conversion");
        assert_eq!(event.message, "conversion_rolled_back");
    }

    #[test]
    fn metrics_snapshots_are_logged() {
        let sink = Arc::new(MemorySink::new());
        let mut model = TemplateModel::create("t1", "Home", "base", config(&sink));
        let region = first_region(&model);
        model.add_region(&region, Direction::East).unwrap();
        model.emit_metrics();

        let event = sink.events().pop().unwrap();
        assert_eq!(event.target, "region_layout::model.metrics");
        assert_eq!(event.message, "edit_metrics");
        assert_eq!(event.field("applied"), Some(&json!(1)));
    }

    #[test]
    fn attribute_edits_go_through_the_model() {
        let sink = Arc::new(MemorySink::new());
        let mut store = MemoryTemplateStore::new();
        let mut model = TemplateModel::create("t7", "Edits", "base", config(&sink));
        let first = first_region(&model);
        let widget_id = model.add_widget(&first, "percRichText", None).unwrap();
        model.save(&mut store).unwrap();

        let edited = model
            .edit_region(&first, |region| {
                let attrs = region.base_attrs_mut().unwrap();
                attrs.width = "320".into();
                attrs.no_auto_resize = true;
                attrs.css_class = "hero".into();
            })
            .unwrap();
        assert!(edited);
        assert!(model.is_dirty());
        let document = model.document();
        let start_tag = &document.region_tree.root_region.regions().next().unwrap().start_tag;
        assert!(start_tag.contains("width:320px;"));
        assert!(start_tag.contains("hero"));
        assert!(start_tag.contains("perc-noautoresize"));
        model.save(&mut store).unwrap();

        model
            .edit_region_parent(&first, |parent, index| {
                assert_eq!(index, 0);
                parent.base_attrs_mut().unwrap().margin = "4px".into();
            })
            .unwrap();
        assert!(model.is_dirty());
        model.save(&mut store).unwrap();

        assert!(model
            .edit_widget(&widget_id, |widget| widget.name = "intro".into())
            .unwrap());
        assert!(model.is_dirty());
        assert!(!model.edit_region("missing", |_| {}).unwrap());

        let mut ids = Vec::new();
        model.each_region(|region| {
            ids.push(region.id.clone());
            WalkResult::Continue
        });
        assert_eq!(ids, vec!["container".to_string(), first.clone()]);
        assert_eq!(model.metrics_snapshot().unwrap().applied, 5);
        assert!(sink.messages().iter().any(|message| message == "edit_widget"));
    }
}
