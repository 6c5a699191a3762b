use serde::Serialize;
use tracing::warn;

use crate::error::LayerError;

pub use scene::components::LayerId;

pub trait Layer {
    fn id(&self) -> LayerId;

    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;
}

/// A feature or coordinate the converter could not use.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// Index of the offending feature in its collection; `None` for
    /// problems that are not tied to one feature.
    pub feature: Option<usize>,
    pub message: String,
}

/// Outcome of running one converter over one collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerReport {
    pub layer: LayerId,
    pub name: &'static str,
    pub features_visited: usize,
    pub primitives_emitted: usize,
    pub features_skipped: usize,
    pub positions_skipped: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl LayerReport {
    pub fn new(layer: &impl Layer) -> Self {
        Self {
            layer: layer.id(),
            name: layer.name(),
            features_visited: 0,
            primitives_emitted: 0,
            features_skipped: 0,
            positions_skipped: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Report for a layer that could not be built at all.
    pub fn failed(layer: &impl Layer, err: &LayerError) -> Self {
        let mut report = Self::new(layer);
        report.diagnostics.push(Diagnostic {
            feature: None,
            message: err.to_string(),
        });
        report
    }

    pub(crate) fn skip_feature(&mut self, feature: usize, err: LayerError) {
        warn!(layer = self.name, feature, error = %err, "skipping feature");
        self.features_skipped += 1;
        self.diagnostics.push(Diagnostic {
            feature: Some(feature),
            message: err.to_string(),
        });
    }

    pub(crate) fn skip_position(&mut self, feature: usize, err: LayerError) {
        warn!(layer = self.name, feature, error = %err, "skipping position");
        self.positions_skipped += 1;
        self.diagnostics.push(Diagnostic {
            feature: Some(feature),
            message: err.to_string(),
        });
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}
