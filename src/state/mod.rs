// src/state/mod.rs
use eframe::egui;
use tracing::info;

use crate::api::ApiError;
use crate::model::{AnalysisResult, AssumptionSet, UploadedFile};

/// The dashboard's only data-driven state machine. The payload lives on
/// `Populated` alone, so "analyzing while showing a stale report" is
/// unrepresentable.
#[derive(Debug)]
pub enum ViewState {
    NoData,
    Analyzing,
    Populated(Box<AnalysisResult>),
}

/// Which statement layout is rendered. Pure presentation: both layouts
/// project from the same monthly records, so switching never refetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Management,
    Schedule3,
}

impl ViewMode {
    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Management => "Management View",
            ViewMode::Schedule3 => "Schedule III View",
        }
    }
}

// Core application state
pub struct AppState {
    pub view: ViewState,
    pub uploaded: Option<UploadedFile>,
    pub assumptions: AssumptionSet,

    // Minimal UI state
    pub view_mode: ViewMode,
    pub expanded_opex: bool,
    pub error_message: Option<String>,

    /// Rectangle of the rendered report, recorded every frame while
    /// populated; the export capture crops to it.
    pub report_rect: Option<egui::Rect>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            view: ViewState::NoData,
            uploaded: None,
            assumptions: AssumptionSet::default(),
            view_mode: ViewMode::Management,
            expanded_opex: false,
            error_message: None,
            report_rect: None,
        }
    }

    pub fn is_analyzing(&self) -> bool {
        matches!(self.view, ViewState::Analyzing)
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match &self.view {
            ViewState::Populated(result) => Some(result),
            _ => None,
        }
    }

    /// Enters `Analyzing`, blanking any currently displayed report. A
    /// re-run therefore loses the prior view until the new result lands;
    /// see DESIGN.md for the rationale.
    pub fn begin_analysis(&mut self, file: UploadedFile) {
        self.uploaded = Some(file);
        self.view = ViewState::Analyzing;
    }

    /// Applies the outcome of a finished analysis call. Failure reverts to
    /// the upload screen with a user-visible message; the uploaded file is
    /// kept so the user can re-run without picking it again.
    pub fn finish_analysis(&mut self, outcome: Result<AnalysisResult, ApiError>) {
        match outcome {
            Ok(result) => {
                info!(months = result.three_way_model.len(), "analysis complete");
                self.view = ViewState::Populated(Box::new(result));
            }
            Err(err) => {
                self.view = ViewState::NoData;
                self.report_rect = None;
                self.error_message = Some(err.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn analyzing_state() -> AppState {
        let mut state = AppState::new();
        state.begin_analysis(UploadedFile {
            name: "ledger.csv".to_string(),
            bytes: vec![1, 2, 3],
        });
        state
    }

    #[test]
    fn upload_enters_analyzing() {
        let state = analyzing_state();
        assert!(state.is_analyzing());
        assert!(state.uploaded.is_some());
    }

    #[test]
    fn failure_reverts_to_no_data_with_message() {
        let mut state = analyzing_state();
        state.finish_analysis(Err(ApiError::Backend("unsupported file".to_string())));
        assert!(matches!(state.view, ViewState::NoData));
        assert_eq!(state.error_message.as_deref(), Some("unsupported file"));
        // File survives a failed run so a re-run needs no new pick.
        assert!(state.uploaded.is_some());
    }

    #[test]
    fn view_mode_switch_does_not_touch_the_result() {
        let mut state = AppState::new();
        state.view_mode = ViewMode::Schedule3;
        assert!(state.result().is_none());
        assert_eq!(state.view_mode.label(), "Schedule III View");
    }
}
