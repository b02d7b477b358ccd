// src/api/mod.rs
//
// Client for the FinCast analysis backend. One multipart POST per run: the
// raw ledger bytes plus the JSON-encoded assumption overrides. The call is
// blocking, so it runs on a worker thread and reports back over a channel
// polled by the UI loop.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui;
use reqwest::blocking::{multipart, Client};
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

use crate::config::ApiConfig;
use crate::model::{AnalysisResult, AssumptionSet, UploadedFile};

#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend rejected the request; the message is its `detail` field
    /// when one was provided, and is shown to the user verbatim.
    #[error("{0}")]
    Backend(String),
    #[error("could not reach the analysis service: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("the analysis service returned an unreadable response: {0}")]
    Decode(#[source] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// Maps a raw HTTP outcome onto the result contract: 2xx bodies decode to
/// an [`AnalysisResult`], everything else surfaces the backend's `detail`
/// string when present.
pub fn decode_response(status: StatusCode, body: &str) -> Result<AnalysisResult, ApiError> {
    if !status.is_success() {
        let detail = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|e| e.detail)
            .unwrap_or_else(|| format!("analysis failed with status {status}"));
        return Err(ApiError::Backend(detail));
    }
    serde_json::from_str(body).map_err(ApiError::Decode)
}

pub struct AnalysisClient {
    endpoint: String,
    http: Client,
}

impl AnalysisClient {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            endpoint: config.analyze_endpoint(),
            http: Client::new(),
        }
    }

    pub fn analyze(
        &self,
        file: &UploadedFile,
        assumptions: &AssumptionSet,
    ) -> Result<AnalysisResult, ApiError> {
        let payload = serde_json::to_string(assumptions).map_err(ApiError::Decode)?;
        let form = multipart::Form::new()
            .part(
                "file",
                multipart::Part::bytes(file.bytes.clone()).file_name(file.name.clone()),
            )
            .text("assumptions", payload);

        info!(file = %file.name, endpoint = %self.endpoint, "submitting ledger for analysis");
        let response = self.http.post(&self.endpoint).multipart(form).send()?;
        let status = response.status();
        let body = response.text()?;
        decode_response(status, &body)
    }
}

/// Handle to an in-flight analysis call. Dropping it detaches the worker;
/// there is no cancellation, the request runs to completion either way.
pub struct PendingAnalysis {
    rx: Receiver<Result<AnalysisResult, ApiError>>,
}

impl PendingAnalysis {
    /// Non-blocking check for a finished call.
    pub fn poll(&self) -> Option<Result<AnalysisResult, ApiError>> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(ApiError::Backend(
                "the analysis worker stopped unexpectedly".to_string(),
            ))),
        }
    }
}

/// Runs one analysis call on a worker thread. The egui context is woken
/// when the result lands so the UI notices without continuous repainting.
pub fn spawn_analysis(
    config: &ApiConfig,
    file: UploadedFile,
    assumptions: AssumptionSet,
    ctx: egui::Context,
) -> PendingAnalysis {
    let client = AnalysisClient::new(config);
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let outcome = client.analyze(&file, &assumptions);
        if let Err(err) = &outcome {
            error!(%err, "analysis request failed");
        }
        let _ = tx.send(outcome);
        ctx.request_repaint();
    });
    PendingAnalysis { rx }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn backend_detail_is_surfaced_verbatim() {
        let err = decode_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"detail":"unsupported file"}"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "unsupported file");
    }

    #[test]
    fn missing_detail_falls_back_to_generic_message() {
        let err = decode_response(StatusCode::BAD_GATEWAY, "<html>oops</html>").unwrap_err();
        assert_eq!(err.to_string(), "analysis failed with status 502 Bad Gateway");
    }

    #[test]
    fn garbled_success_body_is_a_decode_error() {
        let err = decode_response(StatusCode::OK, "not json").unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }
}
