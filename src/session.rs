//! Per-session parameters and re-execution of the pipeline
//!
//! Every parameter change re-runs the whole pipeline. Runs are numbered;
//! only the result of the newest run is kept, so a slow run that finishes
//! after a newer one was started is discarded rather than shown.

use std::sync::Arc;

use crate::config::{ClusterRequest, ViewKind};
use crate::data::Dataset;
use crate::error::PipelineError;
use crate::features::SelectionMode;
use crate::pipeline::{run_pipeline, ClusterOutcome};

pub type RunResult = Result<ClusterOutcome, PipelineError>;

/// Snapshot of the inputs for one run
#[derive(Debug, Clone)]
pub struct RunTicket {
    generation: u64,
    dataset: Arc<Dataset>,
    request: ClusterRequest,
}

impl RunTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn request(&self) -> &ClusterRequest {
        &self.request
    }

    /// Run the pipeline on the snapshot
    pub fn execute(&self) -> RunResult {
        run_pipeline(&self.dataset, &self.request)
    }
}

/// One user's dataset, parameters and latest result
#[derive(Debug)]
pub struct Session {
    dataset: Arc<Dataset>,
    request: ClusterRequest,
    generation: u64,
    latest: Option<RunResult>,
}

impl Session {
    /// Create a session and run the pipeline once with `request`
    pub fn new(dataset: Arc<Dataset>, request: ClusterRequest) -> Self {
        let mut session = Self {
            dataset,
            request,
            generation: 0,
            latest: None,
        };
        session.rerun();
        session
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn request(&self) -> &ClusterRequest {
        &self.request
    }

    /// Number of the newest run started
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Result of the newest completed run
    pub fn latest(&self) -> Option<&RunResult> {
        self.latest.as_ref()
    }

    pub fn set_k(&mut self, k: usize) -> &RunResult {
        self.request.k = k;
        self.rerun()
    }

    /// Replace the feature selection; `None` returns to the default selection
    pub fn set_features(&mut self, features: Option<Vec<String>>) -> &RunResult {
        self.request.features = features;
        self.rerun()
    }

    pub fn set_mode(&mut self, mode: SelectionMode) -> &RunResult {
        self.request.mode = mode;
        self.rerun()
    }

    pub fn set_view(&mut self, view: ViewKind) -> &RunResult {
        self.request.view = view;
        self.rerun()
    }

    /// Swap in a newly loaded dataset, keeping the current parameters
    pub fn replace_dataset(&mut self, dataset: Arc<Dataset>) -> &RunResult {
        self.dataset = dataset;
        self.rerun()
    }

    /// Start a run with the current parameters without executing it
    ///
    /// Any earlier ticket becomes stale.
    pub fn begin_run(&mut self) -> RunTicket {
        self.generation += 1;
        RunTicket {
            generation: self.generation,
            dataset: Arc::clone(&self.dataset),
            request: self.request.clone(),
        }
    }

    /// Record the result of `ticket`; returns `false` if a newer run superseded it
    pub fn complete(&mut self, ticket: &RunTicket, result: RunResult) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(
                stale = ticket.generation,
                current = self.generation,
                "discarding superseded run"
            );
            return false;
        }
        self.latest = Some(result);
        true
    }

    fn rerun(&mut self) -> &RunResult {
        let ticket = self.begin_run();
        let result = ticket.execute();
        self.latest.insert(result)
    }
}
