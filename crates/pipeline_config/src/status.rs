//! Pipeline lifecycle status as reported by the orchestration service.
//!
//! The service owns the state machine; this type only reflects what it says.

closed_enum! {
    /// Last known lifecycle state of a deployed pipeline.
    pub enum PipelineStatus("pipeline status") {
        Created => "Created",
        Running => "Running",
        Resuming => "Resuming",
        Stopping => "Stopping",
        Stopped => "Stopped",
        Terminating => "Terminating",
        Terminated => "Terminated",
        Failed => "Failed",
        Deleted => "Deleted",
    }
}

impl PipelineStatus {
    /// The pipeline will not change state again on its own.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminated | Self::Failed | Self::Deleted)
    }

    /// The service is moving the pipeline between two stable states.
    pub fn is_transitional(&self) -> bool {
        matches!(self, Self::Resuming | Self::Stopping | Self::Terminating)
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
