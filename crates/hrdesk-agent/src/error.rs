// ABOUTME: TurnError, the single error value a failed turn surfaces to its caller.
// ABOUTME: Tool failures never appear here; workers narrate them instead.

use hrdesk_core::WorkerId;

use crate::llm::LlmError;

#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    /// The routing step produced something outside the closed decision set.
    #[error("routing classification failed: {0}")]
    Classification(String),

    /// The graph ran out of steps. `worker_answered` records whether any
    /// worker had produced an answer before the ceiling was hit.
    #[error("turn exceeded the step limit of {limit} ({})", step_limit_reason(.worker_answered))]
    StepLimit { limit: usize, worker_answered: bool },

    /// The supervisor's classification call failed at the provider.
    #[error("language model failed during routing: {0}")]
    Llm(#[from] LlmError),

    /// A worker's model call failed. Tool failures never land here.
    #[error("{worker} failed: {source}")]
    Worker {
        worker: WorkerId,
        #[source]
        source: LlmError,
    },
}

fn step_limit_reason(worker_answered: &bool) -> &'static str {
    if *worker_answered {
        "a worker answered but routing did not finish"
    } else {
        "no worker ever finished"
    }
}
