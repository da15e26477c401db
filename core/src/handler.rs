use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::action::{decode_arguments, RequiredAction, RunId, ToolCall, ToolOutput};
use crate::catalog::Catalog;
use crate::sink::{SinkError, ToolOutputSink};
use crate::tools::{self, Tool};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Answers the runtime's `requires_action` events.
///
/// Holds only the shared read-only catalog and the injected sink, so one
/// handler can serve many runs at once.
#[derive(Clone)]
pub struct EventHandler {
    catalog: Arc<Catalog>,
    sink: Arc<dyn ToolOutputSink>,
}

impl EventHandler {
    pub fn new(catalog: Arc<Catalog>, sink: Arc<dyn ToolOutputSink>) -> Self {
        Self { catalog, sink }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Resolves every call in order and submits the whole batch once.
    ///
    /// Individual calls never fail the batch; only the submission can.
    pub async fn handle_requires_action(
        &self,
        action: &RequiredAction,
        run_id: &RunId,
    ) -> Result<Vec<ToolOutput>, DispatchError> {
        let calls = action.tool_calls();
        info!("Run '{}' requires {} tool outputs", run_id, calls.len());

        let mut cycle = DispatchCycle::with_capacity(calls.len());
        for call in calls {
            cycle.push(call, self.resolve_call(call));
        }

        let outputs = cycle.submit(self.sink.as_ref(), run_id).await?;
        Ok(outputs)
    }

    pub fn resolve_call(&self, call: &ToolCall) -> String {
        let function_name = call.function_name();

        let Some(tool) = Tool::from_name(function_name) else {
            warn!("Tool call '{}' names unknown tool '{}'", call.call_id(), function_name);
            return tools::unsupported(function_name);
        };

        // Terminal signal: no arguments, no catalog
        if tool == Tool::End {
            info!("Tool call '{}' ended the interaction", call.call_id());
            return tools::INTERACTION_ENDED.to_string();
        }

        match decode_arguments(&call.function.arguments) {
            Ok(args) => {
                let output = tools::resolve(tool, &args, &self.catalog);
                debug!("{} -> {}", function_name, output);
                output
            }
            Err(e) => {
                warn!("Tool call '{}' has bad arguments: {}", call.call_id(), e);
                tools::invalid_arguments(function_name)
            }
        }
    }
}

// Outputs collected for one batch. Submitting consumes the cycle, so a batch
// reaches the sink at most once and only as a whole.
struct DispatchCycle {
    outputs: Vec<ToolOutput>,
}

impl DispatchCycle {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            outputs: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, call: &ToolCall, output: String) {
        self.outputs.push(ToolOutput {
            tool_call_id: call.id.clone(),
            output,
        });
    }

    async fn submit(
        self,
        sink: &dyn ToolOutputSink,
        run_id: &RunId,
    ) -> Result<Vec<ToolOutput>, SinkError> {
        if let Err(e) = sink.submit_tool_outputs(&self.outputs, run_id).await {
            warn!("Submitting outputs for run '{}' failed: {}", run_id, e);
            return Err(e);
        }
        Ok(self.outputs)
    }
}
