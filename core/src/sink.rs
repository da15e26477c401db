use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{SubmitToolOutputsRunRequest, ToolsOutputs},
    Client,
};
use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::action::{RequiredAction, RunId, ToolCall, ToolOutput};

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("run '{run_id}' rejected tool outputs: {message}")]
    Rejected { run_id: String, message: String },
    #[error("failed to deliver tool outputs for run '{run_id}': {message}")]
    Transport { run_id: String, message: String },
}

/// Where a finished batch of tool outputs goes.
///
/// Called once per dispatch cycle with the full ordered batch.
/// Retries, if any, belong to the implementation.
#[async_trait]
pub trait ToolOutputSink: Send + Sync {
    async fn submit_tool_outputs(
        &self,
        outputs: &[ToolOutput],
        run_id: &RunId,
    ) -> Result<(), SinkError>;
}

/// Submits outputs to an Assistants API run on one thread.
pub struct OpenAiSink {
    client: Client<OpenAIConfig>,
    thread_id: String,
}

impl OpenAiSink {
    pub fn new(client: Client<OpenAIConfig>, thread_id: impl Into<String>) -> Self {
        Self {
            client,
            thread_id: thread_id.into(),
        }
    }
}

#[async_trait]
impl ToolOutputSink for OpenAiSink {
    async fn submit_tool_outputs(
        &self,
        outputs: &[ToolOutput],
        run_id: &RunId,
    ) -> Result<(), SinkError> {
        let request = SubmitToolOutputsRunRequest {
            tool_outputs: outputs
                .iter()
                .map(|o| ToolsOutputs {
                    tool_call_id: Some(o.tool_call_id.clone()),
                    output: Some(o.output.clone()),
                })
                .collect(),
            ..Default::default()
        };

        let run = self
            .client
            .threads()
            .runs(&self.thread_id)
            .submit_tool_outputs(run_id.as_str(), request)
            .await
            .map_err(|e| match e {
                OpenAIError::ApiError(api) => SinkError::Rejected {
                    run_id: run_id.to_string(),
                    message: api.message,
                },
                other => SinkError::Transport {
                    run_id: run_id.to_string(),
                    message: other.to_string(),
                },
            })?;

        info!("Run '{}' accepted {} tool outputs", run.id, outputs.len());
        Ok(())
    }
}

/// Logs outputs instead of delivering them (`OUTPUT_SINK=log`).
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl ToolOutputSink for LogSink {
    async fn submit_tool_outputs(
        &self,
        outputs: &[ToolOutput],
        run_id: &RunId,
    ) -> Result<(), SinkError> {
        for output in outputs {
            info!(
                run_id = %run_id,
                tool_call_id = %output.tool_call_id,
                "{}",
                output.output
            );
        }
        Ok(())
    }
}

impl From<async_openai::types::RequiredAction> for RequiredAction {
    fn from(action: async_openai::types::RequiredAction) -> Self {
        RequiredAction::new(
            action
                .submit_tool_outputs
                .tool_calls
                .into_iter()
                .map(|call| ToolCall::new(call.id, call.function.name, call.function.arguments))
                .collect(),
        )
    }
}
