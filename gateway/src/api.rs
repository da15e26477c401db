use catalog_core::ToolOutput;
use serde::Serialize;

// Output: what the dispatch cycle submitted for a run
#[derive(Debug, Serialize)]
pub struct DispatchResponse {
    pub run_id: String,
    pub tool_outputs: Vec<ToolOutput>,
}

// Output: why a dispatch cycle could not be completed
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
