pub mod action;
pub mod catalog;
pub mod handler;
pub mod settings;
pub mod sink;
pub mod tools;

pub use action::{RequiredAction, RunId, ToolCall, ToolOutput};
pub use catalog::{Catalog, ProductRecord, Stock};
pub use handler::{DispatchError, EventHandler};
pub use sink::{LogSink, OpenAiSink, SinkError, ToolOutputSink};
