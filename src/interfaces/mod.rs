pub mod tool;

pub use tool::{handle_tool_call, run_metadata_tool, MetadataRequest, ToolResponse};
