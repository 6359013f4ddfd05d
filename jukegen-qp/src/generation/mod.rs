//! Background processes that feed and drive the queue

pub mod auto_adder;
pub mod pipeline;

pub use auto_adder::AutoAdder;
pub use pipeline::{GenerationPipeline, PipelineConfig};
