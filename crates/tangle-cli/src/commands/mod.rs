pub mod analyze;
pub mod dataset;
pub mod pipeline;
pub mod trace;

pub use analyze::AnalyzeArgs;
pub use dataset::DatasetArgs;
pub use pipeline::PipelineArgs;
pub use trace::TraceArgs;
