//! The steps of a scheduled Flow run, in the order a scheduler executes them.
//!
//! Steps share values through an [Exchange](crate::exchange::Exchange) keyed by the run id.

mod extract;
mod notify;
mod pipeline;
mod prepare;

pub use self::extract::{ExtractTask, ExtractTaskError};
pub use self::notify::{NotifyRow, NotifyTask};
pub use self::pipeline::{FlowPipeline, DEFAULT_FLOW_BIN};
pub use self::prepare::{
    BatchConfig, PrepareTask, PreparedInput, DEFAULT_INPUT_FILES, DEFAULT_PREPARED_INPUT_PATH,
};
