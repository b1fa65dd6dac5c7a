//! Stage Trait: lifecycle contract shared by every pipeline stage
use crate::context::StageContext;
use crate::error::UnpackResult;
use crate::event::RawEvent;
use serde_json::Value;

/// Lifecycle of a stage as driven by the host.
///
/// `init` runs once with the stage's parameter block. `process_event` then
/// runs once per event, in arrival order. `shutdown` releases whatever the
/// stage acquired during `init`.
pub trait Stage: Send {
    /// Fixed identity reported to the host (ex: "CustomMidasUnpackerStage")
    fn name(&self) -> &'static str;

    /// Reads configuration and acquires resources. Errors are fatal.
    fn init(&mut self, parameters: &Value) -> UnpackResult<()>;

    /// Handles one event.
    fn process_event(&mut self, event: &mut dyn RawEvent, ctx: &StageContext) -> UnpackResult<()>;

    fn shutdown(&mut self) {}
}
