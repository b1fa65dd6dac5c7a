//! Pipeline Runner: initializes stages and feeds them events in order
use crate::context::StageContext;
use crate::error::{UnpackError, UnpackResult};
use crate::event::RawEvent;
use crate::stage::Stage;
use serde_json::Value;
use tracing::{debug, error, info, warn};

pub struct PipelineRunner {
    stages: Vec<(Box<dyn Stage>, Value)>,
    ctx: StageContext,
    pipeline_id: String,
    initialized: bool,
    events: u64,
    failed: u64,
}

impl PipelineRunner {
    /// Builds a runner from stages paired with their parameter blocks.
    pub fn new(stages: Vec<(Box<dyn Stage>, Value)>, ctx: StageContext) -> Self {
        let pipeline_id = stages
            .iter()
            .map(|(s, _)| s.name())
            .collect::<Vec<_>>()
            .join("→");

        Self {
            stages,
            ctx,
            pipeline_id,
            initialized: false,
            events: 0,
            failed: 0,
        }
    }

    /// Initializes every stage in order; the first failure aborts startup.
    pub fn init(&mut self) -> UnpackResult<()> {
        for (stage, parameters) in &mut self.stages {
            debug!(stage = stage.name(), trace_id = %self.ctx.trace_id, "initializing stage");
            if let Err(e) = stage.init(parameters) {
                error!(stage = stage.name(), error = %e, "stage failed to initialize");
                return Err(e);
            }
        }
        self.initialized = true;
        info!(pipeline = %self.pipeline_id, stages = self.stages.len(), "pipeline ready");
        Ok(())
    }

    /// Passes one event through every stage.
    pub fn process_event(&mut self, event: &mut dyn RawEvent) -> UnpackResult<()> {
        if !self.initialized {
            return Err(UnpackError::config(format!(
                "pipeline '{}' used before init",
                self.pipeline_id
            )));
        }

        for (stage, _) in &mut self.stages {
            stage.process_event(event, &self.ctx)?;
        }
        self.events += 1;
        Ok(())
    }

    /// Processes events until the source is exhausted.
    ///
    /// A per-event error drops that event and the run goes on; only fatal
    /// errors end it. Returns how many events went through every stage.
    pub fn run<'a, I>(&mut self, events: I) -> UnpackResult<u64>
    where
        I: IntoIterator<Item = &'a mut dyn RawEvent>,
    {
        let start = self.events;
        for event in events {
            let serial = event.serial_number();
            match self.process_event(event) {
                Ok(()) => {}
                Err(e) if !e.is_fatal() => {
                    warn!(pipeline = %self.pipeline_id, serial, error = %e, "event failed; continuing");
                    self.failed += 1;
                }
                Err(e) => {
                    error!(pipeline = %self.pipeline_id, serial, error = %e, "aborting run");
                    return Err(e);
                }
            }
        }
        Ok(self.events - start)
    }

    pub fn shutdown(&mut self) {
        for (stage, _) in &mut self.stages {
            stage.shutdown();
        }
        self.initialized = false;
        info!(pipeline = %self.pipeline_id, events = self.events, "pipeline shut down");
    }

    pub fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    pub fn events_processed(&self) -> u64 {
        self.events
    }

    /// Events dropped by [`PipelineRunner::run`] after a per-event error.
    pub fn events_failed(&self) -> u64 {
        self.failed
    }

    pub fn context(&self) -> &StageContext {
        &self.ctx
    }
}
