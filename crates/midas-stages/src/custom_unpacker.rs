//! Custom unpacker stage: runs a configured unpacker on every event and
//! publishes what it decoded as data products.
use crate::assembler::{AssemblyStats, CollectionAssembler};
use crate::config::UnpackerConfig;
use crate::publisher::BatchPublisher;
use midas_core::{
    EventUnpacker, RawEvent, SkipReason, Stage, StageContext, UnpackError, UnpackResult,
};
use midas_registry::{create_global, UnpackerRegistry};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, warn};

pub const STAGE_NAME: &str = "CustomMidasUnpackerStage";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StageState {
    Uninitialized,
    Initialized,
    Processing,
    Closed,
}

/// Running totals over the lifetime of a stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StageStats {
    pub events_processed: u64,
    pub events_skipped: u64,
    pub events_failed: u64,
    pub batches_published: u64,
    pub products_published: u64,
    pub objects_published: u64,
    pub skipped_labels: u64,
    pub null_objects: u64,
    pub clone_failures: u64,
}

impl StageStats {
    fn record(&mut self, assembly: &AssemblyStats) {
        self.skipped_labels += assembly.skipped_labels as u64;
        self.null_objects += assembly.null_objects as u64;
        self.clone_failures += assembly.clone_failures as u64;
    }
}

enum RegistrySource {
    Global,
    Scoped(Arc<UnpackerRegistry>),
}

pub struct CustomMidasUnpackerStage {
    registry: RegistrySource,
    unpacker: Option<Box<dyn EventUnpacker>>,
    unpacker_class: String,
    assembler: CollectionAssembler,
    publisher: BatchPublisher,
    state: StageState,
    stats: StageStats,
}

impl Default for CustomMidasUnpackerStage {
    fn default() -> Self {
        Self::new()
    }
}

impl CustomMidasUnpackerStage {
    /// Stage resolving its unpacker through the process-wide registry.
    pub fn new() -> Self {
        Self::with_source(RegistrySource::Global)
    }

    /// Stage resolving its unpacker through `registry`.
    pub fn with_registry(registry: Arc<UnpackerRegistry>) -> Self {
        Self::with_source(RegistrySource::Scoped(registry))
    }

    fn with_source(registry: RegistrySource) -> Self {
        Self {
            registry,
            unpacker: None,
            unpacker_class: String::new(),
            assembler: CollectionAssembler::new(),
            publisher: BatchPublisher::new(),
            state: StageState::Uninitialized,
            stats: StageStats::default(),
        }
    }

    pub fn state(&self) -> StageState {
        self.state
    }

    pub fn stats(&self) -> &StageStats {
        &self.stats
    }

    /// Class name read from configuration; empty before `init`.
    pub fn unpacker_class(&self) -> &str {
        &self.unpacker_class
    }

    pub fn has_unpacker(&self) -> bool {
        self.unpacker.is_some()
    }

    fn resolve(&self, class_name: &str) -> UnpackResult<Box<dyn EventUnpacker>> {
        match &self.registry {
            RegistrySource::Global => create_global(class_name),
            RegistrySource::Scoped(registry) => registry.create(class_name),
        }
    }
}

impl Stage for CustomMidasUnpackerStage {
    fn name(&self) -> &'static str {
        STAGE_NAME
    }

    fn init(&mut self, parameters: &Value) -> UnpackResult<()> {
        debug!(stage = STAGE_NAME, "starting initialization");
        if self.state != StageState::Uninitialized {
            return Err(UnpackError::config(format!(
                "{STAGE_NAME} initialized twice (state {:?})",
                self.state
            )));
        }

        let config = UnpackerConfig::from_parameters(parameters).map_err(|e| {
            error!(stage = STAGE_NAME, error = %e, "missing or invalid 'unpacker_class' config");
            e
        })?;
        debug!(stage = STAGE_NAME, unpacker = %config.unpacker_class, "unpacker class from config");

        let unpacker = self.resolve(&config.unpacker_class)?;

        debug!(stage = STAGE_NAME, unpacker = %config.unpacker_class, "instantiated unpacker");
        self.unpacker = Some(unpacker);
        self.unpacker_class = config.unpacker_class;
        self.state = StageState::Initialized;
        Ok(())
    }

    fn process_event(&mut self, event: &mut dyn RawEvent, ctx: &StageContext) -> UnpackResult<()> {
        let serial = event.serial_number();
        let Some(unpacker) = self.unpacker.as_mut() else {
            warn!(stage = STAGE_NAME, serial, reason = %SkipReason::MissingUnpacker, "no unpacker instantiated; skipping event");
            self.stats.events_skipped += 1;
            return Ok(());
        };
        self.state = StageState::Processing;

        event.find_all_banks();
        debug!(stage = STAGE_NAME, serial, banks = event.banks().len(), "found banks");

        if let Err(e) = unpacker.unpack_event(event) {
            self.stats.events_failed += 1;
            return Err(UnpackError::unpack(&self.unpacker_class, e));
        }

        let collections = unpacker.collections();
        debug!(
            stage = STAGE_NAME,
            unpacker = %self.unpacker_class,
            serial,
            collections = collections.len(),
            "unpacked event"
        );

        let assembly = self.assembler.assemble(collections);
        self.stats.record(&assembly.stats);

        let objects = assembly.batch.object_count() as u64;
        let published = match self.publisher.publish(ctx.products(), assembly.batch) {
            Ok(published) => published,
            Err(e) => {
                self.stats.events_failed += 1;
                return Err(e);
            }
        };
        self.stats.events_processed += 1;
        if published > 0 {
            self.stats.batches_published += 1;
            self.stats.products_published += published as u64;
            self.stats.objects_published += objects;
        }
        Ok(())
    }

    fn shutdown(&mut self) {
        if self.unpacker.take().is_some() {
            debug!(stage = STAGE_NAME, unpacker = %self.unpacker_class, "released unpacker");
        }
        self.state = StageState::Closed;
    }
}
