//! The spoofing pass.
//!
//! One [`Transformer`] is created per compilation and applied to every
//! source unit. It owns the resolved configuration, the random source and
//! the diagnostic sink; the rest of the work is delegated to the walker.

pub mod config;
pub mod matcher;
pub mod sampler;
pub mod sink;
pub mod synth;
pub mod walker;

pub use config::{DecoderPath, PartialPassConfig, PassConfig};
pub use sampler::{DefaultSampler, RngSampler, Sampler};
pub use sink::{DiagnosticBuffer, DiagnosticSink, NullSink, StderrSink, DIAGNOSTIC_TAG};

use crate::pass::walker::Walker;
use crate::program::Program;
use crate::syntax::factory::NodeFactory;
use crate::syntax::SourceUnit;

/// Build the pass for `program` with default randomness and stderr output.
pub fn create_transformer(program: &Program, overrides: PartialPassConfig) -> Transformer {
    Transformer::with_capabilities(program, overrides, DefaultSampler::from_entropy(), StderrSink)
}

pub struct Transformer<S = DefaultSampler, D = StderrSink> {
    config: PassConfig,
    factory: NodeFactory,
    sampler: S,
    sink: D,
}

impl<S: Sampler, D: DiagnosticSink> Transformer<S, D> {
    pub fn with_capabilities(
        program: &Program,
        overrides: PartialPassConfig,
        sampler: S,
        sink: D,
    ) -> Self {
        Self {
            config: overrides.resolve(),
            factory: program.factory(),
            sampler,
            sink,
        }
    }

    pub fn config(&self) -> &PassConfig {
        &self.config
    }

    pub fn sink(&self) -> &D {
        &self.sink
    }

    /// Rewrite one file. Never fails: malformed markers are left in place.
    pub fn transform_file(&mut self, unit: &SourceUnit) -> SourceUnit {
        let mut walker = Walker::new(
            &self.config,
            self.factory,
            &mut self.sampler,
            &mut self.sink,
            &unit.file_name,
        );
        let statements = walker.visit_statements(&unit.statements);
        self.factory.update_source_unit(unit, statements)
    }
}
