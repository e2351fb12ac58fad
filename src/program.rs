//! The compilation handle.
//!
//! A [`Program`] owns the parsed source units of one compilation and the
//! node factory they share. The pass is created from it and then applied to
//! each unit in turn.

use crate::errors::SpoofError;
use crate::pass::{DiagnosticSink, Sampler, Transformer};
use crate::syntax::factory::NodeFactory;
use crate::syntax::parser;
use crate::syntax::SourceUnit;

#[derive(Debug, Clone, Default)]
pub struct Program {
    files: Vec<SourceUnit>,
    factory: NodeFactory,
}

impl Program {
    pub fn new(files: Vec<SourceUnit>) -> Self {
        Self {
            files,
            factory: NodeFactory::new(),
        }
    }

    /// Parse `(file name, source text)` pairs; the first parse error wins.
    pub fn parse_sources<'s, I>(sources: I) -> Result<Self, SpoofError>
    where
        I: IntoIterator<Item = (&'s str, &'s str)>,
    {
        let files = sources
            .into_iter()
            .map(|(name, text)| parser::parse(text, name))
            .collect::<Result<_, _>>()?;
        Ok(Self::new(files))
    }

    pub fn files(&self) -> &[SourceUnit] {
        &self.files
    }

    pub fn factory(&self) -> NodeFactory {
        self.factory
    }

    pub fn source_unit(&self, file_name: &str) -> Option<&SourceUnit> {
        self.files.iter().find(|unit| unit.file_name == file_name)
    }

    /// Run `transformer` over every file, in order.
    pub fn emit<S: Sampler, D: DiagnosticSink>(
        &self,
        transformer: &mut Transformer<S, D>,
    ) -> Vec<SourceUnit> {
        self.files
            .iter()
            .map(|unit| transformer.transform_file(unit))
            .collect()
    }
}
