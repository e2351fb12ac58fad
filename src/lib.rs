//! # Spoof
//!
//! A compile-time rewriting pass for TypeScript sources. Marker calls and
//! `_spoof` enums are replaced with syntax that rebuilds the same values at
//! runtime, so the literal text never appears in the compiled output.
//!
//! ```text
//! $spoof("hi")        =>  string.char(...[109, 3].map((x, i) => { return x - [5, -102][i]; }))
//! $spoof("hi", 7)     =>  string.char(...[111, 112].map((x) => x - 7))
//! $uuid()             =>  "8f0d4c7e-2c4b-4f57-9a43-9a3c1d2b7e10"
//! enum Keys_spoof {A} =>  enum Keys_spoof { A = "<uuid>" }
//! ```
//!
//! ## Pipeline
//!
//! - `syntax`: immutable tree, node factory, pest parser and printer for the
//!   supported TypeScript subset.
//! - `program`: the compilation handle holding every parsed source unit.
//! - `pass`: matcher, synthesizer, walker and the per-compilation
//!   `Transformer` that drives them.
//! - `cli`: the `spoof` command line.

pub use crate::errors::{SourceContext, SpoofError};
pub use crate::pass::{create_transformer, PartialPassConfig, PassConfig, Transformer};
pub use crate::program::Program;

pub mod cli;
pub mod errors;
pub mod pass;
pub mod program;
pub mod syntax;
