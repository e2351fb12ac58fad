//! Defines the command-line arguments and subcommands for the spoof CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::pass::{DecoderPath, PartialPassConfig};

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "spoof",
    version,
    about = "Compile-time string and enum spoofing for TypeScript sources."
)]
pub struct SpoofArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Rewrite marker calls and spoof enums in one compilation.
    Transform(TransformArgs),
    /// Parse and pretty-print a file without rewriting it.
    Format {
        /// The path to the TypeScript file to format.
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Show the syntax tree of a file as JSON.
    Ast {
        /// The path to the TypeScript file to parse.
        #[arg(required = true)]
        file: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct TransformArgs {
    /// Files or directories; directories are searched for `.ts`/`.tsx` files.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Write results here, mirroring the input layout, instead of stdout.
    #[arg(long, value_name = "DIR", conflicts_with = "diff")]
    pub out_dir: Option<PathBuf>,

    /// JSON file with pass options (camelCase keys).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Suppress diagnostics about malformed markers.
    #[arg(short, long)]
    pub quiet: bool,

    /// Leave `_spoof` enums untouched.
    #[arg(long)]
    pub no_spoof_enum: bool,

    /// Disable the one-argument `$spoof("s")` form.
    #[arg(long)]
    pub no_per_character: bool,

    /// Disable the two-argument `$spoof("s", n)` form.
    #[arg(long)]
    pub no_shared_offset: bool,

    /// Runtime decoder callee, e.g. `string.char`.
    #[arg(long, value_name = "PATH")]
    pub decoder: Option<DecoderPath>,

    /// Seed the random source for reproducible output.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print a colored diff of each file instead of the rewritten source.
    #[arg(long)]
    pub diff: bool,
}

impl TransformArgs {
    /// Overrides expressed by the flags; unset flags leave fields empty.
    pub fn overrides(&self) -> PartialPassConfig {
        let off = |flag: bool| flag.then_some(false);
        PartialPassConfig {
            verbose: off(self.quiet),
            spoof_enum: off(self.no_spoof_enum),
            per_character_offsets: off(self.no_per_character),
            shared_offset: off(self.no_shared_offset),
            decoder: self.decoder.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_become_overrides() {
        let args = SpoofArgs::parse_from([
            "spoof",
            "transform",
            "src",
            "--quiet",
            "--no-shared-offset",
            "--decoder",
            "utf8.char",
        ]);
        let Command::Transform(transform) = args.command else {
            panic!("expected transform");
        };
        let overrides = transform.overrides();
        assert_eq!(overrides.verbose, Some(false));
        assert_eq!(overrides.shared_offset, Some(false));
        assert_eq!(overrides.spoof_enum, None);
        assert_eq!(overrides.decoder.unwrap().to_string(), "utf8.char");
    }

    #[test]
    fn bad_decoder_is_rejected_by_the_parser() {
        let result = SpoofArgs::try_parse_from(["spoof", "transform", "a.ts", "--decoder", "1x"]);
        assert!(result.is_err());
    }

    #[test]
    fn diff_and_out_dir_are_exclusive() {
        let err = SpoofArgs::try_parse_from([
            "spoof",
            "transform",
            "a.ts",
            "--diff",
            "--out-dir",
            "out",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }
}
