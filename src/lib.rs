//! STRling Core Library
//!
//! This is the Rust implementation of the STRling DSL compiler: a pipeline
//! that parses STRling pattern text into an AST, lowers it to a validated
//! IR, and emits a PCRE2-compatible regex string with an inline-flag
//! prefix. Each stage is pure and returns either its artifact or a single
//! instructional diagnostic.
//!
//! ```
//! use strling_core::compile_dsl;
//!
//! let regex = compile_dsl(r"(?<word>\w+)").unwrap();
//! assert_eq!(regex, "(?<word>\\w+)");
//! ```
//!
//! # Modules
//!
//! - `core`: parser, compiler, AST/IR data model, diagnostics
//! - `emitters`: target-dialect serializers (PCRE2)

pub mod core;
pub mod emitters;

// Re-export commonly used types for convenience
pub use core::compiler::{compile, Compiler};
pub use core::errors::{ErrorKind, STRlingError};
pub use core::ir::IROp;
pub use core::nodes::{Flags, Node};
pub use core::parser::parse;
pub use emitters::pcre2::{emit_pcre2, PCRE2Emitter};

/// Run the full pipeline: parse, compile, emit.
///
/// A strict composition of [`parse`], [`compile`] and [`emit_pcre2`]; the
/// first diagnostic from any stage is returned unchanged.
pub fn compile_dsl(text: &str) -> Result<String, STRlingError> {
    let (flags, ast) = parse(text)?;
    let ir = compile(&ast)?;
    Ok(emit_pcre2(&ir, &flags))
}
