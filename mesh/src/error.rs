//! Custom mesh error types.

use thiserror::Error;

use crate::shader::ProgramKind;

/// Errors that can occur while building a [`MeshSpecification`](crate::MeshSpecification).
///
/// The `Display` output is the human-readable message handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    /// Attribute count, stride or offset violates a hardware limit.
    #[error("{0}")]
    Layout(String),
    /// An attribute or varying name is not a plain identifier.
    #[error("{0}")]
    Naming(String),
    /// The shader compiler rejected one of the stages.
    #[error("{}: {diagnostics}", stage.tag())]
    Compilation {
        /// Stage that failed to compile.
        stage: ProgramKind,
        /// Diagnostic text produced by the compiler.
        diagnostics: String,
    },
    /// The compiled program does not honor the custom mesh contract.
    #[error("{0}")]
    Contract(String),
}

impl SpecError {
    pub(crate) fn layout(msg: impl Into<String>) -> Self {
        Self::Layout(msg.into())
    }

    pub(crate) fn contract(msg: impl Into<String>) -> Self {
        Self::Contract(msg.into())
    }
}

/// Errors reported by the [`ShaderCompiler`](crate::shader::ShaderCompiler).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The source could not be parsed.
    #[error("{0}")]
    Parse(String),
    /// The parsed module failed validation.
    #[error("{0}")]
    Validation(String),
    /// `main` exists but its signature does not fit the program kind.
    #[error("{0}")]
    Signature(String),
}
