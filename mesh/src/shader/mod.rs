//! Shader compilation for custom mesh stages.
//!
//! Custom mesh stages are written in WGSL and compiled through naga. A stage is
//! a plain module whose `main` function is the stage entry point:
//!
//! ```wgsl
//! // vertex
//! fn main(attributes: Attributes) -> Varyings { ... }
//!
//! // fragment, optional color output and optional local coordinates
//! fn main(varyings: Varyings, color: ptr<function, vec4<f16>>) -> vec2<f32> { ... }
//! ```
//!
//! # Overview
//!
//! - [`ShaderCompiler`] - Shared compiler service, parses and validates programs
//! - [`CompiledProgram`] - Validated naga module plus the exact source it came from
//! - [`ShaderLibrary`] - Built-in modules appended to every program
//! - [`StructDecl`] - Synthesized `Attributes` / `Varyings` declarations
//!
//! # Example
//!
//! ```ignore
//! let compiler = Arc::new(ShaderCompiler::new());
//! let program = compiler.compile(source, ProgramKind::Fragment, &CompileSettings::restricted())?;
//! assert!(program.has_main());
//! ```

pub mod analysis;
pub mod library;
pub mod structs;

use std::sync::atomic::{AtomicUsize, Ordering};

use naga::valid::{Capabilities, ValidationFlags, Validator};

use crate::error::CompileError;
use crate::profile_scope;

pub use library::{COLOR_TRANSFORM_INTRINSICS, ShaderLibrary};
pub use structs::{ATTRIBUTES_STRUCT, StageSources, StructDecl, VARYINGS_STRUCT, synthesize_sources};

/// Name of the stage entry point.
pub const MAIN_FUNCTION: &str = "main";

/// Directives that must precede every declaration in a program.
///
/// They share the first line with the program text, so line numbers in
/// diagnostics are the caller's own.
const PRELUDE_DIRECTIVES: &str = "enable f16; ";

/// Kind of program being compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgramKind {
    /// Custom mesh vertex stage.
    Vertex,
    /// Custom mesh fragment stage.
    Fragment,
}

impl ProgramKind {
    /// Short tag used to prefix compiler diagnostics.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Vertex => "VS",
            Self::Fragment => "FS",
        }
    }

    /// Human-readable stage name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Vertex => "Vertex",
            Self::Fragment => "Fragment",
        }
    }
}

/// Settings for a single compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileSettings {
    /// Restrict the program to the lowest common denominator of supported
    /// hardware. Only half-precision floats are allowed beyond the core language.
    pub enforce_restricted_profile: bool,
}

impl CompileSettings {
    /// Settings used for custom mesh stages.
    pub fn restricted() -> Self {
        Self {
            enforce_restricted_profile: true,
        }
    }

    /// Settings that allow every capability naga knows about.
    pub fn unrestricted() -> Self {
        Self {
            enforce_restricted_profile: false,
        }
    }

    fn capabilities(&self) -> Capabilities {
        if self.enforce_restricted_profile {
            Capabilities::SHADER_FLOAT16
        } else {
            Capabilities::all()
        }
    }
}

impl Default for CompileSettings {
    fn default() -> Self {
        Self::restricted()
    }
}

/// A parsed and validated program.
///
/// Holds the exact text handed to naga (directives and library included), which is
/// what identifies the program's behavior.
#[derive(Debug)]
pub struct CompiledProgram {
    kind: ProgramKind,
    source: String,
    module: naga::Module,
    info: naga::valid::ModuleInfo,
}

impl CompiledProgram {
    /// Get the program kind.
    pub fn kind(&self) -> ProgramKind {
        self.kind
    }

    /// Get the final source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Get the naga module.
    pub fn module(&self) -> &naga::Module {
        &self.module
    }

    /// Get the validation info for the module.
    pub fn info(&self) -> &naga::valid::ModuleInfo {
        &self.info
    }

    /// Find a module-level function by name.
    pub fn function(&self, name: &str) -> Option<&naga::Function> {
        self.module
            .functions
            .iter()
            .map(|(_, function)| function)
            .find(|function| function.name.as_deref() == Some(name))
    }

    /// Get the entry point, if declared.
    pub fn main(&self) -> Option<&naga::Function> {
        self.function(MAIN_FUNCTION)
    }

    /// Check whether the program declares an entry point.
    pub fn has_main(&self) -> bool {
        self.main().is_some()
    }

    /// Resolve a type handle.
    pub fn type_inner(&self, ty: naga::Handle<naga::Type>) -> &naga::TypeInner {
        &self.module.types[ty].inner
    }

    /// Get the declared name of a type, if it has one.
    pub fn type_name(&self, ty: naga::Handle<naga::Type>) -> Option<&str> {
        self.module.types[ty].name.as_deref()
    }

    /// Check whether any function calls one of the given functions.
    pub fn calls_any(&self, names: &[&str]) -> bool {
        analysis::calls_any(&self.module, names)
    }

    /// Check whether the program calls a color transform intrinsic.
    pub fn calls_color_transform_intrinsics(&self) -> bool {
        self.calls_any(&COLOR_TRANSFORM_INTRINSICS)
    }
}

/// Shared compiler service for custom mesh programs.
///
/// Compilation is expensive, so one instance is created and shared as
/// `Arc<ShaderCompiler>` by everything that builds specifications. The
/// compiler keeps no per-compile state, so concurrent compiles from several
/// threads are fine.
#[derive(Debug)]
pub struct ShaderCompiler {
    library: ShaderLibrary,
    library_source: String,
    compile_count: AtomicUsize,
}

impl Default for ShaderCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaderCompiler {
    /// Create a compiler with the standard library.
    pub fn new() -> Self {
        Self::with_library(ShaderLibrary::standard())
    }

    /// Create a compiler that appends the given library to every program.
    ///
    /// Libraries always start from [`ShaderLibrary::standard`], so the color
    /// transform intrinsics resolve and stay detectable.
    pub fn with_library(library: ShaderLibrary) -> Self {
        let library_source = library.concatenated();
        Self {
            library,
            library_source,
            compile_count: AtomicUsize::new(0),
        }
    }

    /// Get the library appended to every program.
    pub fn library(&self) -> &ShaderLibrary {
        &self.library
    }

    /// Number of compilations started by this compiler.
    pub fn compile_count(&self) -> usize {
        self.compile_count.load(Ordering::Relaxed)
    }

    /// Parse and validate a program.
    ///
    /// On failure the error carries naga's rendered diagnostics, with line
    /// numbers counted in `source`. If `main` is
    /// declared, its signature is checked against the program kind. A missing
    /// `main` is not an error here, see [`CompiledProgram::has_main`].
    pub fn compile(
        &self,
        source: &str,
        kind: ProgramKind,
        settings: &CompileSettings,
    ) -> Result<CompiledProgram, CompileError> {
        profile_scope!("shader_compile");

        self.compile_count.fetch_add(1, Ordering::Relaxed);

        // WGSL resolves module-scope names regardless of order, so the library
        // can follow the program and leave its line numbers untouched.
        let mut full_source = String::with_capacity(
            PRELUDE_DIRECTIVES.len() + source.len() + self.library_source.len() + 1,
        );
        full_source.push_str(PRELUDE_DIRECTIVES);
        full_source.push_str(source);
        full_source.push('\n');
        full_source.push_str(&self.library_source);

        let module = naga::front::wgsl::parse_str(&full_source)
            .map_err(|e| CompileError::Parse(e.emit_to_string(&full_source)))?;

        let mut validator = Validator::new(ValidationFlags::all(), settings.capabilities());
        let info = validator
            .validate(&module)
            .map_err(|e| CompileError::Validation(e.emit_to_string(&full_source)))?;

        let program = CompiledProgram {
            kind,
            source: full_source,
            module,
            info,
        };
        analysis::check_main_signature(&program)?;

        log::trace!(
            "ShaderCompiler: compiled {} program ({} bytes, {} functions)",
            kind.name(),
            program.source.len(),
            program.module.functions.len()
        );
        Ok(program)
    }
}

// Ensure the compiler and its programs can be shared across threads
static_assertions::assert_impl_all!(ShaderCompiler: Send, Sync);
static_assertions::assert_impl_all!(CompiledProgram: Send, Sync);
