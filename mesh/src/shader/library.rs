//! Built-in shader library modules.
//!
//! Every custom mesh program is compiled with the library appended, so the
//! functions declared here resolve without any import syntax. A library always
//! contains the standard modules, extra modules are added on top.
//!
//! # Shader Files
//!
//! The library modules are stored as `.wgsl` files in `shaders/library/`:
//! - `color_transform.wgsl` - Color transform intrinsics (`toLinearSrgb`, `fromLinearSrgb`)

// =============================================================================
// Shader Module Sources (loaded from files at compile time)
// =============================================================================

/// Color transform intrinsics.
const COLOR_TRANSFORM_MODULE: &str = include_str!("../../shaders/library/color_transform.wgsl");

/// Names of the color transform intrinsics declared by the standard library.
pub const COLOR_TRANSFORM_INTRINSICS: [&str; 2] = ["toLinearSrgb", "fromLinearSrgb"];

// =============================================================================
// ShaderLibrary
// =============================================================================

/// Collection of shader modules appended to every program.
#[derive(Debug, Clone)]
pub struct ShaderLibrary {
    modules: Vec<(&'static str, &'static str)>,
}

impl ShaderLibrary {
    /// Create the standard custom mesh library.
    ///
    /// - `redlilium::color_transform` - Color transform intrinsics
    pub fn standard() -> Self {
        Self {
            modules: vec![("redlilium::color_transform", COLOR_TRANSFORM_MODULE)],
        }
    }

    /// Get an iterator over all modules (name, source).
    pub fn modules(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.modules.iter().copied()
    }

    /// Add a custom module to the library.
    pub fn with_module(mut self, name: &'static str, source: &'static str) -> Self {
        self.modules.push((name, source));
        self
    }

    /// Concatenate every module into one block of source text.
    pub fn concatenated(&self) -> String {
        let mut out = String::new();
        for (_, source) in self.modules() {
            out.push_str(source);
            if !source.ends_with('\n') {
                out.push('\n');
            }
        }
        out
    }
}

impl Default for ShaderLibrary {
    fn default() -> Self {
        Self::standard()
    }
}
