//! Output contract of a custom mesh fragment stage.

use crate::error::SpecError;
use crate::shader::CompiledProgram;
use crate::shader::analysis::{function_pointee, is_float2, is_float4, is_half4};

/// Color produced by the fragment stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorType {
    /// The fragment stage produces no color.
    #[default]
    None,
    /// Half-precision color (`vec4<f16>`).
    Half4,
    /// Full-precision color (`vec4<f32>`).
    Float4,
}

/// What the fragment entry point commits to producing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FragmentContract {
    /// Color output, if any.
    pub color_type: ColorType,
    /// Whether `main` returns local coordinates.
    pub has_local_coords: bool,
}

impl FragmentContract {
    /// Read the contract from the signature of the program's `main`.
    ///
    /// The compiler already matched the signature, so the error branch only
    /// trips if it was bypassed.
    pub fn extract(program: &CompiledProgram) -> Result<Self, SpecError> {
        let main = program
            .main()
            .ok_or_else(|| SpecError::contract("Fragment shader must have main function."))?;

        let color_type = match main.arguments.len() {
            1 => ColorType::None,
            2 => match function_pointee(program, main.arguments[1].ty) {
                Some(inner) if is_half4(inner) => ColorType::Half4,
                Some(inner) if is_float4(inner) => ColorType::Float4,
                _ => {
                    return Err(SpecError::contract(
                        "Fragment shader color output must be vec4<f16> or vec4<f32>.",
                    ));
                }
            },
            n => {
                return Err(SpecError::contract(format!(
                    "Fragment shader main must take 1 or 2 parameters, found {n}."
                )));
            }
        };

        let has_local_coords = match &main.result {
            None => false,
            Some(result) if is_float2(program.type_inner(result.ty)) => true,
            Some(_) => {
                return Err(SpecError::contract(
                    "Fragment shader main must return nothing or vec2<f32>.",
                ));
            }
        };

        Ok(Self {
            color_type,
            has_local_coords,
        })
    }
}
