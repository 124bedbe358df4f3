//! Queries over compiled naga modules.

use naga::{AddressSpace, Block, Handle, Module, Scalar, ScalarKind, Statement, TypeInner, VectorSize};

use super::structs::{ATTRIBUTES_STRUCT, VARYINGS_STRUCT};
use super::{CompiledProgram, ProgramKind};
use crate::error::CompileError;

const HALF: Scalar = Scalar {
    kind: ScalarKind::Float,
    width: 2,
};
const FLOAT: Scalar = Scalar {
    kind: ScalarKind::Float,
    width: 4,
};

/// Check whether `ty` is `vecN<scalar>`.
pub fn is_vector(inner: &TypeInner, size: VectorSize, scalar: Scalar) -> bool {
    matches!(inner, TypeInner::Vector { size: s, scalar: sc } if *s == size && *sc == scalar)
}

/// Check whether `ty` is `vec4<f16>`.
pub fn is_half4(inner: &TypeInner) -> bool {
    is_vector(inner, VectorSize::Quad, HALF)
}

/// Check whether `ty` is `vec4<f32>`.
pub fn is_float4(inner: &TypeInner) -> bool {
    is_vector(inner, VectorSize::Quad, FLOAT)
}

/// Check whether `ty` is `vec2<f32>`.
pub fn is_float2(inner: &TypeInner) -> bool {
    is_vector(inner, VectorSize::Bi, FLOAT)
}

/// If `ty` is a `ptr<function, T>`, return `T`.
pub fn function_pointee(program: &CompiledProgram, ty: Handle<naga::Type>) -> Option<&TypeInner> {
    match *program.type_inner(ty) {
        TypeInner::Pointer {
            base,
            space: AddressSpace::Function,
        } => Some(program.type_inner(base)),
        _ => None,
    }
}

fn is_struct_named(program: &CompiledProgram, ty: Handle<naga::Type>, name: &str) -> bool {
    matches!(program.type_inner(ty), TypeInner::Struct { .. })
        && program.type_name(ty) == Some(name)
}

/// Match the `main` signature against what the program kind requires.
///
/// Programs without `main` pass, the caller decides what that means.
pub(crate) fn check_main_signature(program: &CompiledProgram) -> Result<(), CompileError> {
    let Some(main) = program.main() else {
        return Ok(());
    };

    let ok = match program.kind() {
        ProgramKind::Vertex => {
            main.arguments.len() == 1
                && is_struct_named(program, main.arguments[0].ty, ATTRIBUTES_STRUCT)
                && main
                    .result
                    .as_ref()
                    .is_some_and(|r| is_struct_named(program, r.ty, VARYINGS_STRUCT))
        }
        ProgramKind::Fragment => {
            let color_ok = match main.arguments.get(1) {
                None => true,
                Some(arg) => function_pointee(program, arg.ty)
                    .is_some_and(|inner| is_half4(inner) || is_float4(inner)),
            };
            (1..=2).contains(&main.arguments.len())
                && is_struct_named(program, main.arguments[0].ty, VARYINGS_STRUCT)
                && color_ok
                && main
                    .result
                    .as_ref()
                    .is_none_or(|r| is_float2(program.type_inner(r.ty)))
        }
    };

    if ok {
        Ok(())
    } else {
        Err(CompileError::Signature(match program.kind() {
            ProgramKind::Vertex => {
                "vertex 'main' must be declared as 'fn main(attributes: Attributes) -> Varyings'"
                    .to_string()
            }
            ProgramKind::Fragment => {
                "fragment 'main' must be declared as 'fn main(varyings: Varyings \
                 [, color: ptr<function, vec4<f16 or f32>>]) [-> vec2<f32>]'"
                    .to_string()
            }
        }))
    }
}

/// Check whether any function in `module` calls a function named in `names`.
///
/// The named functions' own bodies are not inspected.
pub fn calls_any(module: &Module, names: &[&str]) -> bool {
    let targets: Vec<Handle<naga::Function>> = module
        .functions
        .iter()
        .filter(|(_, f)| f.name.as_deref().is_some_and(|n| names.contains(&n)))
        .map(|(handle, _)| handle)
        .collect();
    if targets.is_empty() {
        return false;
    }

    let in_functions = module
        .functions
        .iter()
        .filter(|(handle, _)| !targets.contains(handle))
        .any(|(_, f)| block_calls_any(&f.body, &targets));
    in_functions
        || module
            .entry_points
            .iter()
            .any(|ep| block_calls_any(&ep.function.body, &targets))
}

fn block_calls_any(block: &Block, targets: &[Handle<naga::Function>]) -> bool {
    block.iter().any(|statement| match statement {
        Statement::Call { function, .. } => targets.contains(function),
        Statement::Block(inner) => block_calls_any(inner, targets),
        Statement::If { accept, reject, .. } => {
            block_calls_any(accept, targets) || block_calls_any(reject, targets)
        }
        Statement::Switch { cases, .. } => {
            cases.iter().any(|case| block_calls_any(&case.body, targets))
        }
        Statement::Loop {
            body, continuing, ..
        } => block_calls_any(body, targets) || block_calls_any(continuing, targets),
        _ => false,
    })
}
