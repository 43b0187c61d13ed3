//! Default stages built on the oxc toolchain.

mod define;
mod downlevel;
mod edits;
mod interop;
mod minify;
mod strip;
mod type_strip;

pub use define::DefineStage;
pub use downlevel::DownlevelStage;
pub use interop::InteropStage;
pub use minify::MinifyStage;
pub use strip::StripDebugStage;
pub use type_strip::TypeStripStage;

use oxc_allocator::Allocator;
use oxc_ast::ast::Program;
use oxc_codegen::Codegen;
use oxc_parser::{Parser, ParserReturn};
use oxc_semantic::SemanticBuilder;
use oxc_transformer::{TransformOptions, Transformer};

use super::{ModuleSource, StageError};

/// Parse `module`, failing on any syntax error.
pub(crate) fn parse<'a>(
    allocator: &'a Allocator,
    module: &'a ModuleSource,
) -> Result<Program<'a>, StageError> {
    let ParserReturn {
        program,
        errors,
        panicked,
        ..
    } = Parser::new(allocator, &module.code, module.source_type).parse();

    if let Some(first) = errors.first() {
        return Err(StageError::Parse(first.to_string()));
    }
    if panicked {
        return Err(StageError::Parse("parser aborted".to_string()));
    }
    Ok(program)
}

/// Run the oxc transformer with `options` and print the result.
pub(crate) fn transform_with(
    module: &ModuleSource,
    options: &TransformOptions,
) -> Result<String, StageError> {
    let allocator = Allocator::default();
    let mut program = parse(&allocator, module)?;

    let scoping = SemanticBuilder::new()
        .build(&program)
        .semantic
        .into_scoping();

    let ret = Transformer::new(&allocator, &module.path, options)
        .build_with_scoping(scoping, &mut program);

    if let Some(first) = ret.errors.first() {
        return Err(StageError::Transform(first.to_string()));
    }

    Ok(Codegen::new().build(&program).code)
}
