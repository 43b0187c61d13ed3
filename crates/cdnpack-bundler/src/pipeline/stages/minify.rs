use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_minifier::{Minifier, MinifierOptions};

use super::parse;
use crate::pipeline::{Capability, ModuleSource, StageError, TransformStage};

/// Compresses, mangles and prints without whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinifyStage;

impl TransformStage for MinifyStage {
    fn name(&self) -> &'static str {
        "minify"
    }

    fn capability(&self) -> Capability {
        Capability::Minify
    }

    fn transform(&self, module: ModuleSource) -> Result<ModuleSource, StageError> {
        let code = {
            let allocator = Allocator::default();
            let mut program = parse(&allocator, &module)?;

            let ret = Minifier::new(MinifierOptions::default()).minify(&allocator, &mut program);

            Codegen::new()
                .with_options(CodegenOptions::minify())
                .with_scoping(ret.scoping)
                .build(&program)
                .code
        };
        Ok(module.with_code(code))
    }
}
