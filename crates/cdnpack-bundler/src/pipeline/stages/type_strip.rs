use oxc_transformer::TransformOptions;

use super::transform_with;
use crate::pipeline::{Capability, ModuleSource, StageError, TransformStage};

/// Removes TypeScript annotations.
///
/// Plain JavaScript modules pass through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeStripStage;

impl TransformStage for TypeStripStage {
    fn name(&self) -> &'static str {
        "type-strip"
    }

    fn capability(&self) -> Capability {
        Capability::TypeStrip
    }

    fn transform(&self, module: ModuleSource) -> Result<ModuleSource, StageError> {
        if !module.source_type.is_typescript() {
            return Ok(module);
        }

        let code = transform_with(&module, &TransformOptions::default())?;
        let source_type = module.source_type.with_typescript(false);
        Ok(ModuleSource {
            code,
            source_type,
            ..module
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_annotations() {
        let module = ModuleSource::new(
            "widget.ts",
            "interface Props { size: number }\nexport function area(p: Props): number { return p.size * 2; }\n",
        );
        let out = TypeStripStage.transform(module).unwrap();

        assert!(!out.code.contains("interface"));
        assert!(!out.code.contains(": number"));
        assert!(out.code.contains("export function area(p)"));
        assert!(!out.source_type.is_typescript());
    }

    #[test]
    fn test_javascript_is_untouched() {
        let code = "export const a = 1; // keep me\n";
        let out = TypeStripStage
            .transform(ModuleSource::new("a.js", code))
            .unwrap();
        assert_eq!(out.code, code);
    }
}
