use oxc_allocator::Allocator;
use oxc_ast::ast::{Expression, IdentifierReference, ObjectProperty};
use oxc_ast_visit::{Visit, walk};

use super::edits::{Edit, apply_edits};
use super::parse;
use crate::pipeline::{Capability, ModuleSource, StageError, TransformStage};

/// Replaces free references to a flag identifier with a boolean literal.
///
/// Only identifier references are rewritten: property keys, member names and
/// declarations that happen to share the flag's name are left alone.
#[derive(Debug, Clone)]
pub struct DefineStage {
    flag: String,
    value: bool,
}

impl DefineStage {
    pub fn new(flag: impl Into<String>, value: bool) -> Self {
        Self {
            flag: flag.into(),
            value,
        }
    }

    pub fn flag(&self) -> &str {
        &self.flag
    }

    pub fn value(&self) -> bool {
        self.value
    }
}

impl TransformStage for DefineStage {
    fn name(&self) -> &'static str {
        "define-flags"
    }

    fn capability(&self) -> Capability {
        Capability::DefineFlags
    }

    fn transform(&self, module: ModuleSource) -> Result<ModuleSource, StageError> {
        if !module.code.contains(self.flag.as_str()) {
            return Ok(module);
        }

        let edits = {
            let allocator = Allocator::default();
            let program = parse(&allocator, &module)?;
            let mut finder = FlagFinder {
                flag: &self.flag,
                literal: if self.value { "true" } else { "false" },
                edits: Vec::new(),
            };
            finder.visit_program(&program);
            finder.edits
        };

        if edits.is_empty() {
            return Ok(module);
        }
        tracing::trace!(path = %module.path.display(), count = edits.len(), "substituted flag");
        let code = apply_edits(&module.code, edits);
        Ok(module.with_code(code))
    }
}

struct FlagFinder<'s> {
    flag: &'s str,
    literal: &'static str,
    edits: Vec<Edit>,
}

impl<'a> Visit<'a> for FlagFinder<'_> {
    fn visit_identifier_reference(&mut self, it: &IdentifierReference<'a>) {
        if it.name.as_str() == self.flag {
            self.edits.push(Edit::replace(it.span, self.literal));
        }
    }

    fn visit_object_property(&mut self, it: &ObjectProperty<'a>) {
        // `{ FLAG }` has to become `{ FLAG: true }` to stay valid
        if it.shorthand {
            if let Expression::Identifier(ident) = &it.value {
                if ident.name.as_str() == self.flag {
                    self.edits.push(Edit::replace(
                        it.span,
                        format!("{}: {}", self.flag, self.literal),
                    ));
                    return;
                }
            }
        }
        walk::walk_object_property(self, it);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(code: &str, value: bool) -> String {
        DefineStage::new("DEVELOPMENT", value)
            .transform(ModuleSource::new("a.js", code))
            .unwrap()
            .code
    }

    #[test]
    fn test_substitutes_references() {
        let out = run("if (DEVELOPMENT) { log(); }\nconst dev = !DEVELOPMENT;\n", false);
        assert_eq!(out, "if (false) { log(); }\nconst dev = !false;\n");
    }

    #[test]
    fn test_leaves_keys_and_members_alone() {
        let code = "const o = { DEVELOPMENT: 1 };\nconfig.DEVELOPMENT = 2;\n";
        assert_eq!(run(code, true), code);
    }

    #[test]
    fn test_expands_shorthand_properties() {
        let out = run("export default { DEVELOPMENT };\n", true);
        assert_eq!(out, "export default { DEVELOPMENT: true };\n");
    }

    #[test]
    fn test_untouched_without_flag() {
        let code = "export const a = 1;\n";
        assert_eq!(run(code, true), code);
    }
}
