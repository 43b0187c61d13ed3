use oxc_allocator::Allocator;
use oxc_ast::ast::{CallExpression, DebuggerStatement, Expression};
use oxc_ast_visit::{Visit, walk};

use super::edits::{Edit, apply_edits};
use super::parse;
use crate::pipeline::{Capability, ModuleSource, StageError, TransformStage};

/// Removes `debugger` statements and calls on debug-only objects.
///
/// A call such as `console.log(x)` becomes `void 0` so it stays valid in
/// any expression position; `debugger;` becomes an empty statement.
#[derive(Debug, Clone)]
pub struct StripDebugStage {
    objects: Vec<String>,
}

impl StripDebugStage {
    pub fn new(objects: Vec<String>) -> Self {
        Self { objects }
    }

    pub fn objects(&self) -> &[String] {
        &self.objects
    }
}

impl TransformStage for StripDebugStage {
    fn name(&self) -> &'static str {
        "strip-debug"
    }

    fn capability(&self) -> Capability {
        Capability::StripDebug
    }

    fn transform(&self, module: ModuleSource) -> Result<ModuleSource, StageError> {
        let edits = {
            let allocator = Allocator::default();
            let program = parse(&allocator, &module)?;
            let mut finder = DebugFinder {
                objects: &self.objects,
                edits: Vec::new(),
            };
            finder.visit_program(&program);
            finder.edits
        };

        if edits.is_empty() {
            return Ok(module);
        }
        tracing::trace!(path = %module.path.display(), count = edits.len(), "stripped debug code");
        let code = apply_edits(&module.code, edits);
        Ok(module.with_code(code))
    }
}

struct DebugFinder<'s> {
    objects: &'s [String],
    edits: Vec<Edit>,
}

impl DebugFinder<'_> {
    fn is_debug_object(&self, object: &Expression<'_>) -> bool {
        match object {
            Expression::Identifier(ident) => self.objects.iter().any(|o| o == ident.name.as_str()),
            _ => false,
        }
    }

    fn is_debug_call(&self, callee: &Expression<'_>) -> bool {
        match callee {
            Expression::StaticMemberExpression(member) => self.is_debug_object(&member.object),
            Expression::ComputedMemberExpression(member) => self.is_debug_object(&member.object),
            _ => false,
        }
    }
}

impl<'a> Visit<'a> for DebugFinder<'_> {
    fn visit_call_expression(&mut self, it: &CallExpression<'a>) {
        if self.is_debug_call(&it.callee) {
            // arguments go with the call
            self.edits.push(Edit::replace(it.span, "void 0"));
            return;
        }
        walk::walk_call_expression(self, it);
    }

    fn visit_debugger_statement(&mut self, it: &DebuggerStatement) {
        self.edits.push(Edit::replace(it.span, ";"));
    }
}
