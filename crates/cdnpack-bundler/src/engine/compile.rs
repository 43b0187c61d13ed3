//! Module graph construction.

use indexmap::{IndexMap, IndexSet};
use oxc_allocator::Allocator;
use oxc_ast::ast::{Argument, CallExpression, Expression};
use oxc_ast_visit::{Visit, walk};
use std::path::Path;

use super::helpers::{self, builtin_helper};
use super::resolve::resolve;
use super::{BundleGraph, BundledModule, ModuleRef, absolute};
use crate::error::CompileDiagnostic;
use crate::pipeline::stages::parse;
use crate::pipeline::{ModuleSource, StageError};
use crate::registry::BundleDescriptor;
use crate::runtime::Runtime;

/// Walk the graph breadth-first from the entry.
///
/// Each module is read, run through the pipeline and scanned for
/// `require("...")` calls. Externals of the output and built-in lowering
/// helpers are linked directly; any other specifier is resolved to a file
/// that joins the queue.
pub(crate) async fn compile(
    runtime: &dyn Runtime,
    descriptor: &BundleDescriptor,
) -> Result<BundleGraph, CompileDiagnostic> {
    let root = absolute(runtime.cwd(), &descriptor.root);
    let entry = absolute(runtime.cwd(), &descriptor.entry);

    let mut discovered = IndexSet::new();
    discovered.insert(entry.clone());
    let mut modules = Vec::new();
    let mut externals = IndexSet::new();

    let mut next = 0;
    while let Some(path) = discovered.get_index(next).cloned() {
        next += 1;

        let source = match helpers::source_at(&path) {
            Some(source) => source.to_string(),
            None => {
                let bytes = runtime
                    .read_file(&path)
                    .await
                    .map_err(|error| CompileDiagnostic::Read {
                        path: path.clone(),
                        error,
                    })?;
                String::from_utf8(bytes).map_err(|_| CompileDiagnostic::Encoding(path.clone()))?
            }
        };

        let pipeline = descriptor.pipeline.clone();
        let input = ModuleSource::new(path.clone(), source.clone());
        let (code, requires) = tokio::task::spawn_blocking(move || {
            let output = pipeline.run(input)?;
            let requires = scan_requires(&output)?;
            Ok::<_, CompileDiagnostic>((output.code, requires))
        })
        .await
        .map_err(|e| CompileDiagnostic::TaskFailed(e.to_string()))??;

        let mut dependencies = IndexMap::new();
        for specifier in requires {
            let target = if descriptor.output.is_external(&specifier) {
                externals.insert(specifier.clone());
                ModuleRef::External(specifier.clone())
            } else if let Some(helper) = builtin_helper(&specifier) {
                let (index, _) = discovered.insert_full(helper.path);
                ModuleRef::Internal(index)
            } else {
                let resolved = resolve(runtime, &path, &specifier, &descriptor.resolve)
                    .await
                    .ok_or_else(|| CompileDiagnostic::Unresolved {
                        specifier: specifier.clone(),
                        importer: path.clone(),
                    })?;
                let (index, _) = discovered.insert_full(resolved);
                ModuleRef::Internal(index)
            };
            dependencies.insert(specifier, target);
        }

        tracing::debug!(
            bundle = %descriptor.name,
            module = %path.display(),
            dependencies = dependencies.len(),
            "compiled module"
        );

        modules.push(BundledModule {
            id: module_id(&root, &path),
            path,
            source,
            code,
            dependencies,
        });
    }

    Ok(BundleGraph {
        entry,
        modules,
        externals,
    })
}

/// Id of `path` relative to `root`, always with forward slashes.
fn module_id(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(relative) => relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => path.to_string_lossy().replace('\\', "/"),
    }
}

/// Literal `require` specifiers of a transformed module, in first-use order.
///
/// Any surviving `import`/`export` declaration means the pipeline did not
/// produce linkable code.
fn scan_requires(module: &ModuleSource) -> Result<Vec<String>, CompileDiagnostic> {
    let allocator = Allocator::default();
    let program = parse(&allocator, module).map_err(|err| match err {
        StageError::Parse(message) => CompileDiagnostic::Parse {
            path: module.path.clone(),
            message,
        },
        other => CompileDiagnostic::Stage {
            stage: "scan",
            path: module.path.clone(),
            message: other.to_string(),
        },
    })?;

    if program
        .body
        .iter()
        .any(|stmt| stmt.as_module_declaration().is_some())
    {
        return Err(CompileDiagnostic::ModuleSyntax(module.path.clone()));
    }

    let mut finder = RequireFinder::default();
    finder.visit_program(&program);
    Ok(finder.specifiers.into_iter().collect())
}

#[derive(Default)]
struct RequireFinder {
    specifiers: IndexSet<String>,
}

impl<'a> Visit<'a> for RequireFinder {
    fn visit_call_expression(&mut self, it: &CallExpression<'a>) {
        if let Expression::Identifier(ident) = &it.callee {
            if ident.name.as_str() == "require" && it.arguments.len() == 1 {
                if let Some(specifier) = static_specifier(&it.arguments[0]) {
                    self.specifiers.insert(specifier);
                }
            }
        }
        walk::walk_call_expression(self, it);
    }
}

/// Specifier of a `require` argument known without evaluation.
///
/// The minifier prints string literals as substitution-free template
/// literals when that saves escapes, so both forms are accepted.
fn static_specifier(argument: &Argument<'_>) -> Option<String> {
    match argument {
        Argument::StringLiteral(lit) => Some(lit.value.to_string()),
        Argument::TemplateLiteral(template) if template.expressions.is_empty() => {
            let [quasi] = template.quasis.as_slice() else {
                return None;
            };
            let value = quasi.value.cooked.as_ref().unwrap_or(&quasi.value.raw);
            Some(value.to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_collects_literal_requires_in_order() {
        let module = ModuleSource::new(
            "a.js",
            "var b = require(\"./b\");\nvar a = require('aura');\nrequire(dynamic);\nrequire(\"./b\");\n",
        );
        assert_eq!(scan_requires(&module).unwrap(), vec!["./b", "aura"]);
    }

    #[test]
    fn test_scan_accepts_substitution_free_templates() {
        let module = ModuleSource::new(
            "a.js",
            "var q = require(`./quote\"d`);\nvar a = require(`aura`);\nrequire(`./${name}`);\n",
        );
        assert_eq!(scan_requires(&module).unwrap(), vec!["./quote\"d", "aura"]);
    }

    #[test]
    fn test_scan_rejects_module_syntax() {
        let module = ModuleSource::new("src/a.js", "import b from './b';\n");
        assert!(matches!(
            scan_requires(&module),
            Err(CompileDiagnostic::ModuleSyntax(path)) if path == Path::new("src/a.js")
        ));
    }

    #[test]
    fn test_module_id_is_relative_to_root() {
        let root = Path::new("/p/src/bar");
        assert_eq!(module_id(root, Path::new("/p/src/bar/lib/x.js")), "lib/x.js");
        assert_eq!(
            module_id(root, Path::new("/p/node_modules/y/index.js")),
            "/p/node_modules/y/index.js"
        );
    }
}
