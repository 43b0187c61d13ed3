//! ES module syntax to `require`/`exports`.
//!
//! Bundles are linked through a small CommonJS-shaped module registry, so
//! every `import`/`export` is rewritten in place:
//!
//! ```text
//! import a, { b as c } from "./x";   var __import_0 = require("./x"); var a = ...; var c = __import_0.b;
//! export function f() {}             function f() {}            + exports.f = f; (hoisted)
//! export const v = 1;                const v = 1; exports.v = v;
//! export { v as w };                 exports.w = v;             (appended)
//! export default expr;               exports.default = expr;
//! export * from "./y";               copy of every own key except `default`
//! ```
//!
//! Modules without any ES module syntax are passed through unchanged.

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    BindingPatternKind, Declaration, ExportDefaultDeclarationKind, ImportDeclarationSpecifier,
    ModuleExportName, Program, Statement,
};
use oxc_span::GetSpan;

use super::edits::{Edit, apply_edits};
use super::parse;
use crate::pipeline::{Capability, ModuleSource, StageError, TransformStage};

const PRELUDE: &str =
    "\"use strict\";\nObject.defineProperty(exports, \"__esModule\", { value: true });\n";

/// Rewrites ES module syntax to CommonJS-shaped `require`/`exports`.
#[derive(Debug, Clone, Copy, Default)]
pub struct InteropStage;

impl TransformStage for InteropStage {
    fn name(&self) -> &'static str {
        "interop"
    }

    fn capability(&self) -> Capability {
        Capability::Interop
    }

    fn transform(&self, module: ModuleSource) -> Result<ModuleSource, StageError> {
        let rewritten = {
            let allocator = Allocator::default();
            let program = parse(&allocator, &module)?;
            if !program.body.iter().any(is_module_syntax) {
                None
            } else {
                Some(rewrite(&program, &module.code)?)
            }
        };

        // Later stages must see the output as a script: module code is
        // implicitly strict, and the minifier drops the prelude's directive.
        match rewritten {
            Some(code) => Ok(module.into_script(code)),
            None => Ok(module),
        }
    }
}

fn is_module_syntax(stmt: &Statement<'_>) -> bool {
    stmt.as_module_declaration().is_some()
}

fn rewrite(program: &Program<'_>, code: &str) -> Result<String, StageError> {
    let mut edits = Vec::new();
    let mut hoisted = String::new();
    let mut trailer = String::new();
    let mut next_binding = 0usize;
    let mut binding = |prefix: &str| {
        let name = format!("__{prefix}_{next_binding}");
        next_binding += 1;
        name
    };

    for stmt in &program.body {
        match stmt {
            Statement::ImportDeclaration(decl) => {
                let ns = binding("import");
                let mut text = format!("var {ns} = require({});", js_string(&decl.source.value));
                for specifier in decl.specifiers.iter().flat_map(|specs| specs.iter()) {
                    let line = match specifier {
                        ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => format!(
                            " var {} = {ns} && {ns}.__esModule ? {ns}.default : {ns};",
                            s.local.name
                        ),
                        ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                            format!(" var {} = {ns};", s.local.name)
                        }
                        ImportDeclarationSpecifier::ImportSpecifier(s) => format!(
                            " var {} = {};",
                            s.local.name,
                            member(&ns, &export_name(&s.imported))
                        ),
                    };
                    text.push_str(&line);
                }
                edits.push(Edit::replace(decl.span, text));
            }

            Statement::ExportNamedDeclaration(decl) => {
                if let Some(declaration) = &decl.declaration {
                    // drop the `export ` keyword, keep the declaration as written
                    edits.push(Edit::remove(decl.span.start, declaration.span().start));
                    match declaration {
                        Declaration::FunctionDeclaration(func) => {
                            if let Some(id) = &func.id {
                                hoisted.push_str(&export_line(&id.name, &id.name));
                            }
                        }
                        Declaration::ClassDeclaration(class) => {
                            if let Some(id) = &class.id {
                                let line = export_line(&id.name, &id.name);
                                edits.push(Edit::insert(decl.span.end, format!("\n{line}")));
                            }
                        }
                        Declaration::VariableDeclaration(var) => {
                            let mut lines = String::new();
                            for declarator in &var.declarations {
                                let BindingPatternKind::BindingIdentifier(ident) = &declarator.id.kind
                                else {
                                    return Err(StageError::Unsupported(
                                        "destructuring patterns in export declarations".to_string(),
                                    ));
                                };
                                lines.push_str(&export_line(&ident.name, &ident.name));
                            }
                            edits.push(Edit::insert(decl.span.end, format!("\n{lines}")));
                        }
                        _ => {}
                    }
                } else if let Some(source) = &decl.source {
                    let ns = binding("reexport");
                    let mut text = format!("var {ns} = require({});", js_string(&source.value));
                    for spec in &decl.specifiers {
                        let value = member(&ns, &export_name(&spec.local));
                        text.push(' ');
                        text.push_str(export_line(&export_name(&spec.exported), &value).trim_end());
                    }
                    edits.push(Edit::replace(decl.span, text));
                } else {
                    for spec in &decl.specifiers {
                        trailer.push_str(&export_line(
                            &export_name(&spec.exported),
                            &export_name(&spec.local),
                        ));
                    }
                    edits.push(Edit::replace(decl.span, ""));
                }
            }

            Statement::ExportDefaultDeclaration(decl) => {
                let inner = decl.declaration.span();
                match &decl.declaration {
                    ExportDefaultDeclarationKind::FunctionDeclaration(func) => match &func.id {
                        Some(id) => {
                            edits.push(Edit::remove(decl.span.start, inner.start));
                            hoisted.push_str(&export_line("default", &id.name));
                        }
                        None => {
                            edits.push(Edit::replace_range(
                                decl.span.start,
                                inner.start,
                                "exports.default = ",
                            ));
                            edits.push(Edit::insert(decl.span.end, ";"));
                        }
                    },
                    ExportDefaultDeclarationKind::ClassDeclaration(class) => match &class.id {
                        Some(id) => {
                            edits.push(Edit::remove(decl.span.start, inner.start));
                            let line = export_line("default", &id.name);
                            edits.push(Edit::insert(decl.span.end, format!("\n{line}")));
                        }
                        None => {
                            edits.push(Edit::replace_range(
                                decl.span.start,
                                inner.start,
                                "exports.default = ",
                            ));
                            edits.push(Edit::insert(decl.span.end, ";"));
                        }
                    },
                    ExportDefaultDeclarationKind::TSInterfaceDeclaration(_) => {
                        edits.push(Edit::replace(decl.span, ""));
                    }
                    _ => {
                        edits.push(Edit::replace_range(
                            decl.span.start,
                            inner.start,
                            "exports.default = ",
                        ));
                    }
                }
            }

            Statement::ExportAllDeclaration(decl) => {
                let ns = binding("reexport");
                let mut text = format!("var {ns} = require({});", js_string(&decl.source.value));
                match &decl.exported {
                    Some(exported) => {
                        text.push(' ');
                        text.push_str(export_line(&export_name(exported), &ns).trim_end());
                    }
                    None => text.push_str(&format!(
                        " Object.keys({ns}).forEach(function (k) {{ if (k !== \"default\" && !Object.prototype.hasOwnProperty.call(exports, k)) exports[k] = {ns}[k]; }});"
                    )),
                }
                edits.push(Edit::replace(decl.span, text));
            }

            _ => {}
        }
    }

    edits.push(Edit::insert(0, format!("{PRELUDE}{hoisted}")));
    if !trailer.is_empty() {
        let end = u32::try_from(code.len())
            .map_err(|_| StageError::Transform("module is too large".to_string()))?;
        edits.push(Edit::insert(end, format!("\n{trailer}")));
    }

    Ok(apply_edits(code, edits))
}

fn export_name(name: &ModuleExportName<'_>) -> String {
    match name {
        ModuleExportName::IdentifierName(ident) => ident.name.to_string(),
        ModuleExportName::IdentifierReference(ident) => ident.name.to_string(),
        ModuleExportName::StringLiteral(lit) => lit.value.to_string(),
    }
}

fn export_line(exported: &str, value: &str) -> String {
    format!("{} = {value};\n", member("exports", exported))
}

/// `object.key`, or `object["key"]` when `key` is not an identifier.
fn member(object: &str, key: &str) -> String {
    if is_identifier(key) {
        format!("{object}.{key}")
    } else {
        format!("{object}[{}]", js_string(key))
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Quote `value` as a JavaScript string literal.
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}
