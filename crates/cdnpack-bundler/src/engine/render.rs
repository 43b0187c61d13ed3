//! Artifact rendering: module registry, format envelope and source map.
//!
//! Every bundle has the same body, a table of module factories plus a tiny
//! `require` implementation, and differs only in the envelope around it:
//!
//! ```text
//! define("abc:bar", ["aura"], function (__external_0) { <body> });
//!
//! (function (global, factory) { ...commonjs / amd / global["$A"]... }(this, function (__external_0) { <body> }));
//! ```

use oxc_sourcemap::{SourceMap, SourceMapBuilder};
use serde_json::{Map, Value};

use super::{BundleGraph, ModuleRef};
use crate::registry::{ModuleFormat, OutputSpec};

pub(crate) struct Rendered {
    pub code: String,
    pub map: Option<SourceMap>,
}

/// Line-tracking output buffer.
struct Output {
    code: String,
    line: u32,
}

impl Output {
    fn new() -> Self {
        Self {
            code: String::new(),
            line: 0,
        }
    }

    fn line(&mut self, text: &str) {
        self.code.push_str(text);
        self.code.push('\n');
        self.line += 1;
    }
}

pub(crate) fn render(graph: &BundleGraph, output: &OutputSpec) -> Rendered {
    let params: Vec<String> = (0..graph.externals.len())
        .map(|i| format!("__external_{i}"))
        .collect();
    let deps: Vec<String> = graph.externals.iter().map(|id| js_string(id)).collect();

    let mut out = Output::new();
    match &output.format {
        ModuleFormat::Amd { module_id } => {
            let id = module_id
                .as_deref()
                .map(|id| format!("{}, ", js_string(id)))
                .unwrap_or_default();
            out.line(&format!(
                "define({id}[{}], function ({}) {{",
                deps.join(", "),
                params.join(", ")
            ));
        }
        ModuleFormat::Umd { name } => {
            let requires: Vec<String> = deps.iter().map(|d| format!("require({d})")).collect();
            let globals: Vec<String> = graph
                .externals
                .iter()
                .map(|id| {
                    let global = output.globals.get(id).map(String::as_str).unwrap_or(id);
                    format!("global[{}]", js_string(global))
                })
                .collect();
            out.line("(function (global, factory) {");
            out.line(&format!(
                "  typeof exports === 'object' && typeof module !== 'undefined' ? module.exports = factory({}) :",
                requires.join(", ")
            ));
            out.line(&format!(
                "  typeof define === 'function' && define.amd ? define([{}], factory) :",
                deps.join(", ")
            ));
            out.line(&format!(
                "  (global = typeof globalThis !== 'undefined' ? globalThis : global || self, global[{}] = factory({}));",
                js_string(name),
                globals.join(", ")
            ));
            out.line(&format!("}}(this, function ({}) {{", params.join(", ")));
        }
    }

    let mut builder = output.sourcemap.map(|_| SourceMapBuilder::default());

    let externals: Vec<String> = graph
        .externals
        .iter()
        .zip(&params)
        .map(|(id, param)| format!("{}: {param}", js_string(id)))
        .collect();
    out.line(&format!("var __externals = {{{}}};", externals.join(", ")));
    out.line("var __modules = [");

    for (index, module) in graph.modules.iter().enumerate() {
        out.line(&format!("// {}", module.id));
        out.line("[function (module, exports, require) {");

        let source_id = builder
            .as_mut()
            .map(|b| b.add_source_and_content(&module.id, &module.source));
        let source_lines = module.source.lines().count().max(1) as u32;

        for (offset, text) in module.code.lines().enumerate() {
            if let (Some(builder), Some(source_id)) = (builder.as_mut(), source_id) {
                let src_line = (offset as u32).min(source_lines - 1);
                builder.add_token(out.line, 0, src_line, 0, Some(source_id), None);
            }
            out.line(text);
        }

        let separator = if index + 1 == graph.modules.len() { "" } else { "," };
        out.line(&format!("}}, {}]{separator}", dependency_table(&module.dependencies)));
    }

    out.line("];");
    out.line("var __cache = {};");
    out.line("function __require(id) {");
    out.line("  if (typeof id === 'string') return __externals[id];");
    out.line("  var cached = __cache[id];");
    out.line("  if (cached) return cached.exports;");
    out.line("  var module = __cache[id] = { exports: {} };");
    out.line("  var entry = __modules[id];");
    out.line("  entry[0].call(module.exports, module, module.exports, function (specifier) {");
    out.line("    return __require(entry[1][specifier]);");
    out.line("  });");
    out.line("  return module.exports;");
    out.line("}");
    out.line("return __require(0);");

    match output.format {
        ModuleFormat::Amd { .. } => out.line("});"),
        ModuleFormat::Umd { .. } => out.line("}));"),
    }

    let map = builder.map(|mut builder| {
        if let Some(file) = output.dest.file_name() {
            builder.set_file(&file.to_string_lossy());
        }
        builder.into_sourcemap()
    });

    Rendered {
        code: out.code,
        map,
    }
}

fn dependency_table(dependencies: &indexmap::IndexMap<String, ModuleRef>) -> String {
    let table: Map<String, Value> = dependencies
        .iter()
        .map(|(specifier, target)| {
            let value = match target {
                ModuleRef::Internal(index) => Value::from(*index),
                ModuleRef::External(id) => Value::String(id.clone()),
            };
            (specifier.clone(), value)
        })
        .collect();
    Value::Object(table).to_string()
}

fn js_string(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}
