//! Shared fixtures for cdnpack-bundler integration tests
//!
//! Every test gets its own temporary project laid out like a real site:
//! a framework bundle plus two AMD components that depend on it.

#![allow(dead_code)]

use cdnpack_bundler::{
    BundleBuilder, BundleDescriptor, BundleRegistry, Mode, NativeRuntime, OutputSpec,
    PipelineOptions, ResolveOptions, SourceMapMode, compose,
};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub const FRAMEWORK_MAIN: &str = r#"import { greet } from './util';

export function init(name) {
  return greet(name);
}

export const version = '1.0.0';
"#;

pub const FRAMEWORK_UTIL: &str = r#"export function greet(name) {
  if (DEVELOPMENT) {
    console.log('greeting', name);
  }
  debugger;
  return 'hello ' + name;
}
"#;

pub const BAR: &str = r#"import aura from 'aura';
import { label } from './label';

export default function render() {
  return aura.init(label);
}
"#;

pub const BAR_LABEL: &str = "export const label = 'bar';\n";

pub const FOO: &str = r#"import aura from 'aura';

export default function render() {
  return aura.init('foo');
}
"#;

pub fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().expect("parent")).expect("create dir");
    std::fs::write(path, content).expect("write file");
}

/// Temporary project with `src/framework`, `bar` and `foo` sources.
pub fn create_project() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    let root = dir.path();
    write(root, "src/framework/main.js", FRAMEWORK_MAIN);
    write(root, "src/framework/util.js", FRAMEWORK_UTIL);
    write(root, "src/namespaces/abc/components/bar/bar.js", BAR);
    write(root, "src/namespaces/abc/components/bar/label.js", BAR_LABEL);
    write(root, "src/namespaces/abc/components/foo/foo.js", FOO);
    dir
}

pub fn framework(root: &Path, mode: Mode) -> BundleDescriptor {
    BundleDescriptor::new(
        "fw",
        root.join("src/framework"),
        root.join("src/framework/main.js"),
        compose(mode, &PipelineOptions::default()).expect("pipeline"),
        OutputSpec::umd(root.join("fake-cdn/fw.js"), "$A").sourcemap(SourceMapMode::External),
    )
    .resolve(ResolveOptions::node_modules())
}

pub fn component(root: &Path, name: &str, mode: Mode) -> BundleDescriptor {
    let folder = root.join(format!("src/namespaces/abc/components/{name}"));
    BundleDescriptor::new(
        name,
        folder.clone(),
        folder.join(format!("{name}.js")),
        compose(mode, &PipelineOptions::default()).expect("pipeline"),
        OutputSpec::amd(
            root.join(format!("fake-cdn/{name}.js")),
            Some(&format!("abc:{name}")),
        )
        .sourcemap(SourceMapMode::External)
        .global("aura", "$A"),
    )
}

pub fn registry(root: &Path, mode: Mode) -> BundleRegistry {
    BundleRegistry::new(vec![
        framework(root, mode),
        component(root, "bar", mode),
        component(root, "foo", mode),
    ])
    .expect("valid registry")
}

pub fn builder(root: &Path) -> BundleBuilder {
    BundleBuilder::native(Arc::new(NativeRuntime::new(root)))
}

pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}
