use cdnpack_bundler::{ModuleFormat, ResolveOptions, SourceMapMode};
use indexmap::IndexMap;
use std::path::PathBuf;

use crate::config::BundleConfig;

/// Global the framework bundle assigns its exports to.
pub const FRAMEWORK_GLOBAL: &str = "$A";

/// Module id components import the framework under.
pub const FRAMEWORK_MODULE: &str = "aura";

/// The framework bundle followed by the `bar` and `foo` components.
pub fn default_bundles() -> Vec<BundleConfig> {
    vec![
        BundleConfig {
            name: "fw".to_string(),
            folder: PathBuf::from("src/framework"),
            entry: PathBuf::from("main.js"),
            dest: PathBuf::from("fake-cdn/fw.js"),
            format: ModuleFormat::Umd {
                name: FRAMEWORK_GLOBAL.to_string(),
            },
            sourcemap: Some(SourceMapMode::External),
            globals: IndexMap::new(),
            resolve: ResolveOptions::node_modules(),
        },
        component("bar"),
        component("foo"),
    ]
}

fn component(name: &str) -> BundleConfig {
    BundleConfig {
        name: name.to_string(),
        folder: PathBuf::from(format!("src/namespaces/abc/components/{name}")),
        entry: PathBuf::from(format!("{name}.js")),
        dest: PathBuf::from(format!("fake-cdn/{name}.js")),
        format: ModuleFormat::Amd {
            module_id: Some(format!("abc:{name}")),
        },
        sourcemap: Some(SourceMapMode::External),
        globals: IndexMap::from([(FRAMEWORK_MODULE.to_string(), FRAMEWORK_GLOBAL.to_string())]),
        resolve: ResolveOptions::default(),
    }
}
