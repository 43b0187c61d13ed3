//! Bundle descriptors and the validated registry that holds them.

use indexmap::IndexMap;
use path_clean::PathClean;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::ConfigError;
use crate::pipeline::Pipeline;

/// Module format of a bundle artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ModuleFormat {
    /// `define(...)` for an AMD loader
    Amd {
        #[serde(default, rename = "moduleId", skip_serializing_if = "Option::is_none")]
        module_id: Option<String>,
    },
    /// Universal wrapper that assigns the entry's exports to a global
    Umd { name: String },
}

impl ModuleFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Amd { .. } => "amd",
            Self::Umd { .. } => "umd",
        }
    }
}

/// Where a source map goes, if anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMapMode {
    /// `<dest>.map` next to the artifact
    External,
    /// Base64 data URL at the end of the artifact
    Inline,
}

/// Output of one bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSpec {
    pub dest: PathBuf,
    pub format: ModuleFormat,
    pub sourcemap: Option<SourceMapMode>,
    /// External module id -> global the host pre-loads
    pub globals: IndexMap<String, String>,
}

impl OutputSpec {
    pub fn new(dest: impl Into<PathBuf>, format: ModuleFormat) -> Self {
        Self {
            dest: dest.into(),
            format,
            sourcemap: None,
            globals: IndexMap::new(),
        }
    }

    pub fn amd(dest: impl Into<PathBuf>, module_id: Option<&str>) -> Self {
        Self::new(
            dest,
            ModuleFormat::Amd {
                module_id: module_id.map(str::to_string),
            },
        )
    }

    pub fn umd(dest: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self::new(dest, ModuleFormat::Umd { name: name.into() })
    }

    pub fn sourcemap(mut self, mode: SourceMapMode) -> Self {
        self.sourcemap = Some(mode);
        self
    }

    pub fn global(mut self, module: impl Into<String>, global: impl Into<String>) -> Self {
        self.globals.insert(module.into(), global.into());
        self
    }

    /// Whether `specifier` is provided by the host instead of being bundled.
    pub fn is_external(&self, specifier: &str) -> bool {
        self.globals.contains_key(specifier)
    }

    /// Path of the external source map, when one is written.
    pub fn map_path(&self) -> Option<PathBuf> {
        match self.sourcemap {
            Some(SourceMapMode::External) => {
                let mut name = self.dest.clone().into_os_string();
                name.push(".map");
                Some(PathBuf::from(name))
            }
            _ => None,
        }
    }
}

/// How bare specifiers that are not externals are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResolveOptions {
    /// Look bare specifiers up in `node_modules`
    pub node_modules: bool,
    /// Prefer a package's `jsnext:main` entry
    pub jsnext: bool,
}

impl ResolveOptions {
    /// `node_modules` lookup preferring `jsnext:main`.
    pub fn node_modules() -> Self {
        Self {
            node_modules: true,
            jsnext: true,
        }
    }
}

/// One independently buildable bundle.
#[derive(Debug, Clone)]
pub struct BundleDescriptor {
    pub name: String,
    /// Directory whose changes trigger rebuilds
    pub root: PathBuf,
    pub entry: PathBuf,
    pub pipeline: Pipeline,
    pub output: OutputSpec,
    pub resolve: ResolveOptions,
}

impl BundleDescriptor {
    pub fn new(
        name: impl Into<String>,
        root: impl Into<PathBuf>,
        entry: impl Into<PathBuf>,
        pipeline: Pipeline,
        output: OutputSpec,
    ) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            entry: entry.into(),
            pipeline,
            output,
            resolve: ResolveOptions::default(),
        }
    }

    pub fn resolve(mut self, resolve: ResolveOptions) -> Self {
        self.resolve = resolve;
        self
    }

    pub fn dest(&self) -> &Path {
        &self.output.dest
    }
}

/// Immutable, validated, ordered set of bundles.
///
/// The first descriptor is the framework bundle other bundles depend on at
/// runtime.
#[derive(Debug, Clone)]
pub struct BundleRegistry {
    bundles: Vec<Arc<BundleDescriptor>>,
}

impl BundleRegistry {
    /// Validate and freeze `bundles`.
    ///
    /// Rejects an empty list, repeated names, two bundles writing the same
    /// file and UMD bundles without a global name.
    pub fn new(bundles: Vec<BundleDescriptor>) -> Result<Self, ConfigError> {
        if bundles.is_empty() {
            return Err(ConfigError::EmptyRegistry);
        }

        let mut names = HashSet::new();
        let mut dests: HashMap<PathBuf, &str> = HashMap::new();
        for bundle in &bundles {
            if !names.insert(bundle.name.as_str()) {
                return Err(ConfigError::DuplicateName(bundle.name.clone()));
            }
            if let ModuleFormat::Umd { name } = &bundle.output.format {
                if name.trim().is_empty() {
                    return Err(ConfigError::MissingUmdName(bundle.name.clone()));
                }
            }
            let dest = bundle.output.dest.clean();
            if let Some(first) = dests.insert(dest.clone(), bundle.name.as_str()) {
                return Err(ConfigError::SharedDestination {
                    first: first.to_string(),
                    second: bundle.name.clone(),
                    dest,
                });
            }
        }

        Ok(Self {
            bundles: bundles.into_iter().map(Arc::new).collect(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<BundleDescriptor>> {
        self.bundles.iter()
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<BundleDescriptor>> {
        self.bundles.iter().find(|bundle| bundle.name == name)
    }

    /// The first declared bundle.
    pub fn framework(&self) -> &Arc<BundleDescriptor> {
        &self.bundles[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::Mode;
    use crate::pipeline::{PipelineOptions, compose};

    fn descriptor(name: &str, dest: &str) -> BundleDescriptor {
        let pipeline = compose(Mode::Development, &PipelineOptions::default()).unwrap();
        BundleDescriptor::new(
            name,
            format!("src/{name}"),
            format!("src/{name}/{name}.js"),
            pipeline,
            OutputSpec::amd(dest, Some(name)),
        )
    }

    #[test]
    fn test_keeps_declaration_order() {
        let registry = BundleRegistry::new(vec![
            descriptor("fw", "out/fw.js"),
            descriptor("bar", "out/bar.js"),
            descriptor("foo", "out/foo.js"),
        ])
        .unwrap();

        let names: Vec<_> = registry.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["fw", "bar", "foo"]);
        assert_eq!(registry.framework().name, "fw");
        assert_eq!(registry.get("bar").unwrap().dest(), Path::new("out/bar.js"));
        assert!(registry.get("baz").is_none());
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(
            BundleRegistry::new(Vec::new()),
            Err(ConfigError::EmptyRegistry)
        ));
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let err = BundleRegistry::new(vec![
            descriptor("bar", "out/a.js"),
            descriptor("bar", "out/b.js"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateName(name) if name == "bar"));
    }

    #[test]
    fn test_rejects_shared_destination_after_normalization() {
        let err = BundleRegistry::new(vec![
            descriptor("bar", "out/x.js"),
            descriptor("foo", "out/./sub/../x.js"),
        ])
        .unwrap_err();
        match err {
            ConfigError::SharedDestination { first, second, .. } => {
                assert_eq!(first, "bar");
                assert_eq!(second, "foo");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_blank_umd_name() {
        let mut fw = descriptor("fw", "out/fw.js");
        fw.output.format = ModuleFormat::Umd {
            name: "  ".to_string(),
        };
        assert!(matches!(
            BundleRegistry::new(vec![fw]),
            Err(ConfigError::MissingUmdName(_))
        ));
    }

    #[test]
    fn test_map_path_only_for_external_maps() {
        let spec = OutputSpec::umd("fake-cdn/fw.js", "$A");
        assert_eq!(spec.map_path(), None);

        let external = spec.clone().sourcemap(SourceMapMode::External);
        assert_eq!(external.map_path(), Some(PathBuf::from("fake-cdn/fw.js.map")));

        let inline = spec.sourcemap(SourceMapMode::Inline);
        assert_eq!(inline.map_path(), None);
    }

    #[test]
    fn test_format_serde_shape() {
        let amd: ModuleFormat =
            serde_json::from_str(r#"{"type":"amd","moduleId":"abc:bar"}"#).unwrap();
        assert_eq!(
            amd,
            ModuleFormat::Amd {
                module_id: Some("abc:bar".to_string())
            }
        );
        let umd: ModuleFormat = serde_json::from_str(r#"{"type":"umd","name":"$A"}"#).unwrap();
        assert_eq!(umd.as_str(), "umd");
    }
}
