//! Specifier resolution.

use path_clean::PathClean;
use std::path::{Path, PathBuf};

use crate::registry::ResolveOptions;
use crate::runtime::Runtime;

/// Extensions probed, in order, when a specifier has none that exists.
const EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "js", "mjs", "cjs", "jsx"];

/// Resolve `specifier` as required from `importer`.
///
/// Relative and absolute specifiers are probed as files, then with each
/// known extension appended, then as a directory index. Bare specifiers are
/// looked up in `node_modules` directories from the importer upwards, when
/// `options` allow it.
pub(crate) async fn resolve(
    runtime: &dyn Runtime,
    importer: &Path,
    specifier: &str,
    options: &ResolveOptions,
) -> Option<PathBuf> {
    let base_dir = importer.parent().unwrap_or_else(|| Path::new(""));

    if is_path_like(specifier) {
        return probe(runtime, &base_dir.join(specifier).clean()).await;
    }

    if !options.node_modules {
        return None;
    }

    let (package, subpath) = split_package(specifier)?;
    for dir in base_dir.ancestors() {
        let package_dir = dir.join("node_modules").join(package);

        let found = match subpath {
            Some(subpath) => probe(runtime, &package_dir.join(subpath).clean()).await,
            None => package_entry(runtime, &package_dir, options).await,
        };
        if found.is_some() {
            return found;
        }
    }
    None
}

fn is_path_like(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
        || Path::new(specifier).is_absolute()
}

/// `@scope/name/sub/path` -> (`@scope/name`, `sub/path`)
fn split_package(specifier: &str) -> Option<(&str, Option<&str>)> {
    let name_len = if specifier.starts_with('@') {
        let first = specifier.find('/')?;
        specifier[first + 1..]
            .find('/')
            .map_or(specifier.len(), |second| first + 1 + second)
    } else {
        specifier.find('/').unwrap_or(specifier.len())
    };

    let (name, rest) = specifier.split_at(name_len);
    if name.is_empty() {
        return None;
    }
    let subpath = rest.strip_prefix('/').filter(|s| !s.is_empty());
    Some((name, subpath))
}

async fn package_entry(
    runtime: &dyn Runtime,
    package_dir: &Path,
    options: &ResolveOptions,
) -> Option<PathBuf> {
    if let Ok(bytes) = runtime.read_file(&package_dir.join("package.json")).await {
        if let Ok(manifest) = serde_json::from_slice::<serde_json::Value>(&bytes) {
            let fields: &[&str] = if options.jsnext {
                &["jsnext:main", "module", "main"]
            } else {
                &["module", "main"]
            };
            for field in fields {
                if let Some(entry) = manifest.get(*field).and_then(|v| v.as_str()) {
                    if let Some(found) = probe(runtime, &package_dir.join(entry).clean()).await {
                        return Some(found);
                    }
                }
            }
        }
    }
    probe(runtime, &package_dir.join("index")).await
}

async fn probe(runtime: &dyn Runtime, base: &Path) -> Option<PathBuf> {
    let with_extension = |path: &Path, ext: &str| {
        let mut name = path.as_os_str().to_owned();
        name.push(".");
        name.push(ext);
        PathBuf::from(name)
    };

    let candidates = std::iter::once(base.to_path_buf())
        .chain(EXTENSIONS.iter().map(|ext| with_extension(base, ext)))
        .chain(EXTENSIONS.iter().map(|ext| base.join(format!("index.{ext}"))))
        .collect();

    runtime.find_file(candidates).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{NativeRuntime, RuntimeResult};
    use async_trait::async_trait;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_split_package() {
        assert_eq!(split_package("lodash"), Some(("lodash", None)));
        assert_eq!(split_package("lodash/fp/map"), Some(("lodash", Some("fp/map"))));
        assert_eq!(split_package("@scope/pkg"), Some(("@scope/pkg", None)));
        assert_eq!(split_package("@scope/pkg/sub"), Some(("@scope/pkg", Some("sub"))));
        assert_eq!(split_package("@scope"), None);
    }

    #[tokio::test]
    async fn test_relative_probing() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "src/a.js", "");
        write(root, "src/b.ts", "");
        write(root, "src/c/index.js", "");

        let runtime = NativeRuntime::new(root);
        let importer = root.join("src/a.js");
        let options = ResolveOptions::default();

        assert_eq!(
            resolve(&runtime, &importer, "./a.js", &options).await,
            Some(root.join("src/a.js"))
        );
        assert_eq!(
            resolve(&runtime, &importer, "./b", &options).await,
            Some(root.join("src/b.ts"))
        );
        assert_eq!(
            resolve(&runtime, &importer, "./c", &options).await,
            Some(root.join("src/c/index.js"))
        );
        assert_eq!(resolve(&runtime, &importer, "./missing", &options).await, None);
    }

    #[tokio::test]
    async fn test_bare_specifiers_need_node_modules() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "src/framework/main.js", "");
        write(
            root,
            "node_modules/lib/package.json",
            r#"{"main": "dist/lib.cjs.js", "jsnext:main": "src/index.js"}"#,
        );
        write(root, "node_modules/lib/dist/lib.cjs.js", "");
        write(root, "node_modules/lib/src/index.js", "");
        write(root, "node_modules/lib/extra.js", "");

        let runtime = NativeRuntime::new(root);
        let importer = root.join("src/framework/main.js");

        assert_eq!(
            resolve(&runtime, &importer, "lib", &ResolveOptions::default()).await,
            None
        );
        assert_eq!(
            resolve(&runtime, &importer, "lib", &ResolveOptions::node_modules()).await,
            Some(root.join("node_modules/lib/src/index.js"))
        );

        let plain = ResolveOptions {
            node_modules: true,
            jsnext: false,
        };
        assert_eq!(
            resolve(&runtime, &importer, "lib", &plain).await,
            Some(root.join("node_modules/lib/dist/lib.cjs.js"))
        );
        assert_eq!(
            resolve(&runtime, &importer, "lib/extra", &plain).await,
            Some(root.join("node_modules/lib/extra.js"))
        );
    }

    /// Native runtime that counts batched lookups
    #[derive(Debug)]
    struct CountingRuntime {
        inner: NativeRuntime,
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl Runtime for CountingRuntime {
        async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
            self.inner.read_file(path).await
        }

        async fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()> {
            self.inner.write_file(path, content).await
        }

        async fn create_dir(&self, path: &Path, recursive: bool) -> RuntimeResult<()> {
            self.inner.create_dir(path, recursive).await
        }

        async fn is_file(&self, _path: &Path) -> bool {
            panic!("lookups must be batched through find_file");
        }

        async fn find_file(&self, candidates: Vec<PathBuf>) -> Option<PathBuf> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.find_file(candidates).await
        }

        fn cwd(&self) -> &Path {
            self.inner.cwd()
        }
    }

    #[tokio::test]
    async fn test_lookups_are_batched_per_specifier() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "src/a.js", "");
        write(root, "src/c/index.tsx", "");

        let runtime = CountingRuntime {
            inner: NativeRuntime::new(root),
            lookups: AtomicUsize::new(0),
        };
        let importer = root.join("src/a.js");
        let options = ResolveOptions::default();

        assert_eq!(
            resolve(&runtime, &importer, "./c", &options).await,
            Some(root.join("src/c/index.tsx"))
        );
        assert_eq!(runtime.lookups.load(Ordering::SeqCst), 1);

        assert_eq!(resolve(&runtime, &importer, "./gone", &options).await, None);
        assert_eq!(runtime.lookups.load(Ordering::SeqCst), 2);
    }
}
