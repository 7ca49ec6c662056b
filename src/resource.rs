use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Environment variable overriding the default resource root.
pub const RESOURCES_ENV: &str = "HTTPSTUB_RESOURCES";

const DEFAULT_RESOURCES_DIR: &str = "tests/resources";

///
/// Turns a logical resource path into its text content.
///
pub trait ResourceLoader {
    ///
    /// Reads the whole resource at `path` as UTF-8 text.
    ///
    fn load(&self, path: &str) -> io::Result<String>;
}

///
/// Loads resources from a directory on disk.
///
/// The default root is `$HTTPSTUB_RESOURCES` when set, otherwise `tests/resources` under
/// `$CARGO_MANIFEST_DIR` (or under the working directory outside of cargo).
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileResources {
    root: PathBuf,
}

impl FileResources {
    /// Loads resources relative to `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory paths are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

impl Default for FileResources {
    fn default() -> Self {
        if let Some(root) = env::var_os(RESOURCES_ENV) {
            return Self::new(root);
        }

        let base = env::var_os("CARGO_MANIFEST_DIR")
            .map(PathBuf::from)
            .unwrap_or_default();

        Self::new(base.join(DEFAULT_RESOURCES_DIR))
    }
}

impl ResourceLoader for FileResources {
    fn load(&self, path: &str) -> io::Result<String> {
        let resolved = self.resolve(path);
        log::debug!("Loading resource {}", resolved.display());

        let bytes = fs::read(&resolved)?;
        String::from_utf8(bytes).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root(name: &str) -> PathBuf {
        let root = env::temp_dir().join(format!("httpstub-{}-{}", name, std::process::id()));
        fs::create_dir_all(&root).unwrap();
        root
    }

    #[test]
    fn test_load_relative_path() {
        let root = temp_root("relative");
        fs::write(root.join("hello.txt"), "hello world").unwrap();

        let loader = FileResources::new(&root);

        assert_eq!("hello world", loader.load("hello.txt").unwrap());
    }

    #[test]
    fn test_leading_slash_is_ignored() {
        let root = temp_root("slash");
        fs::write(root.join("data.json"), "{}").unwrap();

        let loader = FileResources::new(&root);

        assert_eq!("{}", loader.load("/data.json").unwrap());
    }

    #[test]
    fn test_missing_resource() {
        let loader = FileResources::new(temp_root("missing"));

        let err = loader.load("nope.json").unwrap_err();

        assert_eq!(io::ErrorKind::NotFound, err.kind());
    }

    #[test]
    fn test_invalid_utf8() {
        let root = temp_root("utf8");
        fs::write(root.join("binary.bin"), [0xff, 0xfe, 0xfd]).unwrap();

        let err = FileResources::new(&root).load("binary.bin").unwrap_err();

        assert_eq!(io::ErrorKind::InvalidData, err.kind());
    }
}
