//! Well-known project paths and specification-file discovery

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io;

/// Project-local directory holding `config.toml`
pub const CONFIG_DIR: &str = ".evospec";

/// Configuration file name inside [`CONFIG_DIR`]
pub const CONFIG_FILE: &str = "config.toml";

/// Suffix every specification document carries
pub const SPEC_FILE_SUFFIX: &str = ".evospec.yaml";

/// `<root>/.evospec/config.toml`
#[must_use]
pub fn config_path(root: &Utf8Path) -> Utf8PathBuf {
    root.join(CONFIG_DIR).join(CONFIG_FILE)
}

/// `<root>/<name>.evospec.yaml`
#[must_use]
pub fn spec_file_path(root: &Utf8Path, name: &str) -> Utf8PathBuf {
    root.join(format!("{name}{SPEC_FILE_SUFFIX}"))
}

/// Find the specification document in `dir`.
///
/// Returns the lexicographically first `*.evospec.yaml` file so the choice is
/// stable when several exist, or `None` when the directory holds none.
pub fn find_spec_file(dir: &Utf8Path) -> io::Result<Option<Utf8PathBuf>> {
    let mut candidates = Vec::new();
    for entry in fs::read_dir(dir.as_std_path())? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str()
            && name.ends_with(SPEC_FILE_SUFFIX)
        {
            candidates.push(dir.join(name));
        }
    }
    candidates.sort();
    Ok(candidates.into_iter().next())
}

/// Create `path` and its parents.
pub fn ensure_dir_all(path: &Utf8Path) -> io::Result<()> {
    fs::create_dir_all(path.as_std_path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn root(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn test_find_spec_file_picks_first_sorted() {
        let dir = TempDir::new().unwrap();
        let root = root(&dir);
        fs::write(root.join("zeta.evospec.yaml"), "").unwrap();
        fs::write(root.join("alpha.evospec.yaml"), "").unwrap();
        fs::write(root.join("notes.yaml"), "").unwrap();

        let found = find_spec_file(&root).unwrap().unwrap();
        assert_eq!(found.file_name(), Some("alpha.evospec.yaml"));
    }

    #[test]
    fn test_find_spec_file_none() {
        let dir = TempDir::new().unwrap();
        assert!(find_spec_file(&root(&dir)).unwrap().is_none());
    }

    #[test]
    fn test_well_known_paths() {
        let root = Utf8Path::new("/work/shop");
        assert_eq!(config_path(root), Utf8Path::new("/work/shop/.evospec/config.toml"));
        assert_eq!(
            spec_file_path(root, "shop"),
            Utf8Path::new("/work/shop/shop.evospec.yaml")
        );
    }
}
