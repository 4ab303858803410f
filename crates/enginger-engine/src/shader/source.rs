use std::fs;
use std::path::Path;

use super::ShaderError;

/// Reads a whole shader source file.
pub fn read_source(path: impl AsRef<Path>) -> Result<String, ShaderError> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|source| {
        log::error!("::Error: shader file reading failed. {} ({source})", path.display());
        ShaderError::Read {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("enginger-source-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn reads_whole_file() {
        let dir = scratch_dir("whole");
        let file = dir.join("v.wgsl");
        fs::write(&file, "line one\nline two\n").unwrap();

        assert_eq!(read_source(&file).unwrap(), "line one\nline two\n");
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn missing_file_carries_path_and_os_reason() {
        let path = scratch_dir("missing").join("nope.wgsl");
        match read_source(&path) {
            Err(ShaderError::Read { path: p, source }) => {
                assert_eq!(p, path);
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected read error, got {other:?}"),
        }
    }
}
