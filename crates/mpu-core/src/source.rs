//! Byte sources for part bodies.
//!
//! A source hands out the bytes of one part at a time. Reads are positional
//! (pread-style), so one source can be shared by every part task in a wave.

use std::fs::File;
use std::ops::Range;
#[cfg(unix)]
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::chunker::Part;

/// Random-access source of upload bytes.
pub trait PartSource: Send + Sync + 'static {
    /// Total length in bytes.
    fn len(&self) -> u64;

    /// Read exactly the bytes of `part`.
    fn read_part(&self, part: &Part) -> std::io::Result<Vec<u8>>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Local file read with positional reads. Safe to clone and use from multiple tasks.
#[derive(Clone)]
pub struct FileSource {
    file: Arc<File>,
    path: PathBuf,
    len: u64,
}

impl FileSource {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
        let len = file
            .metadata()
            .with_context(|| format!("stat {}", path.display()))?
            .len();
        Ok(Self {
            file: Arc::new(file),
            path: path.to_path_buf(),
            len,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PartSource for FileSource {
    fn len(&self) -> u64 {
        self.len
    }

    #[cfg(unix)]
    fn read_part(&self, part: &Part) -> std::io::Result<Vec<u8>> {
        let mut buf = vec![0u8; part.len() as usize];
        self.file.read_exact_at(&mut buf, part.start)?;
        Ok(buf)
    }

    /// Non-Unix fallback: seek + read on a cloned handle.
    #[cfg(not(unix))]
    fn read_part(&self, part: &Part) -> std::io::Result<Vec<u8>> {
        use std::io::{Read, Seek, SeekFrom};
        let mut f = self.file.try_clone()?;
        f.seek(SeekFrom::Start(part.start))?;
        let mut buf = vec![0u8; part.len() as usize];
        f.read_exact(&mut buf)?;
        Ok(buf)
    }
}

/// In-memory source, handy for small payloads and tests.
#[derive(Clone)]
pub struct BytesSource(Arc<[u8]>);

impl BytesSource {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self(bytes.into())
    }
}

impl PartSource for BytesSource {
    fn len(&self) -> u64 {
        self.0.len() as u64
    }

    fn read_part(&self, part: &Part) -> std::io::Result<Vec<u8>> {
        let Range { start, end } = part.range();
        self.0
            .get(start as usize..end as usize)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    format!("part {} past end of source", part.number),
                )
            })
    }
}

/// A file chosen for upload: display name, size, content type and its bytes.
#[derive(Clone)]
pub struct SelectedFile {
    pub name: String,
    pub content_type: String,
    pub source: Arc<dyn PartSource>,
}

impl SelectedFile {
    pub const DEFAULT_CONTENT_TYPE: &'static str = "application/octet-stream";

    /// Open a local file. The name is the path's final component.
    pub fn open(path: &Path, content_type: Option<&str>) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .with_context(|| format!("{} has no file name", path.display()))?;
        let source = FileSource::open(path)?;
        Ok(Self {
            name,
            content_type: content_type.unwrap_or(Self::DEFAULT_CONTENT_TYPE).to_string(),
            source: Arc::new(source),
        })
    }

    pub fn from_source(name: impl Into<String>, source: Arc<dyn PartSource>) -> Self {
        Self {
            name: name.into(),
            content_type: Self::DEFAULT_CONTENT_TYPE.to_string(),
            source,
        }
    }

    pub fn size(&self) -> u64 {
        self.source.len()
    }
}

impl std::fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("size", &self.size())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::split;
    use std::io::Write;

    #[test]
    fn file_source_reads_parts_at_offsets() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        let body: Vec<u8> = (0u8..=255).cycle().take(1000).collect();
        f.write_all(&body).unwrap();
        f.flush().unwrap();

        let src = FileSource::open(f.path()).unwrap();
        assert_eq!(src.len(), 1000);
        let parts = split(src.len(), 300).unwrap();
        let mut joined = Vec::new();
        for p in &parts {
            let bytes = src.read_part(p).unwrap();
            assert_eq!(bytes.len() as u64, p.len());
            joined.extend_from_slice(&bytes);
        }
        assert_eq!(joined, body);
    }

    #[test]
    fn bytes_source_out_of_range() {
        let src = BytesSource::new(vec![1u8, 2, 3]);
        let p = Part { number: 1, start: 2, end: 5 };
        assert!(src.read_part(&p).is_err());
    }

    #[test]
    fn selected_file_name_and_default_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movie.mp4");
        std::fs::write(&path, b"abc").unwrap();
        let sel = SelectedFile::open(&path, None).unwrap();
        assert_eq!(sel.name, "movie.mp4");
        assert_eq!(sel.size(), 3);
        assert_eq!(sel.content_type, SelectedFile::DEFAULT_CONTENT_TYPE);
    }
}
