use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::policy::declared_type_for_extension;

/// Where a candidate file's bytes live.
#[derive(Debug, Clone)]
pub enum FileSource {
    /// Bytes already held in memory.
    Memory(Bytes),
    /// A file on disk, read one range at a time.
    Path(PathBuf),
}

impl FileSource {
    /// Read exactly `len` bytes starting at `start`.
    ///
    /// Fails with `UnexpectedEof` if the source holds fewer bytes than requested.
    pub async fn read_range(&self, start: u64, len: u64) -> io::Result<Bytes> {
        match self {
            FileSource::Memory(bytes) => {
                let end = start.checked_add(len).ok_or_else(|| {
                    io::Error::new(io::ErrorKind::InvalidInput, "range overflows")
                })?;
                if end > bytes.len() as u64 {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!(
                            "range {}..{} is past the end of a {} byte buffer",
                            start,
                            end,
                            bytes.len()
                        ),
                    ));
                }
                Ok(bytes.slice(start as usize..end as usize))
            }
            FileSource::Path(path) => {
                let mut file = tokio::fs::File::open(path).await?;
                file.seek(SeekFrom::Start(start)).await?;

                let mut buffer = Vec::with_capacity(len as usize);
                file.take(len).read_to_end(&mut buffer).await?;

                if (buffer.len() as u64) < len {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!(
                            "{} is shorter than expected: read {} of {} bytes at offset {}",
                            path.display(),
                            buffer.len(),
                            len,
                            start
                        ),
                    ));
                }

                Ok(Bytes::from(buffer))
            }
        }
    }
}

/// One candidate file handed over by the caller. Read-only to the uploader.
#[derive(Debug, Clone)]
pub struct FileDescriptor {
    pub name: String,
    pub declared_type: String,
    pub size_bytes: u64,
    pub source: FileSource,
}

impl FileDescriptor {
    pub fn new(
        name: impl Into<String>,
        declared_type: impl Into<String>,
        size_bytes: u64,
        source: FileSource,
    ) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            size_bytes,
            source,
        }
    }

    /// Descriptor for an in-memory buffer; the size is the buffer length.
    pub fn from_bytes(
        name: impl Into<String>,
        declared_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        let data = data.into();
        let size_bytes = data.len() as u64;
        Self::new(name, declared_type, size_bytes, FileSource::Memory(data))
    }

    /// Descriptor for a file on disk.
    ///
    /// The size comes from file metadata. Without an explicit declared type, one is
    /// picked from the fixed extension table.
    pub async fn from_path(
        path: impl AsRef<Path>,
        declared_type: Option<&str>,
    ) -> io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{} has no file name", path.display()),
                )
            })?;

        let declared_type = match declared_type {
            Some(t) => t.to_string(),
            None => declared_type_for_extension(&file_extension(&name)).to_string(),
        };

        Ok(Self::new(
            name,
            declared_type,
            metadata.len(),
            FileSource::Path(path.to_path_buf()),
        ))
    }

    /// Lowercased extension of this file's name, see [`file_extension`].
    pub fn extension(&self) -> String {
        file_extension(&self.name)
    }
}

/// Text after the last `.` of a file name, lowercased.
///
/// A name without any `.` is returned whole, so `"pdf"` has extension `"pdf"`
/// and `"archive."` has an empty extension.
pub fn file_extension(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .unwrap_or(file_name)
        .to_lowercase()
}
