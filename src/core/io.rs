use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use memmap2::Mmap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

pub struct MmapSource {
    mmap: Mmap,
}

impl MmapSource {
    pub fn open(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        // SAFETY: read-only file mapping.
        let mmap = unsafe { Mmap::map(&file) }
            .with_context(|| format!("mmap failed for {}", path.display()))?;
        Ok(Self { mmap })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.mmap
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputKind {
    Plain,
    Gzip,
}

/// Whole contents of one input file, mapped or decompressed.
pub enum InputData {
    Mapped(MmapSource),
    Owned(Vec<u8>),
}

impl InputData {
    pub fn open(path: &Path) -> Result<Self> {
        match detect_input_kind(path)? {
            InputKind::Plain => {
                let len = std::fs::metadata(path)
                    .with_context(|| format!("failed to stat {}", path.display()))?
                    .len();
                // zero-length files cannot be mapped
                if len == 0 {
                    return Ok(InputData::Owned(Vec::new()));
                }
                Ok(InputData::Mapped(MmapSource::open(path)?))
            }
            InputKind::Gzip => {
                let file = File::open(path)
                    .with_context(|| format!("failed to open {}", path.display()))?;
                let mut decoder = MultiGzDecoder::new(BufReader::new(file));
                let mut buf = Vec::new();
                decoder
                    .read_to_end(&mut buf)
                    .with_context(|| format!("gzip decompression error in {}", path.display()))?;
                Ok(InputData::Owned(buf))
            }
        }
    }

    pub fn bytes(&self) -> &[u8] {
        match self {
            InputData::Mapped(m) => m.bytes(),
            InputData::Owned(v) => v,
        }
    }

    pub fn text(&self, path: &Path) -> Result<&str> {
        std::str::from_utf8(self.bytes())
            .with_context(|| format!("{} is not valid UTF-8", path.display()))
    }
}

pub fn detect_input_kind(path: &Path) -> Result<InputKind> {
    if let Some(ext) = path.extension().and_then(|s| s.to_str()) {
        if ext.eq_ignore_ascii_case("gz") {
            return Ok(InputKind::Gzip);
        }
    }
    let mut file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut magic = [0u8; 2];
    let n = file
        .read(&mut magic)
        .with_context(|| format!("failed to read magic bytes of {}", path.display()))?;
    if n == 2 && magic == [0x1f, 0x8b] {
        Ok(InputKind::Gzip)
    } else {
        Ok(InputKind::Plain)
    }
}

/// Lazy line iterator; strips `\n` and a trailing `\r`.
pub struct Lines<'a> {
    rest: &'a str,
}

pub fn lines(text: &str) -> Lines<'_> {
    Lines { rest: text }
}

impl<'a> Iterator for Lines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        let (line, rest) = match memchr::memchr(b'\n', self.rest.as_bytes()) {
            Some(i) => (&self.rest[..i], &self.rest[i + 1..]),
            None => (self.rest, ""),
        };
        self.rest = rest;
        Some(line.strip_suffix('\r').unwrap_or(line))
    }
}
