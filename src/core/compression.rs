// Compressed CSV input backends

use crate::core::error::{DashError, Result};
use flate2::read::GzDecoder;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    None,
    Gzip,
    Lz4,
    Zstd,
}

impl CompressionType {
    /// Picks the backend from the last file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("gz") => CompressionType::Gzip,
            Some("lz4") => CompressionType::Lz4,
            Some("zst") | Some("zstd") => CompressionType::Zstd,
            _ => CompressionType::None,
        }
    }
}

pub fn decompressing_reader<'a, R: Read + 'a>(
    inner: R,
    compression: CompressionType,
) -> Result<Box<dyn Read + 'a>> {
    match compression {
        CompressionType::None => Ok(Box::new(inner)),

        CompressionType::Gzip => Ok(Box::new(GzDecoder::new(inner))),

        #[cfg(feature = "lz4")]
        CompressionType::Lz4 => lz4::Decoder::new(inner)
            .map(|d| Box::new(d) as Box<dyn Read + 'a>)
            .map_err(|e| DashError::DecompressionFailed(format!("LZ4: {}", e))),

        #[cfg(not(feature = "lz4"))]
        CompressionType::Lz4 => Err(DashError::DecompressionFailed(
            "LZ4 support not compiled in".to_string(),
        )),

        #[cfg(feature = "zstd")]
        CompressionType::Zstd => zstd::stream::read::Decoder::new(inner)
            .map(|d| Box::new(d) as Box<dyn Read + 'a>)
            .map_err(|e| DashError::DecompressionFailed(format!("Zstd: {}", e))),

        #[cfg(not(feature = "zstd"))]
        CompressionType::Zstd => Err(DashError::DecompressionFailed(
            "Zstd support not compiled in".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(
            CompressionType::from_path(Path::new("demo.csv")),
            CompressionType::None
        );
        assert_eq!(
            CompressionType::from_path(Path::new("demo.csv.gz")),
            CompressionType::Gzip
        );
        assert_eq!(
            CompressionType::from_path(Path::new("demo.csv.zst")),
            CompressionType::Zstd
        );
        assert_eq!(
            CompressionType::from_path(Path::new("demo.csv.lz4")),
            CompressionType::Lz4
        );
    }

    #[test]
    fn test_plain_passthrough() {
        let mut out = String::new();
        decompressing_reader(&b"Time,Instance"[..], CompressionType::None)
            .unwrap()
            .read_to_string(&mut out)
            .unwrap();
        assert_eq!(out, "Time,Instance");
    }

    #[test]
    fn test_gzip() {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;

        let original = b"Time,Instance\n1,2\n";
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(original).unwrap();
        let compressed = encoder.finish().unwrap();

        let mut out = Vec::new();
        decompressing_reader(&compressed[..], CompressionType::Gzip)
            .unwrap()
            .read_to_end(&mut out)
            .unwrap();
        assert_eq!(out, original);
    }

    #[cfg(feature = "zstd")]
    #[test]
    fn test_zstd() {
        let original = b"Time,Instance\n1,2\n";
        let compressed = zstd::encode_all(&original[..], 0).unwrap();

        let mut out = Vec::new();
        decompressing_reader(&compressed[..], CompressionType::Zstd)
            .unwrap()
            .read_to_end(&mut out)
            .unwrap();
        assert_eq!(out, original);
    }

    #[cfg(feature = "lz4")]
    #[test]
    fn test_lz4() {
        use std::io::Write;

        let original = b"Time,Instance\n1,2\n";
        let mut encoder = lz4::EncoderBuilder::new().build(Vec::new()).unwrap();
        encoder.write_all(original).unwrap();
        let (compressed, result) = encoder.finish();
        result.unwrap();

        let mut out = Vec::new();
        decompressing_reader(&compressed[..], CompressionType::Lz4)
            .unwrap()
            .read_to_end(&mut out)
            .unwrap();
        assert_eq!(out, original);
    }
}
