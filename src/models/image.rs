//! 图片编码模型
//!
//! 参考图和用户照片在流程中统一以 Data URL（`data:<mime>;base64,<payload>`）
//! 的形式传递，与浏览器 `readAsDataURL` 的产物一致。

use base64::{engine::general_purpose::STANDARD, Engine as _};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::error::{AppResult, IngestError};

/// 浏览器支持的图片格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    WebP,
    Bmp,
    Avif,
}

impl ImageFormat {
    /// 获取 MIME 类型
    pub fn mime(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Avif => "image/avif",
        }
    }

    /// 获取文件扩展名
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Gif => "gif",
            ImageFormat::WebP => "webp",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Avif => "avif",
        }
    }

    /// 从 MIME 类型解析格式
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(ImageFormat::Png),
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(ImageFormat::Jpeg),
            "image/gif" => Some(ImageFormat::Gif),
            "image/webp" => Some(ImageFormat::WebP),
            "image/bmp" | "image/x-ms-bmp" => Some(ImageFormat::Bmp),
            "image/avif" => Some(ImageFormat::Avif),
            _ => None,
        }
    }

    /// 根据文件头（magic bytes）识别格式
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(ImageFormat::Png);
        }
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }
        if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            return Some(ImageFormat::Gif);
        }
        if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }
        if bytes.len() >= 12
            && &bytes[4..8] == b"ftyp"
            && (&bytes[8..12] == b"avif" || &bytes[8..12] == b"avis")
        {
            return Some(ImageFormat::Avif);
        }
        // BMP 文件头只有两个字节，放在最后判断
        if bytes.len() >= 14 && bytes.starts_with(b"BM") {
            return Some(ImageFormat::Bmp);
        }
        None
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.mime())
    }
}

fn data_url_regex() -> &'static Regex {
    static DATA_URL: OnceLock<Regex> = OnceLock::new();
    DATA_URL.get_or_init(|| {
        Regex::new(r"^data:(image/[A-Za-z0-9.+-]+);base64,([A-Za-z0-9+/=]+)$")
            .expect("data url regex is valid")
    })
}

/// 已编码的图片（Data URL）
///
/// 只能通过 [`EncodedImage::from_bytes`] 或 [`EncodedImage::parse`] 构造，
/// 保证内部始终是受支持格式的合法 Data URL。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EncodedImage {
    format: ImageFormat,
    data_url: String,
}

impl EncodedImage {
    /// 从原始字节编码图片
    ///
    /// 格式由文件头判断，不信任文件扩展名。
    pub fn from_bytes(bytes: &[u8], source_name: &str) -> AppResult<Self> {
        if bytes.is_empty() {
            return Err(IngestError::EmptyImage {
                source_name: source_name.to_string(),
            }
            .into());
        }

        let format = ImageFormat::detect(bytes).ok_or_else(|| IngestError::UnsupportedFormat {
            source_name: source_name.to_string(),
        })?;

        let data_url = format!("data:{};base64,{}", format.mime(), STANDARD.encode(bytes));

        Ok(Self { format, data_url })
    }

    /// 解析已有的 Data URL
    ///
    /// 声明的 MIME 类型必须受支持，且 payload 的文件头必须与之一致。
    pub fn parse(data_url: &str) -> AppResult<Self> {
        let data_url = data_url.trim();
        let caps = data_url_regex()
            .captures(data_url)
            .ok_or_else(|| IngestError::MalformedDataUrl {
                preview: crate::utils::logging::truncate_text(data_url, 40),
            })?;

        let declared = ImageFormat::from_mime(&caps[1]).ok_or_else(|| {
            IngestError::UnsupportedFormat {
                source_name: caps[1].to_string(),
            }
        })?;

        let decoded = STANDARD.decode(&caps[2])?;
        let image = Self::from_bytes(&decoded, &caps[1])?;

        if image.format != declared {
            return Err(IngestError::FormatMismatch {
                declared,
                detected: image.format,
            }
            .into());
        }

        Ok(image)
    }

    /// 图片格式
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// 完整的 Data URL
    pub fn as_data_url(&self) -> &str {
        &self.data_url
    }

    /// 解码为原始字节
    pub fn decode(&self) -> AppResult<Vec<u8>> {
        let payload = self
            .data_url
            .split_once(";base64,")
            .map(|(_, payload)| payload)
            .unwrap_or_default();
        Ok(STANDARD.decode(payload)?)
    }
}

impl TryFrom<String> for EncodedImage {
    type Error = crate::error::AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EncodedImage> for String {
    fn from(image: EncodedImage) -> Self {
        image.data_url
    }
}

impl std::fmt::Display for EncodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{} {} bytes>", self.format, self.data_url.len())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// 最小的 PNG 文件头，足够通过格式识别
    pub(crate) fn png_bytes(seed: u8) -> Vec<u8> {
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend_from_slice(&[0, 0, 0, 13, b'I', b'H', b'D', b'R', seed]);
        bytes
    }

    #[test]
    fn test_detect_formats() {
        assert_eq!(ImageFormat::detect(&png_bytes(1)), Some(ImageFormat::Png));
        assert_eq!(
            ImageFormat::detect(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(ImageFormat::detect(b"GIF89a...."), Some(ImageFormat::Gif));
        assert_eq!(
            ImageFormat::detect(b"RIFF\x10\x00\x00\x00WEBPVP8 "),
            Some(ImageFormat::WebP)
        );
        assert_eq!(
            ImageFormat::detect(b"\x00\x00\x00\x1cftypavif\x00\x00"),
            Some(ImageFormat::Avif)
        );
        assert_eq!(ImageFormat::detect(b"hello, world"), None);
        assert_eq!(ImageFormat::detect(b"BM"), None);
    }

    #[test]
    fn test_from_bytes_builds_data_url() {
        let image = EncodedImage::from_bytes(&png_bytes(7), "pose.png").unwrap();
        assert_eq!(image.format(), ImageFormat::Png);
        assert!(image.as_data_url().starts_with("data:image/png;base64,"));
        assert_eq!(image.decode().unwrap(), png_bytes(7));
    }

    #[test]
    fn test_from_bytes_rejects_non_images() {
        let err = EncodedImage::from_bytes(b"%PDF-1.7 not an image", "doc.pdf").unwrap_err();
        assert!(matches!(
            err,
            crate::error::AppError::Ingest(IngestError::UnsupportedFormat { .. })
        ));

        let err = EncodedImage::from_bytes(&[], "empty.png").unwrap_err();
        assert!(matches!(
            err,
            crate::error::AppError::Ingest(IngestError::EmptyImage { .. })
        ));
    }

    #[test]
    fn test_parse_data_url() {
        let original = EncodedImage::from_bytes(&png_bytes(3), "pose.png").unwrap();
        let parsed = EncodedImage::parse(original.as_data_url()).unwrap();
        assert_eq!(parsed, original);

        assert!(EncodedImage::parse("data:text/plain;base64,aGVsbG8=").is_err());
        assert!(EncodedImage::parse("https://example.com/a.png").is_err());
        assert!(EncodedImage::parse("data:image/png;base64,@@@").is_err());
    }

    #[test]
    fn test_parse_checks_payload_magic_bytes() {
        // "hello" 不是图片
        let err = EncodedImage::parse("data:image/png;base64,aGVsbG8=").unwrap_err();
        assert!(matches!(
            err,
            crate::error::AppError::Ingest(IngestError::UnsupportedFormat { .. })
        ));

        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        let err = EncodedImage::parse(&format!("data:image/png;base64,{}", STANDARD.encode(jpeg)))
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::AppError::Ingest(IngestError::FormatMismatch {
                declared: ImageFormat::Png,
                detected: ImageFormat::Jpeg,
            })
        ));

        // 别名 MIME 会被规范化
        let parsed =
            EncodedImage::parse(&format!("data:image/jpg;base64,{}", STANDARD.encode(jpeg)))
                .unwrap();
        assert_eq!(parsed.format(), ImageFormat::Jpeg);
        assert!(parsed.as_data_url().starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_serde_as_plain_string() {
        let image = EncodedImage::from_bytes(&png_bytes(5), "pose.png").unwrap();
        let json = serde_json::to_string(&image).unwrap();
        assert_eq!(json, format!("\"{}\"", image.as_data_url()));

        let back: EncodedImage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, image);
    }
}
