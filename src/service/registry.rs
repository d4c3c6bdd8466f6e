use std::path::Path;

use crate::error::{ConversionError, Result};
use crate::models::format::FormatDescriptor;

// 共用 MIME 的項目以先宣告者為準（by_mime_type 回傳第一筆）
pub static FORMATS: &[FormatDescriptor] = &[
    FormatDescriptor {
        extension: "txt",
        mime_type: "text/plain",
        display_name: "Text",
        description: "純文字檔",
    },
    FormatDescriptor {
        extension: "text",
        mime_type: "text/plain",
        display_name: "Text",
        description: "純文字輸出",
    },
    FormatDescriptor {
        extension: "markdown",
        mime_type: "text/markdown",
        display_name: "Markdown",
        description: "Markdown 文件",
    },
    FormatDescriptor {
        extension: "html",
        mime_type: "text/html",
        display_name: "HTML",
        description: "網頁文件",
    },
    FormatDescriptor {
        extension: "pdf",
        mime_type: "application/pdf",
        display_name: "PDF",
        description: "可攜式文件格式",
    },
    FormatDescriptor {
        extension: "docx",
        mime_type: "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        display_name: "Word",
        description: "Microsoft Word 文件",
    },
    FormatDescriptor {
        extension: "png",
        mime_type: "image/png",
        display_name: "PNG",
        description: "無損壓縮圖片",
    },
    FormatDescriptor {
        extension: "jpeg",
        mime_type: "image/jpeg",
        display_name: "JPEG",
        description: "有損壓縮圖片",
    },
    FormatDescriptor {
        extension: "jpg",
        mime_type: "image/jpeg",
        display_name: "JPEG",
        description: "有損壓縮圖片",
    },
    FormatDescriptor {
        extension: "gif",
        mime_type: "image/gif",
        display_name: "GIF",
        description: "圖形交換格式",
    },
    FormatDescriptor {
        extension: "bmp",
        mime_type: "image/bmp",
        display_name: "BMP",
        description: "點陣圖",
    },
    FormatDescriptor {
        extension: "webp",
        mime_type: "image/webp",
        display_name: "WebP",
        description: "WebP 圖片",
    },
];

/// 去除開頭的點並轉為小寫
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

/// 目標副檔名的標準寫法；`jpg` 視為 `jpeg`，與規則表一致
pub fn canonical_target(ext: &str) -> String {
    match normalize_extension(ext).as_str() {
        "jpg" => "jpeg".to_string(),
        other => other.to_string(),
    }
}

/// 靜態格式目錄的查詢入口，所有查詢皆無副作用
pub struct FormatRegistry;

impl FormatRegistry {
    pub fn all() -> &'static [FormatDescriptor] {
        FORMATS
    }

    pub fn by_extension(ext: &str) -> Option<&'static FormatDescriptor> {
        let ext = normalize_extension(ext);
        if ext.is_empty() {
            return None;
        }
        FORMATS.iter().find(|f| f.extension == ext)
    }

    /// 僅精確比對，不做前綴或萬用字元比對
    pub fn by_mime_type(mime: &str) -> Option<&'static FormatDescriptor> {
        FORMATS.iter().find(|f| f.mime_type == mime)
    }

    pub fn require_extension(ext: &str) -> Result<&'static FormatDescriptor> {
        Self::by_extension(ext).ok_or_else(|| ConversionError::MissingFormatDescriptor(ext.to_string()))
    }

    pub fn for_path(path: &Path) -> Option<&'static FormatDescriptor> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::by_extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn extension_lookup_is_normalized() {
        let plain = FormatRegistry::by_extension("png").unwrap();
        assert_eq!(FormatRegistry::by_extension("PNG"), Some(plain));
        assert_eq!(FormatRegistry::by_extension(".png"), Some(plain));
        assert_eq!(FormatRegistry::by_extension(".PnG"), Some(plain));
        assert_eq!(plain.mime_type, "image/png");
    }

    #[test]
    fn missing_extension_is_not_found() {
        assert!(FormatRegistry::by_extension("tiff").is_none());
        assert!(FormatRegistry::by_extension("").is_none());
        assert!(FormatRegistry::by_extension(".").is_none());
    }

    #[test]
    fn require_extension_reports_missing_descriptor() {
        let err = FormatRegistry::require_extension("xyz").unwrap_err();
        assert!(matches!(err, ConversionError::MissingFormatDescriptor(ref e) if e == "xyz"));
    }

    #[test]
    fn mime_lookup_is_exact() {
        assert_eq!(FormatRegistry::by_mime_type("image/jpeg").unwrap().extension, "jpeg");
        assert_eq!(FormatRegistry::by_mime_type("text/plain").unwrap().extension, "txt");
        assert!(FormatRegistry::by_mime_type("image/").is_none());
        assert!(FormatRegistry::by_mime_type("text/plain; charset=utf-8").is_none());
    }

    #[test]
    fn jpg_and_jpeg_share_a_mime_type() {
        let jpg = FormatRegistry::by_extension("jpg").unwrap();
        let jpeg = FormatRegistry::by_extension("jpeg").unwrap();
        assert_ne!(jpg, jpeg);
        assert_eq!(jpg.mime_type, jpeg.mime_type);
    }

    #[test]
    fn extensions_are_lowercase_and_unique() {
        let mut seen = HashSet::new();
        for format in FormatRegistry::all() {
            assert!(!format.extension.is_empty());
            assert_eq!(format.extension, format.extension.to_lowercase());
            assert!(seen.insert(format.extension), "重複的副檔名：{}", format.extension);
        }
        assert_eq!(FormatRegistry::all().len(), 12);
    }

    #[test]
    fn jpg_target_is_canonicalized_to_jpeg() {
        assert_eq!(canonical_target(".JPG"), "jpeg");
        assert_eq!(canonical_target("jpeg"), "jpeg");
        assert_eq!(canonical_target("Png"), "png");
    }

    #[test]
    fn path_lookup_uses_extension() {
        let found = FormatRegistry::for_path(Path::new("dir/Report.TXT")).unwrap();
        assert_eq!(found.mime_type, "text/plain");
        assert!(FormatRegistry::for_path(Path::new("README")).is_none());
    }
}
