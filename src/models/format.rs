/// 單一檔案格式的靜態描述
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatDescriptor {
    pub extension: &'static str,
    pub mime_type: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
}

/// 來源 MIME 前綴對應可轉換的目標副檔名（有序）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionRule {
    pub source_mime: &'static str,
    pub targets: &'static [&'static str],
}

/// 依來源 MIME 決定的轉換分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceCategory {
    Text,
    Pdf,
    Image,
}

impl SourceCategory {
    pub fn from_mime(mime: &str) -> Option<Self> {
        if mime.starts_with("text/plain") {
            Some(SourceCategory::Text)
        } else if mime.starts_with("application/pdf") {
            Some(SourceCategory::Pdf)
        } else if mime.starts_with("image/") {
            Some(SourceCategory::Image)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceCategory::Text => "text",
            SourceCategory::Pdf => "pdf",
            SourceCategory::Image => "image",
        }
    }
}
