use std::io;
use thiserror::Error;

/// 轉換流程中可能發生的錯誤，皆為本地、不可重試的錯誤
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("不支援的來源格式：{0}")]
    UnsupportedSourceFormat(String),

    #[error("不支援的目標格式：{0}")]
    UnsupportedTargetFormat(String),

    #[error("不支援的轉換：{source_mime} -> {target}")]
    UnsupportedConversion { source_mime: String, target: String },

    /// 圖片解碼失敗
    #[error("圖片解碼失敗：{0}")]
    ImageDecode(String),

    #[error("圖片編碼失敗：{0}")]
    ImageEncode(String),

    /// DOCX 的 ZIP 封裝失敗
    #[error("封裝失敗：{0}")]
    Packaging(String),

    #[error("PDF 產生失敗：{0}")]
    PdfWrite(String),

    #[error("找不到格式描述：{0}")]
    MissingFormatDescriptor(String),

    #[error("無效的轉換選項：{0}")]
    InvalidOptions(String),

    #[error("讀寫失敗：{0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, ConversionError>;

impl ConversionError {
    pub fn unsupported_conversion(source_mime: impl Into<String>, target: impl Into<String>) -> Self {
        ConversionError::UnsupportedConversion {
            source_mime: source_mime.into(),
            target: target.into(),
        }
    }
}

// 前端層沿用 io::Result，透過此轉換銜接
impl From<ConversionError> for io::Error {
    fn from(err: ConversionError) -> Self {
        match err {
            ConversionError::Io(e) => e,
            ConversionError::MissingFormatDescriptor(_)
            | ConversionError::InvalidOptions(_)
            | ConversionError::UnsupportedSourceFormat(_)
            | ConversionError::UnsupportedTargetFormat(_)
            | ConversionError::UnsupportedConversion { .. } => {
                io::Error::new(io::ErrorKind::InvalidInput, err.to_string())
            }
            ConversionError::ImageDecode(_) => io::Error::new(io::ErrorKind::InvalidData, err.to_string()),
            _ => io::Error::new(io::ErrorKind::Other, err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_errors_map_to_invalid_input_kind() {
        let err: io::Error = ConversionError::unsupported_conversion("application/pdf", "jpeg").into();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(err.to_string().contains("application/pdf -> jpeg"));
    }

    #[test]
    fn io_errors_pass_through_unchanged() {
        let err: io::Error = ConversionError::Io(io::Error::new(io::ErrorKind::NotFound, "gone")).into();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
