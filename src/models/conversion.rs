use std::path::Path;

use crate::error::{ConversionError, Result};

pub const DEFAULT_JPEG_QUALITY: u8 = 90;
const DEFAULT_BASE_NAME: &str = "converted";

/// 轉換選項，皆為可選
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionOptions {
    /// 有損格式的品質（0-100）
    pub quality: Option<u8>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ConversionOptions {
    pub fn validate(&self) -> Result<()> {
        if let Some(q) = self.quality {
            if q > 100 {
                return Err(ConversionError::InvalidOptions(format!("品質必須介於 0 到 100，收到 {}", q)));
            }
        }
        if self.width == Some(0) || self.height == Some(0) {
            return Err(ConversionError::InvalidOptions("寬度與高度必須為正整數".to_string()));
        }
        Ok(())
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.quality.unwrap_or(DEFAULT_JPEG_QUALITY)
    }

    pub fn wants_resize(&self) -> bool {
        self.width.is_some() || self.height.is_some()
    }
}

/// 單次轉換請求，呼叫結束即丟棄
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub input_bytes: Vec<u8>,
    pub source_mime: String,
    pub target_extension: String,
    pub options: ConversionOptions,
    /// 原始檔名，用於推導輸出檔名
    pub source_name: Option<String>,
}

impl ConversionRequest {
    pub fn new(input_bytes: Vec<u8>, source_mime: impl Into<String>, target_extension: impl Into<String>) -> Self {
        ConversionRequest {
            input_bytes,
            source_mime: source_mime.into(),
            target_extension: target_extension.into(),
            options: ConversionOptions::default(),
            source_name: None,
        }
    }

    pub fn with_options(mut self, options: ConversionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }

    /// 輸出檔名：`<原始主檔名>.<副檔名>`
    pub fn output_file_name(&self, extension: &str) -> String {
        let base = self
            .source_name
            .as_deref()
            .and_then(|name| Path::new(name).file_stem())
            .map(|stem| stem.to_string_lossy().to_string())
            .filter(|stem| !stem.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_NAME.to_string());
        format!("{}.{}", base, extension)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    Succeeded,
    /// 目標格式無法產生，改以替代格式輸出
    SucceededWithFallback {
        requested: String,
        actual: String,
        reason: String,
    },
}

impl ConversionOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self, ConversionOutcome::SucceededWithFallback { .. })
    }
}

/// 轉換成功的完整輸出，不存在部分結果
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    pub bytes: Vec<u8>,
    /// 實際輸出內容的副檔名（回退時與請求不同）
    pub extension: String,
    pub mime_type: String,
    pub file_name: String,
    pub outcome: ConversionOutcome,
}

pub type ConversionResult = Result<ConversionOutput>;
