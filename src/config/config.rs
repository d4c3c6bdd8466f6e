use clap::Parser;
use std::io;
use std::path::Path;

use crate::config::ports::DeliveryMode;
use crate::models::conversion::ConversionOptions;
use crate::service::registry::{canonical_target, FormatRegistry};

#[derive(Parser, Clone)]
#[command(
    name = "file_converter",
    about = "將文字、PDF 與圖片檔案轉換為其他格式",
    long_about = "一個格式轉換工具：文字可轉為 PDF、HTML、Markdown；PDF 可轉為文字或 DOCX；圖片可在 PNG、JPEG、GIF、BMP、WebP 之間互轉並可縮放。\n輸入為目錄時會批次轉換所有符合條件的檔案。不帶任何參數執行時進入互動模式。\n使用 `--help` 查看詳細用法。",
    arg_required_else_help = true
)]
pub struct Cli {
    pub input: String,
    #[arg(short, long)]
    pub to: Option<String>,
    #[arg(short, long, default_value = "output")]
    pub output: String,
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub quality: Option<u8>,
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub width: Option<u32>,
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub height: Option<u32>,
    #[arg(long, default_value = "file")]
    pub deliver: DeliveryMode,
    #[arg(long, default_value_t = false)]
    pub list_targets: bool,
    #[arg(long, default_value = "*", value_delimiter = ',')]
    pub include: Vec<String>,
    #[arg(long, value_delimiter = ',')]
    pub exclude: Option<Vec<String>>,
    #[arg(long)]
    pub max_size: Option<f64>,
    #[arg(long)]
    pub jobs: Option<usize>,
    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
    #[arg(long, default_value = "info", value_parser = ["debug", "info", "warn", "error"])]
    pub log_level: String,
    #[arg(long, default_value_t = false)]
    pub show_config: bool,
}

impl Cli {
    pub fn options(&self) -> ConversionOptions {
        ConversionOptions {
            quality: self.quality,
            width: self.width,
            height: self.height,
        }
    }
}

pub fn validate_input_path(input: &str) -> io::Result<&Path> {
    let path = Path::new(input);
    if !path.exists() {
        log::error!("輸入路徑不存在：{}", input);
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("輸入路徑 '{}' 不存在", input)
        ));
    }
    Ok(path)
}

/// 目標副檔名必須存在於格式目錄
pub fn validate_target(target: &str) -> io::Result<String> {
    let descriptor = FormatRegistry::require_extension(target)?;
    Ok(canonical_target(descriptor.extension))
}

pub fn is_valid_pattern(pattern: &str) -> bool {
    let invalid_chars = ['/', '\\', ':', '?', '"', '<', '>', '|'];
    !pattern.is_empty() && !pattern.contains(&invalid_chars[..])
}

pub fn validate_file_patterns(include: &[String], exclude: &Option<Vec<String>>) -> io::Result<()> {
    for pattern in include {
        if !is_valid_pattern(pattern) {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, format!("無效的包含模式: {}", pattern)));
        }
    }
    if let Some(exclude_patterns) = exclude {
        for pattern in exclude_patterns {
            if !is_valid_pattern(pattern) {
                return Err(io::Error::new(io::ErrorKind::InvalidInput, format!("無效的排除模式: {}", pattern)));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_conversion_flags() {
        let cli = Cli::try_parse_from([
            "file_converter", "photo.png", "--to", "jpeg", "--quality", "75", "--width", "640", "--deliver", "html",
        ])
        .unwrap();
        assert_eq!(cli.to.as_deref(), Some("jpeg"));
        assert_eq!(cli.deliver, DeliveryMode::Html);
        assert_eq!(
            cli.options(),
            ConversionOptions { quality: Some(75), width: Some(640), height: None }
        );
        assert_eq!(cli.include, vec!["*".to_string()]);
    }

    #[test]
    fn cli_rejects_out_of_range_quality() {
        assert!(Cli::try_parse_from(["file_converter", "a.png", "--quality", "101"]).is_err());
        assert!(Cli::try_parse_from(["file_converter", "a.png", "--width", "0"]).is_err());
    }

    #[test]
    fn target_validation_normalizes() {
        assert_eq!(validate_target(".PNG").unwrap(), "png");
        assert_eq!(validate_target("JPG").unwrap(), "jpeg");
        assert_eq!(validate_target("tiff").unwrap_err().kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn patterns_reject_path_characters() {
        assert!(validate_file_patterns(&["*.txt".to_string()], &None).is_ok());
        assert!(validate_file_patterns(&["a/b".to_string()], &None).is_err());
        assert!(validate_file_patterns(&["*".to_string()], &Some(vec![String::new()])).is_err());
    }
}
