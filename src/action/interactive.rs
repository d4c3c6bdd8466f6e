use std::io;
use std::path::Path;

use dialoguer::{Confirm, Input, Select};

use crate::action::cli::run_conversion;
use crate::config::ports::{AppConfig, ConfigPort, DeliveryMode};
use crate::facade::conversion_facade::ConversionFacade;
use crate::facade::traits::i_conversion::ConversionFacadeTrait;
use crate::models::conversion::{ConversionOptions, DEFAULT_JPEG_QUALITY};
use crate::models::format::SourceCategory;
use crate::service::config_service::ConfigService;
use crate::service::registry::FormatRegistry;
use crate::utils::utils::setup_logging;

pub fn process_interactive_mode() -> io::Result<Option<String>> {
    setup_logging("info")?;
    println!("=== 歡迎使用互動模式 ===");
    let input = get_input_path()?;
    let output = get_output_path()?;

    let config_service = ConfigService::new(Box::new(InteractiveConfigAdapter::new(input, output)));
    let config = config_service.get_config()?;
    run_conversion(&config)
}

pub fn get_input_path() -> io::Result<String> {
    Input::new()
        .with_prompt("請輸入要轉換的檔案路徑（例如：./notes.txt 或 ./photo.png）")
        .validate_with(|input: &String| -> Result<(), String> {
            let path = Path::new(input);
            if !path.is_file() {
                return Err(format!("檔案 '{}' 不存在", input));
            }
            match FormatRegistry::for_path(path) {
                Some(_) => Ok(()),
                None => Err(format!("無法辨識 '{}' 的格式", input)),
            }
        })
        .interact_text()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
}

pub fn get_output_path() -> io::Result<String> {
    Input::new()
        .with_prompt("輸入輸出目錄（例如：./output，預設為 output）")
        .default("output".to_string())
        .interact_text()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
}

/// 從可用目標中選擇，選項順序與規則表一致
pub fn get_target(facade: &dyn ConversionFacadeTrait, source_mime: &str) -> io::Result<String> {
    let targets = facade.available_targets(source_mime);
    if targets.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("格式 {} 沒有可用的轉換目標", source_mime),
        ));
    }
    let items: Vec<String> = targets
        .iter()
        .map(|ext| match FormatRegistry::by_extension(ext) {
            Some(format) => format!("{} - {}", format.display_name, format.description),
            None => ext.to_string(),
        })
        .collect();
    let index = Select::new()
        .with_prompt("選擇目標格式（使用方向鍵選擇，按 Enter 確認）")
        .items(&items)
        .default(0)
        .interact()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("目標格式選擇失敗: {}", e)))?;
    Ok(targets[index].to_string())
}

pub fn get_quality() -> io::Result<Option<u8>> {
    let quality: u8 = Input::new()
        .with_prompt("輸入 JPEG 品質（0-100）")
        .default(DEFAULT_JPEG_QUALITY)
        .validate_with(|q: &u8| -> Result<(), String> {
            if *q <= 100 { Ok(()) } else { Err("品質必須介於 0 到 100".to_string()) }
        })
        .interact_text()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("品質輸入失敗: {}", e)))?;
    Ok(Some(quality))
}

/// 詢問縮放尺寸，留空代表依比例推算
pub fn get_resize() -> io::Result<(Option<u32>, Option<u32>)> {
    let resize = Confirm::new()
        .with_prompt("是否調整圖片尺寸？")
        .default(false)
        .interact()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("縮放選項輸入失敗: {}", e)))?;
    if !resize {
        return Ok((None, None));
    }
    let width = prompt_dimension("輸入寬度（留空則依高度等比例計算）")?;
    let height = prompt_dimension("輸入高度（留空則依寬度等比例計算）")?;
    if width.is_none() && height.is_none() {
        println!("未輸入任何尺寸，保留原始大小");
    }
    Ok((width, height))
}

fn prompt_dimension(prompt: &str) -> io::Result<Option<u32>> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .validate_with(|v: &String| -> Result<(), String> {
            if v.trim().is_empty() || v.trim().parse::<u32>().map(|n| n > 0).unwrap_or(false) {
                Ok(())
            } else {
                Err("請輸入正整數".to_string())
            }
        })
        .interact_text()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    Ok(value.trim().parse::<u32>().ok())
}

pub fn get_delivery_mode() -> io::Result<DeliveryMode> {
    let mode = Select::new()
        .with_prompt("選擇輸出方式（使用方向鍵選擇，按 Enter 確認）")
        .items(&["寫入檔案（預設）", "產生 HTML 下載頁面"])
        .default(0)
        .interact()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("輸出方式選擇失敗: {}", e)))?;
    Ok(if mode == 1 { DeliveryMode::Html } else { DeliveryMode::File })
}

// 交互配置適配器
pub struct InteractiveConfigAdapter {
    input: String,
    output: String,
}

impl InteractiveConfigAdapter {
    pub fn new(input: String, output: String) -> Self {
        InteractiveConfigAdapter { input, output }
    }
}

impl ConfigPort for InteractiveConfigAdapter {
    fn get_config(&self) -> io::Result<AppConfig> {
        let source = FormatRegistry::for_path(Path::new(&self.input)).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, format!("無法辨識 '{}' 的格式", self.input))
        })?;
        let facade = ConversionFacade::default();
        let target = get_target(&facade, source.mime_type)?;

        let mut options = ConversionOptions::default();
        if SourceCategory::from_mime(source.mime_type) == Some(SourceCategory::Image) {
            if target == "jpeg" {
                options.quality = get_quality()?;
            }
            let (width, height) = get_resize()?;
            options.width = width;
            options.height = height;
        }
        let delivery = get_delivery_mode()?;

        Ok(AppConfig {
            input: self.input.clone(),
            output: self.output.clone(),
            target: Some(target),
            options,
            delivery,
            include: vec!["*".to_string()],
            exclude: None,
            max_size: None,
            jobs: None,
            no_progress: false,
            list_targets: false,
        })
    }
}
