use std::io;

use clap::ValueEnum;

use crate::models::conversion::ConversionOptions;

// 輸出交付方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DeliveryMode {
    /// 直接寫入輸出目錄
    File,
    /// 產生內嵌資料的 HTML 下載頁面
    Html,
}

// 應用配置結構體，封裝所有參數
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub input: String,
    pub output: String,
    pub target: Option<String>,
    pub options: ConversionOptions,
    pub delivery: DeliveryMode,
    pub include: Vec<String>,
    pub exclude: Option<Vec<String>>,
    pub max_size: Option<f64>,
    pub jobs: Option<usize>,
    pub no_progress: bool,
    pub list_targets: bool,
}

// 配置來源的 Port
pub trait ConfigPort {
    fn get_config(&self) -> io::Result<AppConfig>;
}
