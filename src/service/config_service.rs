use std::io;

use crate::config::ports::{AppConfig, ConfigPort, DeliveryMode};
use crate::models::conversion::ConversionOptions;

// 配置服務，負責選擇適當的配置適配器
pub struct ConfigService {
    config_port: Box<dyn ConfigPort>,
}

impl ConfigService {
    pub fn new(config_port: Box<dyn ConfigPort>) -> Self {
        ConfigService { config_port }
    }

    pub fn get_config(&self) -> io::Result<AppConfig> {
        self.config_port.get_config()
    }
}

// 預設配置適配器：寫入檔案、收集所有檔案、不縮放
pub struct DefaultConfigAdapter {
    input: String,
    output: String,
    target: Option<String>,
}

impl DefaultConfigAdapter {
    pub fn new(input: String, output: String, target: Option<String>) -> Self {
        DefaultConfigAdapter { input, output, target }
    }
}

impl ConfigPort for DefaultConfigAdapter {
    fn get_config(&self) -> io::Result<AppConfig> {
        Ok(AppConfig {
            input: self.input.clone(),
            output: self.output.clone(),
            target: self.target.clone(),
            options: ConversionOptions::default(),
            delivery: DeliveryMode::File,
            include: vec!["*".to_string()],
            exclude: None,
            max_size: None,
            jobs: None,
            no_progress: false,
            list_targets: false,
        })
    }
}
