use std::path::PathBuf;

use crate::error::Result;
use crate::models::conversion::ConversionOutput;
use crate::models::file::SourceFile;

// 讀取輸入位元組的 Port
pub trait InputSource {
    fn read_input(&self) -> Result<SourceFile>;
}

// 交付輸出位元組的 Port（寫入檔案或產生下載頁面），返回交付位置
pub trait OutputSink: Send + Sync {
    fn deliver(&self, output: &ConversionOutput) -> Result<PathBuf>;
}
