use std::path::PathBuf;

use crate::config::ports::DeliveryMode;
use crate::models::conversion::ConversionOptions;

#[derive(Clone)]
pub struct BatchInput {
    pub root: PathBuf,
    pub files: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub target: String,
    pub options: ConversionOptions,
    pub delivery: DeliveryMode,
    pub jobs: Option<usize>,
    pub no_progress: bool,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: usize,
    pub fallbacks: usize,
    /// 來源格式沒有對應目標規則而略過的檔案
    pub skipped: usize,
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.succeeded + self.failed.len()
    }
}
