use std::path::PathBuf;

use crate::error::Result;
use crate::facade::ports::facade_ports::{InputSource, OutputSink};
use crate::models::conversion::{ConversionOptions, ConversionOutput, ConversionRequest, ConversionResult};

// Facade 接口，負責協調格式轉換流程
pub trait ConversionFacadeTrait: Send + Sync {
    /// 查詢來源 MIME 可轉換的目標副檔名
    /// # 參數
    /// - source_mime: 來源 MIME，以前綴比對規則表
    /// # 回傳
    /// - 依規則表順序排列的副檔名，無符合規則時為空
    fn available_targets(&self, source_mime: &str) -> Vec<&'static str>;

    /// 執行單次轉換
    /// # 參數
    /// - request: 輸入位元組、來源 MIME、目標副檔名與選項
    /// # 回傳
    /// - 成功時返回完整輸出，失敗時返回對應的錯誤分類
    fn convert(&self, request: &ConversionRequest) -> ConversionResult;

    /// 從輸入來源讀取、轉換並交付；轉換失敗時不會呼叫 sink
    fn convert_and_deliver(
        &self,
        source: &dyn InputSource,
        target: &str,
        options: ConversionOptions,
        sink: &dyn OutputSink,
    ) -> Result<(ConversionOutput, PathBuf)>;
}
