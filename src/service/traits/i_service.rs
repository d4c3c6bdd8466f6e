use std::io;

use crate::error::Result;
use crate::models::conversion::ConversionOptions;
use crate::models::file::{FileCollectInput, FileCollectOutput};
use crate::models::html::{HtmlGenerateInput, HtmlGenerateOutput};
use crate::service::image::EncodedImage;

// Text 服務接口，負責純文字來源的轉換
pub trait TextServiceTrait: Send + Sync {
    /// 將文字轉為目標格式
    /// # 參數
    /// - text: 已解碼的文字內容
    /// - target: 正規化後的目標副檔名
    /// # 回傳
    /// - 成功時返回輸出位元組，目標不支援時返回 UnsupportedTargetFormat
    fn convert(&self, text: &str, target: &str) -> Result<Vec<u8>>;
}

// Pdf 服務接口，負責 PDF 來源的轉換
pub trait PdfServiceTrait: Send + Sync {
    fn convert(&self, data: &[u8], target: &str) -> Result<Vec<u8>>;
}

// Image 服務接口，負責圖片解碼、縮放與重新編碼
pub trait ImageServiceTrait: Send + Sync {
    /// 將圖片轉為目標格式
    /// # 回傳
    /// - 成功時返回編碼結果（可能為回退格式），解碼失敗時返回 ImageDecode
    fn convert(&self, data: &[u8], target: &str, options: &ConversionOptions) -> Result<EncodedImage>;
}

// Docx 服務接口，負責將純文字封裝為 Word 文件
pub trait DocxServiceTrait: Send + Sync {
    fn package(&self, text: &str) -> Result<Vec<u8>>;
}

// File 服務接口，負責檔案收集
pub trait FileServiceTrait: Send + Sync {
    /// 收集符合條件的檔案
    /// # 參數
    /// - input: 檔案收集的輸入參數
    /// # 回傳
    /// - 成功時返回收集的檔案列表和總大小，失敗時返回 IO 錯誤
    fn collect_files(&self, input: FileCollectInput) -> io::Result<FileCollectOutput>;
}

// HTML 服務接口，負責生成下載頁面
pub trait HtmlServiceTrait: Send + Sync {
    fn render_download_page(&self, input: &HtmlGenerateInput) -> io::Result<String>;
    fn write_download_page(&self, input: &HtmlGenerateInput, output_dir: &str) -> io::Result<HtmlGenerateOutput>;
}
