use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose, write::EncoderWriter};
use chrono::Local;
use log::{info, warn};

use crate::error::Result;
use crate::facade::ports::facade_ports::OutputSink;
use crate::models::conversion::{ConversionOutcome, ConversionOutput};
use crate::models::html::{HtmlGenerateInput, HtmlGenerateOutput};
use crate::service::text::escape_markup;
use crate::service::traits::i_service::HtmlServiceTrait;
use crate::utils::utils::format_file_size;

const HTML_TEMPLATE: &str = include_str!("../../assets/template/download_template.html");
const MAX_BASE64_SIZE: usize = 1_000_000;

/// HTML 服務，負責生成內嵌 Base64 資料的下載頁面
pub struct HtmlService;

impl HtmlService {
    pub fn new() -> Self {
        HtmlService
    }
}

impl Default for HtmlService {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlServiceTrait for HtmlService {
    /// 替換模板佔位符，產生完整頁面內容
    fn render_download_page(&self, input: &HtmlGenerateInput) -> io::Result<String> {
        let data_base64 = encode_to_base64(&input.data, &input.file_name)?;
        info!("生成 Base64 數據，總大小：{} 位元組", data_base64.len());

        let fallback_note = input
            .fallback_note
            .as_deref()
            .map(|note| format!("<p class=\"warning\">{}</p>", escape_markup(note)))
            .unwrap_or_default();

        Ok(HTML_TEMPLATE
            .replace("{{DATA_BASE64}}", &data_base64)
            .replace("{{FILE_NAME}}", &escape_attribute(&input.file_name))
            .replace("{{MIME_TYPE}}", &escape_attribute(&input.mime_type))
            .replace("{{FILE_SIZE}}", &format_file_size(input.data.len()))
            .replace("{{GENERATED_AT}}", &Local::now().format("%Y-%m-%d %H:%M:%S").to_string())
            .replace("{{FALLBACK_NOTE}}", &fallback_note))
    }

    fn write_download_page(&self, input: &HtmlGenerateInput, output_dir: &str) -> io::Result<HtmlGenerateOutput> {
        let html_content = self.render_download_page(input)?;
        let path = write_html_file(&html_content, output_dir, &input.file_name)?;
        info!("生成 HTML 檔案：{}，大小：{} 位元組", path.display(), html_content.len());
        Ok(HtmlGenerateOutput {
            html_file_path: path.display().to_string(),
        })
    }
}

fn escape_attribute(value: &str) -> String {
    escape_markup(value).replace('"', "&quot;")
}

/// 將數據編碼為 Base64 格式
pub fn encode_to_base64(data: &[u8], file_name: &str) -> io::Result<String> {
    let mut base64_buffer = Vec::new();
    {
        let mut encoder = EncoderWriter::new(&mut base64_buffer, &general_purpose::STANDARD);
        encoder.write_all(data)?;
        encoder.finish()?;
    }
    let data_base64 = String::from_utf8(base64_buffer)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    if data_base64.len() > MAX_BASE64_SIZE {
        warn!(
            "Base64 資料過大：{} 位元組，超過建議限制 {} 位元組，可能影響顯示或下載：{}",
            data_base64.len(), MAX_BASE64_SIZE, file_name
        );
    }
    Ok(data_base64)
}

/// 將 HTML 內容寫入 `<output_dir>/<file_name>.html`
pub fn write_html_file(html_content: &str, output_dir: &str, file_name: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let output_path = Path::new(output_dir).join(format!("{}.html", file_name));
    let file = fs::File::create(&output_path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(html_content.as_bytes())?;
    writer.flush()?;
    Ok(output_path)
}

/// 以瀏覽器下載頁面交付輸出
pub struct HtmlDownloadSink {
    output_dir: String,
    html_service: Box<dyn HtmlServiceTrait>,
}

impl HtmlDownloadSink {
    pub fn new(output_dir: impl Into<String>) -> Self {
        HtmlDownloadSink {
            output_dir: output_dir.into(),
            html_service: Box::new(HtmlService::new()),
        }
    }
}

impl OutputSink for HtmlDownloadSink {
    fn deliver(&self, output: &ConversionOutput) -> Result<PathBuf> {
        let fallback_note = match &output.outcome {
            ConversionOutcome::Succeeded => None,
            ConversionOutcome::SucceededWithFallback { requested, actual, reason } => Some(format!(
                "無法輸出 {}，已改為 {}：{}",
                requested.to_uppercase(),
                actual.to_uppercase(),
                reason
            )),
        };
        let input = HtmlGenerateInput {
            data: output.bytes.clone(),
            file_name: output.file_name.clone(),
            mime_type: output.mime_type.clone(),
            fallback_note,
        };
        let generated = self.html_service.write_download_page(&input, &self.output_dir)?;
        Ok(PathBuf::from(generated.html_file_path))
    }
}
