use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use log::{debug, warn};

use crate::error::{ConversionError, Result};
use crate::service::docx::DocxService;
use crate::service::traits::i_service::{DocxServiceTrait, PdfServiceTrait};

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 50;
const FONT_SIZE: i64 = 12;
const LEADING: i64 = 14;

/// 文字萃取尚未實作，輸出固定的佔位文字
pub fn placeholder_text(target_label: &str) -> String {
    format!("PDF to {} conversion is not fully implemented yet.", target_label)
}

/// PDF 來源轉換服務
pub struct PdfService {
    docx_service: Box<dyn DocxServiceTrait>,
}

impl PdfService {
    pub fn new(docx_service: Box<dyn DocxServiceTrait>) -> Self {
        PdfService { docx_service }
    }
}

impl Default for PdfService {
    fn default() -> Self {
        Self::new(Box::new(DocxService::new()))
    }
}

impl PdfServiceTrait for PdfService {
    fn convert(&self, data: &[u8], target: &str) -> Result<Vec<u8>> {
        match target {
            "text" => {
                warn!("PDF 轉文字尚未實作，輸出佔位文字（來源 {} 位元組）", data.len());
                Ok(placeholder_text("Text").into_bytes())
            }
            "docx" => {
                warn!("PDF 轉 DOCX 尚未實作，輸出佔位文件（來源 {} 位元組）", data.len());
                self.docx_service.package(&placeholder_text("DOCX"))
            }
            other => Err(ConversionError::unsupported_conversion("application/pdf", other)),
        }
    }
}

// 標準 Type1 字型採 WinAnsi 編碼，超出 Latin-1 的字元以 '?' 代替
fn encode_win_ansi(line: &str) -> Vec<u8> {
    line.chars()
        .map(|c| if (c as u32) <= 0xFF { c as u32 as u8 } else { b'?' })
        .collect()
}

/// 產生單頁 PDF，逐行輸出原始文字；不換行、不分頁，內容過長時會超出頁面
pub fn render_text_page(text: &str) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
        Operation::new("TL", vec![LEADING.into()]),
        Operation::new("Td", vec![MARGIN.into(), (PAGE_HEIGHT - MARGIN).into()]),
    ];
    for (index, line) in text.lines().enumerate() {
        if index > 0 {
            operations.push(Operation::new("T*", vec![]));
        }
        operations.push(Operation::new("Tj", vec![Object::string_literal(encode_win_ansi(line))]));
    }
    operations.push(Operation::new("ET", vec![]));
    debug!("PDF 內容共 {} 個繪製指令", operations.len());

    let content = Content { operations };
    let encoded = content
        .encode()
        .map_err(|e| ConversionError::PdfWrite(e.to_string()))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| ConversionError::PdfWrite(e.to_string()))?;
    Ok(buffer)
}
