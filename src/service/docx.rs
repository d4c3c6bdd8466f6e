use std::io::{Cursor, Write};

use log::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{ConversionError, Result};
use crate::service::text::escape_markup;
use crate::service::traits::i_service::DocxServiceTrait;

const CONTENT_TYPES: &str = include_str!("../../assets/docx/content_types.xml");
const PACKAGE_RELS: &str = include_str!("../../assets/docx/rels.xml");
const DOCUMENT_RELS: &str = include_str!("../../assets/docx/word/document_rels.xml");
const DOCUMENT_TEMPLATE: &str = include_str!("../../assets/docx/word/document.xml");
const STYLES: &str = include_str!("../../assets/docx/word/styles.xml");
const SETTINGS: &str = include_str!("../../assets/docx/word/settings.xml");
const WEB_SETTINGS: &str = include_str!("../../assets/docx/word/web_settings.xml");
const FONT_TABLE: &str = include_str!("../../assets/docx/word/font_table.xml");
const THEME: &str = include_str!("../../assets/docx/word/theme/theme1.xml");

/// 封裝內固定的部件路徑，順序即寫入 ZIP 的順序
pub const DOCX_PARTS: [&str; 9] = [
    "[Content_Types].xml",
    "_rels/.rels",
    "word/_rels/document.xml.rels",
    "word/document.xml",
    "word/styles.xml",
    "word/settings.xml",
    "word/webSettings.xml",
    "word/fontTable.xml",
    "word/theme/theme1.xml",
];

/// 生成單段落 Word 文件的服務
pub struct DocxService;

impl DocxService {
    pub fn new() -> Self {
        DocxService
    }
}

impl Default for DocxService {
    fn default() -> Self {
        Self::new()
    }
}

impl DocxServiceTrait for DocxService {
    fn package(&self, text: &str) -> Result<Vec<u8>> {
        let document = render_document(text);
        let contents = [
            CONTENT_TYPES,
            PACKAGE_RELS,
            DOCUMENT_RELS,
            document.as_str(),
            STYLES,
            SETTINGS,
            WEB_SETTINGS,
            FONT_TABLE,
            THEME,
        ];
        let parts: Vec<(&str, &[u8])> = DOCX_PARTS
            .iter()
            .zip(contents.iter())
            .map(|(name, content)| (*name, content.as_bytes()))
            .collect();

        let buffer = create_zip_buffer(&parts).map_err(|e| ConversionError::Packaging(e.to_string()))?;
        info!("生成 DOCX 封裝，共 {} 個部件，大小：{} 位元組", parts.len(), buffer.len());
        Ok(buffer)
    }
}

/// 文件本體：一個段落、一個文字區段，只替換已跳脫的文字
pub fn render_document(text: &str) -> String {
    DOCUMENT_TEMPLATE.replace("{{TEXT}}", &escape_markup(text))
}

fn create_zip_buffer(parts: &[(&str, &[u8])]) -> zip::result::ZipResult<Vec<u8>> {
    let mut zip_buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut zip_buffer));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, data) in parts {
            zip.start_file(*name, options)?;
            zip.write_all(data)?;
        }
        zip.finish()?;
    }
    Ok(zip_buffer)
}
