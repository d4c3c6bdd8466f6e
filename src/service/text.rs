use log::debug;

use crate::error::{ConversionError, Result};
use crate::service::pdf::render_text_page;
use crate::service::traits::i_service::TextServiceTrait;

const HTML_HEAD: &str = "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n<title>Converted Text</title>\n</head>\n<body>\n<pre>";
const HTML_TAIL: &str = "</pre>\n</body>\n</html>\n";

/// 純文字轉換服務
pub struct TextService;

impl TextService {
    pub fn new() -> Self {
        TextService
    }
}

impl Default for TextService {
    fn default() -> Self {
        Self::new()
    }
}

impl TextServiceTrait for TextService {
    fn convert(&self, text: &str, target: &str) -> Result<Vec<u8>> {
        debug!("文字轉換，目標：{}，字元數：{}", target, text.chars().count());
        match target {
            "pdf" => render_text_page(text),
            "html" => Ok(text_to_html(text).into_bytes()),
            "markdown" => Ok(text_to_markdown(text).into_bytes()),
            other => Err(ConversionError::UnsupportedTargetFormat(other.to_string())),
        }
    }
}

/// 僅跳脫 `&`、`<`、`>`，不處理其他實體
pub fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn text_to_html(text: &str) -> String {
    format!("{}{}{}", HTML_HEAD, escape_markup(text), HTML_TAIL)
}

/// 整段文字包進單一程式碼區塊，不做結構轉換
pub fn text_to_markdown(text: &str) -> String {
    format!("```\n{}\n```", text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_wraps_text_in_one_fence() {
        let out = TextService::new().convert("Hello", "markdown").unwrap();
        assert_eq!(out, b"```\nHello\n```");
    }

    #[test]
    fn markdown_keeps_structure_verbatim() {
        let md = text_to_markdown("# title\n- item");
        assert_eq!(md, "```\n# title\n- item\n```");
    }

    #[test]
    fn html_escapes_only_three_characters() {
        let html = text_to_html("a < b && c > \"d\" 'e'");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<pre>a &lt; b &amp;&amp; c &gt; \"d\" 'e'</pre>"));
    }

    #[test]
    fn pdf_target_produces_pdf_signature() {
        let out = TextService::new().convert("Hello", "pdf").unwrap();
        assert!(out.starts_with(b"%PDF-"));
    }

    #[test]
    fn other_targets_are_unsupported() {
        let err = TextService::new().convert("Hello", "docx").unwrap_err();
        assert!(matches!(err, ConversionError::UnsupportedTargetFormat(ref t) if t == "docx"));
    }
}
