use crate::models::format::ConversionRule;

/// 支援的來源與目標對照表，每個具體圖片 MIME 各一筆，不使用萬用字元
pub static CONVERSION_RULES: &[ConversionRule] = &[
    ConversionRule {
        source_mime: "text/plain",
        targets: &["pdf", "html", "markdown"],
    },
    ConversionRule {
        source_mime: "application/pdf",
        targets: &["text", "docx"],
    },
    ConversionRule {
        source_mime: "image/jpeg",
        targets: &["png", "gif", "bmp", "webp"],
    },
    ConversionRule {
        source_mime: "image/png",
        targets: &["jpeg", "gif", "bmp", "webp"],
    },
    ConversionRule {
        source_mime: "image/gif",
        targets: &["png", "jpeg", "bmp", "webp"],
    },
    ConversionRule {
        source_mime: "image/bmp",
        targets: &["png", "jpeg", "gif", "webp"],
    },
    ConversionRule {
        source_mime: "image/webp",
        targets: &["png", "jpeg", "gif", "bmp"],
    },
];

/// 以原始 MIME 字串做前綴比對，回傳第一筆符合規則的目標；無符合時為空
pub fn available_targets(source_mime: &str) -> &'static [&'static str] {
    CONVERSION_RULES
        .iter()
        .find(|rule| source_mime.starts_with(rule.source_mime))
        .map(|rule| rule.targets)
        .unwrap_or(&[])
}

pub fn is_allowed(source_mime: &str, target: &str) -> bool {
    available_targets(source_mime).contains(&target)
}
