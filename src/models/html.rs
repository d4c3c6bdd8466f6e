#[derive(Clone)]
pub struct HtmlGenerateInput {
    pub data: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
    /// 回退說明，無回退時為 None
    pub fallback_note: Option<String>,
}

#[derive(Debug)]
pub struct HtmlGenerateOutput {
    pub html_file_path: String,
}
