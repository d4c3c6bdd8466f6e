use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};
use regex::RegexSet;
use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::error::{ConversionError, Result};
use crate::facade::ports::facade_ports::{InputSource, OutputSink};
use crate::models::conversion::ConversionOutput;
use crate::models::file::{FileCollectInput, FileCollectOutput, SourceFile};
use crate::service::registry::FormatRegistry;
use crate::service::traits::i_service::FileServiceTrait;
use crate::utils::utils::create_regex_sets;

pub fn read_file_content(file_path: &Path) -> io::Result<(Vec<u8>, usize)> {
    let buffer = fs::read(file_path)?;
    let file_size = buffer.len();
    Ok((buffer, file_size))
}

/// 從檔案系統讀取輸入，MIME 由副檔名推導
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSource { path: path.into() }
    }
}

impl InputSource for FileSource {
    fn read_input(&self) -> Result<SourceFile> {
        let extension = self
            .path
            .extension()
            .map(|ext| ext.to_string_lossy().to_string())
            .unwrap_or_default();
        let descriptor = FormatRegistry::require_extension(&extension)
            .map_err(|_| ConversionError::MissingFormatDescriptor(self.path.display().to_string()))?;
        let (bytes, file_size) = read_file_content(&self.path)?;
        info!("讀取檔案：{}，格式：{}，大小：{} 位元組", self.path.display(), descriptor.mime_type, file_size);
        Ok(SourceFile {
            name: self
                .path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            bytes,
            mime_type: descriptor.mime_type.to_string(),
        })
    }
}

/// 將輸出寫入目錄；先寫暫存檔再原地改名，失敗時不留下部分檔案
pub struct FileSink {
    output_dir: PathBuf,
}

impl FileSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        FileSink { output_dir: output_dir.into() }
    }
}

impl OutputSink for FileSink {
    fn deliver(&self, output: &ConversionOutput) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let target_path = self.output_dir.join(&output.file_name);
        let mut temp = NamedTempFile::new_in(&self.output_dir)?;
        temp.write_all(&output.bytes)?;
        temp.flush()?;
        temp.persist(&target_path).map_err(|e| ConversionError::Io(e.error))?;
        info!("寫入檔案：{}，大小：{} 位元組", target_path.display(), output.bytes.len());
        Ok(target_path)
    }
}

/// 檔案服務，負責收集批次轉換的輸入檔案
pub struct FileService;

impl FileService {
    pub fn new() -> Self {
        FileService
    }
}

impl Default for FileService {
    fn default() -> Self {
        Self::new()
    }
}

impl FileServiceTrait for FileService {
    fn collect_files(&self, input: FileCollectInput) -> io::Result<FileCollectOutput> {
        let exclude = input.exclude_patterns.clone().unwrap_or_default();
        let (include_set, exclude_set) = create_regex_sets(&input.include_patterns, &exclude);

        let mut files = Vec::new();
        let mut total_size = 0u64;
        for entry in WalkDir::new(&input.input_path).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("略過無法讀取的路徑：{}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if is_file_valid(path, &include_set, &exclude_set, input.max_size)? {
                total_size += entry.metadata().map(|m| m.len()).unwrap_or(0);
                files.push(path.to_path_buf());
            }
        }
        info!("收集到 {} 個檔案，總大小：{} 位元組", files.len(), total_size);
        Ok(FileCollectOutput { files, total_size })
    }
}

pub fn is_file_valid(
    path: &Path,
    include_set: &RegexSet,
    exclude_set: &RegexSet,
    max_size: Option<f64>,
) -> io::Result<bool> {
    let file_name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    if !include_set.is_match(&file_name) || exclude_set.is_match(&file_name) {
        return Ok(false);
    }
    if let Some(max) = max_size {
        let file_size = fs::metadata(path)?.len() as f64 / 1_048_576.0;
        if file_size > max {
            warn!("檔案 {} 超過大小限制（{:.2} MB > {} MB），跳過", path.display(), file_size, max);
            return Ok(false);
        }
    }
    Ok(true)
}
