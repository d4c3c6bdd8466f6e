use std::io;
use std::path::{Path, PathBuf};

use log::{error, info, warn};
use pathdiff::diff_paths;
use rayon::prelude::*;

use crate::config::ports::DeliveryMode;
use crate::error::Result;
use crate::facade::ports::facade_ports::OutputSink;
use crate::facade::traits::i_conversion::ConversionFacadeTrait;
use crate::models::batch::{BatchInput, BatchReport};
use crate::models::conversion::ConversionOutput;
use crate::service::file::{FileSink, FileSource};
use crate::service::html::HtmlDownloadSink;
use crate::service::registry::{canonical_target, FormatRegistry};
use crate::service::rules::is_allowed;
use crate::utils::utils::create_progress_bar;

/// 批次轉換：各檔案彼此獨立，於 rayon 執行緒池平行處理
pub struct BatchService<'a> {
    facade: &'a dyn ConversionFacadeTrait,
}

impl<'a> BatchService<'a> {
    pub fn new(facade: &'a dyn ConversionFacadeTrait) -> Self {
        BatchService { facade }
    }

    pub fn run(&self, input: BatchInput) -> io::Result<BatchReport> {
        let mut report = BatchReport::default();
        let target = canonical_target(&input.target);
        let candidates: Vec<&PathBuf> = input
            .files
            .iter()
            .filter(|path| {
                let allowed = FormatRegistry::for_path(path)
                    .map(|format| is_allowed(format.mime_type, &target))
                    .unwrap_or(false);
                if !allowed {
                    info!("略過 {}：無法轉換為 {}", path.display(), target);
                }
                allowed
            })
            .collect();
        report.skipped = input.files.len() - candidates.len();
        info!("正在處理 {} 個檔案，略過 {} 個", candidates.len(), report.skipped);

        if candidates.is_empty() {
            warn!("無符合條件的檔案可處理");
            return Ok(report);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(input.jobs.unwrap_or(0))
            .build()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("建立執行緒池失敗: {}", e)))?;
        let pb = create_progress_bar(candidates.len() as u64, input.no_progress);

        let results: Vec<(PathBuf, Result<ConversionOutput>)> = pool.install(|| {
            candidates
                .par_iter()
                .map(|path| {
                    let result = self.convert_one(path, &input);
                    pb.inc(&path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default());
                    ((*path).clone(), result)
                })
                .collect()
        });

        for (path, result) in results {
            match result {
                Ok(output) => {
                    report.succeeded += 1;
                    if output.outcome.is_fallback() {
                        report.fallbacks += 1;
                    }
                }
                Err(e) => {
                    error!("處理檔案 {} 失敗: {}", path.display(), e);
                    report.failed.push((path, e.to_string()));
                }
            }
        }
        pb.finish(report.succeeded, report.failed.len(), report.skipped);
        Ok(report)
    }

    fn convert_one(&self, path: &Path, input: &BatchInput) -> Result<ConversionOutput> {
        let output_dir = mirrored_output_dir(path, &input.root, &input.output_dir);
        let sink: Box<dyn OutputSink> = match input.delivery {
            DeliveryMode::File => Box::new(FileSink::new(&output_dir)),
            DeliveryMode::Html => Box::new(HtmlDownloadSink::new(output_dir.to_string_lossy().to_string())),
        };
        let (output, _) = self.facade.convert_and_deliver(
            &FileSource::new(path),
            &input.target,
            input.options,
            sink.as_ref(),
        )?;
        Ok(output)
    }
}

/// 依輸入檔相對於根目錄的位置，於輸出目錄下建立相同結構
pub fn mirrored_output_dir(path: &Path, root: &Path, output_dir: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or(root);
    match diff_paths(parent, root) {
        Some(relative) if !relative.starts_with("..") => output_dir.join(relative),
        _ => output_dir.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facade::conversion_facade::ConversionFacade;
    use crate::models::conversion::ConversionOptions;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn mirrors_relative_directories() {
        let out = mirrored_output_dir(Path::new("/in/a/b/file.txt"), Path::new("/in"), Path::new("/out"));
        assert_eq!(out, PathBuf::from("/out/a/b"));
        let flat = mirrored_output_dir(Path::new("/elsewhere/file.txt"), Path::new("/in"), Path::new("/out"));
        assert_eq!(flat, PathBuf::from("/out"));
    }

    #[test]
    fn batch_converts_allowed_and_skips_the_rest() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("in");
        fs::create_dir_all(root.join("docs")).unwrap();
        fs::write(root.join("a.txt"), "alpha").unwrap();
        fs::write(root.join("docs/b.txt"), "beta").unwrap();
        fs::write(root.join("c.pdf"), "%PDF-1.4").unwrap();
        let output_dir = dir.path().join("out");

        let facade = ConversionFacade::default();
        let report = BatchService::new(&facade)
            .run(BatchInput {
                root: root.clone(),
                files: vec![root.join("a.txt"), root.join("docs/b.txt"), root.join("c.pdf")],
                output_dir: output_dir.clone(),
                target: "markdown".to_string(),
                options: ConversionOptions::default(),
                delivery: DeliveryMode::File,
                jobs: Some(2),
                no_progress: true,
            })
            .unwrap();

        assert_eq!(report.succeeded, 2);
        assert_eq!(report.skipped, 1);
        assert!(report.failed.is_empty());
        assert_eq!(fs::read_to_string(output_dir.join("a.markdown")).unwrap(), "```\nalpha\n```");
        assert_eq!(fs::read_to_string(output_dir.join("docs/b.markdown")).unwrap(), "```\nbeta\n```");
    }

    #[test]
    fn failures_are_reported_per_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("broken.png"), "not really a png").unwrap();
        let facade = ConversionFacade::default();
        let report = BatchService::new(&facade)
            .run(BatchInput {
                root: dir.path().to_path_buf(),
                files: vec![dir.path().join("broken.png")],
                output_dir: dir.path().join("out"),
                target: "jpeg".to_string(),
                options: ConversionOptions::default(),
                delivery: DeliveryMode::File,
                jobs: None,
                no_progress: true,
            })
            .unwrap();
        assert_eq!(report.succeeded, 0);
        assert_eq!(report.failed.len(), 1);
        assert!(!dir.path().join("out/broken.jpeg").exists());
    }

    #[test]
    fn jpg_target_matches_jpeg_rules() {
        let dir = tempdir().unwrap();
        image::DynamicImage::ImageRgb8(image::RgbImage::new(4, 3))
            .save(dir.path().join("shot.png"))
            .unwrap();
        let facade = ConversionFacade::default();
        let report = BatchService::new(&facade)
            .run(BatchInput {
                root: dir.path().to_path_buf(),
                files: vec![dir.path().join("shot.png")],
                output_dir: dir.path().join("out"),
                target: "jpg".to_string(),
                options: ConversionOptions::default(),
                delivery: DeliveryMode::File,
                jobs: Some(1),
                no_progress: true,
            })
            .unwrap();
        assert_eq!(report.skipped, 0);
        assert_eq!(report.succeeded, 1);
        let bytes = fs::read(dir.path().join("out/shot.jpeg")).unwrap();
        assert!(bytes.starts_with(&[0xFF, 0xD8, 0xFF]));
    }
}
