use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;

use crate::action::interactive::process_interactive_mode;
use crate::config::config::{validate_file_patterns, validate_input_path, validate_target, Cli};
use crate::config::ports::{AppConfig, ConfigPort, DeliveryMode};
use crate::facade::conversion_facade::ConversionFacade;
use crate::facade::ports::facade_ports::OutputSink;
use crate::facade::traits::i_conversion::ConversionFacadeTrait;
use crate::models::batch::BatchInput;
use crate::models::file::FileCollectInput;
use crate::service::batch::BatchService;
use crate::service::config_service::ConfigService;
use crate::service::file::{FileService, FileSink, FileSource};
use crate::service::html::HtmlDownloadSink;
use crate::service::registry::FormatRegistry;
use crate::service::traits::i_service::FileServiceTrait;
use crate::utils::utils::setup_logging;

/// 無參數時進入互動模式；返回輸出位置，僅列出目標時為 None
pub fn process_args(args: Vec<String>) -> io::Result<Option<String>> {
    if args.len() == 1 {
        process_interactive_mode()
    } else {
        process_cli_mode()
    }
}

pub fn process_cli_mode() -> io::Result<Option<String>> {
    let cli = Cli::parse();
    setup_logging(&cli.log_level)?;

    let config_service = ConfigService::new(Box::new(CliConfigAdapter::new(cli.clone())));
    let config = config_service.get_config()?;
    let output = run_conversion(&config)?;

    if cli.show_config {
        println!("實際使用的配置：{:#?}", config);
    }
    Ok(output)
}

/// 依配置執行：列出目標、單檔轉換或目錄批次轉換
pub fn run_conversion(config: &AppConfig) -> io::Result<Option<String>> {
    let facade = ConversionFacade::default();
    let input_path = Path::new(&config.input);

    if config.list_targets {
        print_available_targets(&facade, input_path)?;
        return Ok(None);
    }

    let target = config.target.clone().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "請使用 --to 指定目標格式，或以 --list-targets 查看可用格式")
    })?;

    if input_path.is_dir() {
        run_batch(&facade, config, &target).map(Some)
    } else {
        let sink = create_sink(config.delivery, Path::new(&config.output));
        let (output, location) = facade.convert_and_deliver(
            &FileSource::new(input_path),
            &target,
            config.options,
            sink.as_ref(),
        )?;
        if output.outcome.is_fallback() {
            println!("注意：無法輸出 {}，已改為 {}", target.to_uppercase(), output.extension.to_uppercase());
        }
        Ok(Some(location.display().to_string()))
    }
}

pub fn create_sink(delivery: DeliveryMode, output_dir: &Path) -> Box<dyn OutputSink> {
    match delivery {
        DeliveryMode::File => Box::new(FileSink::new(output_dir)),
        DeliveryMode::Html => Box::new(HtmlDownloadSink::new(output_dir.to_string_lossy().to_string())),
    }
}

fn print_available_targets(facade: &dyn ConversionFacadeTrait, input_path: &Path) -> io::Result<()> {
    let extension = input_path
        .extension()
        .map(|ext| ext.to_string_lossy().to_string())
        .unwrap_or_default();
    let source = FormatRegistry::require_extension(&extension)?;
    let targets = facade.available_targets(source.mime_type);
    if targets.is_empty() {
        println!("{}（{}）沒有可用的轉換目標", source.display_name, source.mime_type);
        return Ok(());
    }
    println!("{}（{}）可轉換為：", source.display_name, source.mime_type);
    for target in targets {
        match FormatRegistry::by_extension(target) {
            Some(format) => println!("  {:<10} {} - {}", format.extension, format.display_name, format.description),
            None => println!("  {}", target),
        }
    }
    Ok(())
}

fn run_batch(facade: &dyn ConversionFacadeTrait, config: &AppConfig, target: &str) -> io::Result<String> {
    let collected = FileService::new().collect_files(FileCollectInput {
        input_path: PathBuf::from(&config.input),
        include_patterns: config.include.clone(),
        exclude_patterns: config.exclude.clone(),
        max_size: config.max_size,
    })?;

    let report = BatchService::new(facade).run(BatchInput {
        root: PathBuf::from(&config.input),
        files: collected.files,
        output_dir: PathBuf::from(&config.output),
        target: target.to_string(),
        options: config.options,
        delivery: config.delivery,
        jobs: config.jobs,
        no_progress: config.no_progress,
    })?;

    log::info!(
        "批次轉換結束：成功 {} 個（回退 {} 個），失敗 {} 個，略過 {} 個",
        report.succeeded,
        report.fallbacks,
        report.failed.len(),
        report.skipped
    );
    if report.processed() > 0 && report.succeeded == 0 {
        return Err(io::Error::new(io::ErrorKind::Other, "所有檔案轉換皆失敗"));
    }
    Ok(config.output.clone())
}

// CLI 配置適配器
pub struct CliConfigAdapter {
    cli: Cli,
}

impl CliConfigAdapter {
    pub fn new(cli: Cli) -> Self {
        CliConfigAdapter { cli }
    }
}

impl ConfigPort for CliConfigAdapter {
    fn get_config(&self) -> io::Result<AppConfig> {
        validate_input_path(&self.cli.input)?;
        validate_file_patterns(&self.cli.include, &self.cli.exclude)?;
        let target = self.cli.to.as_deref().map(validate_target).transpose()?;
        let options = self.cli.options();
        options.validate()?;

        if self.cli.jobs == Some(0) {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "--jobs 必須大於 0"));
        }

        Ok(AppConfig {
            input: self.cli.input.clone(),
            output: self.cli.output.clone(),
            target,
            options,
            delivery: self.cli.deliver,
            include: self.cli.include.clone(),
            exclude: self.cli.exclude.clone(),
            max_size: self.cli.max_size,
            jobs: self.cli.jobs,
            no_progress: self.cli.no_progress,
            list_targets: self.cli.list_targets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::conversion::ConversionOptions;
    use std::fs;
    use tempfile::tempdir;

    fn config(input: &Path, output: &Path, target: &str, delivery: DeliveryMode) -> AppConfig {
        AppConfig {
            input: input.to_string_lossy().to_string(),
            output: output.to_string_lossy().to_string(),
            target: Some(target.to_string()),
            options: ConversionOptions::default(),
            delivery,
            include: vec!["*".to_string()],
            exclude: None,
            max_size: None,
            jobs: None,
            no_progress: true,
            list_targets: false,
        }
    }

    #[test]
    fn adapter_validates_and_normalizes_target() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("a.txt");
        fs::write(&input, "x").unwrap();
        let cli = Cli::try_parse_from(["file_converter", input.to_str().unwrap(), "--to", ".PDF"]).unwrap();
        let config = CliConfigAdapter::new(cli).get_config().unwrap();
        assert_eq!(config.target.as_deref(), Some("pdf"));
    }

    #[test]
    fn adapter_rejects_missing_input() {
        let cli = Cli::try_parse_from(["file_converter", "/definitely/not/here.txt", "--to", "pdf"]).unwrap();
        let err = CliConfigAdapter::new(cli).get_config().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn single_file_is_written_to_output_dir() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("hello.txt");
        fs::write(&input, "Hello").unwrap();
        let out = dir.path().join("out");
        let location = run_conversion(&config(&input, &out, "markdown", DeliveryMode::File))
            .unwrap()
            .unwrap();
        assert_eq!(PathBuf::from(location), out.join("hello.markdown"));
        assert_eq!(fs::read(out.join("hello.markdown")).unwrap(), b"```\nHello\n```");
    }

    #[test]
    fn html_delivery_wraps_output_in_download_page() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("hello.txt");
        fs::write(&input, "Hello").unwrap();
        let out = dir.path().join("out");
        run_conversion(&config(&input, &out, "html", DeliveryMode::Html)).unwrap();
        let page = fs::read_to_string(out.join("hello.html.html")).unwrap();
        assert!(page.contains("data:text/html;base64,"));
    }

    #[test]
    fn missing_target_is_an_error() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("hello.txt");
        fs::write(&input, "Hello").unwrap();
        let mut cfg = config(&input, dir.path(), "pdf", DeliveryMode::File);
        cfg.target = None;
        assert_eq!(run_conversion(&cfg).unwrap_err().kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn list_targets_returns_no_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("photo.png");
        fs::write(&input, "x").unwrap();
        let mut cfg = config(&input, dir.path(), "jpeg", DeliveryMode::File);
        cfg.list_targets = true;
        assert!(run_conversion(&cfg).unwrap().is_none());
    }
}
