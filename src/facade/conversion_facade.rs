use std::path::PathBuf;

use log::{debug, info, warn};

use crate::error::{ConversionError, Result};
use crate::facade::ports::facade_ports::{InputSource, OutputSink};
use crate::facade::traits::i_conversion::ConversionFacadeTrait;
use crate::models::conversion::{
    ConversionOptions, ConversionOutcome, ConversionOutput, ConversionRequest, ConversionResult,
};
use crate::models::format::SourceCategory;
use crate::service::image::ImageService;
use crate::service::pdf::PdfService;
use crate::service::registry::{canonical_target, FormatRegistry};
use crate::service::rules::{available_targets, is_allowed};
use crate::service::text::TextService;
use crate::service::traits::i_service::{ImageServiceTrait, PdfServiceTrait, TextServiceTrait};

/// 轉換分派器：依來源分類與目標副檔名選擇對應的服務
pub struct ConversionFacade {
    text_service: Box<dyn TextServiceTrait>,
    pdf_service: Box<dyn PdfServiceTrait>,
    image_service: Box<dyn ImageServiceTrait>,
}

impl ConversionFacade {
    pub fn new(
        text_service: Box<dyn TextServiceTrait>,
        pdf_service: Box<dyn PdfServiceTrait>,
        image_service: Box<dyn ImageServiceTrait>,
    ) -> Self {
        ConversionFacade {
            text_service,
            pdf_service,
            image_service,
        }
    }
}

impl Default for ConversionFacade {
    fn default() -> Self {
        Self::new(
            Box::new(TextService::new()),
            Box::new(PdfService::default()),
            Box::new(ImageService::new()),
        )
    }
}

impl ConversionFacadeTrait for ConversionFacade {
    fn available_targets(&self, source_mime: &str) -> Vec<&'static str> {
        let targets = available_targets(source_mime).to_vec();
        debug!("來源 {} 可轉換為：{:?}", source_mime, targets);
        targets
    }

    fn convert(&self, request: &ConversionRequest) -> ConversionResult {
        let target = canonical_target(&request.target_extension);
        info!(
            "開始轉換，來源：{}，目標：{}，輸入大小：{} 位元組",
            request.source_mime,
            target,
            request.input_bytes.len()
        );

        let category = SourceCategory::from_mime(&request.source_mime)
            .ok_or_else(|| ConversionError::UnsupportedSourceFormat(request.source_mime.clone()))?;
        request.options.validate()?;
        debug!("來源分類：{}", category.as_str());

        // 規則表之外的組合一律拒絕；文字來源沿用目標格式錯誤
        if !is_allowed(&request.source_mime, &target) {
            warn!("不支援的轉換：{} -> {}", request.source_mime, target);
            return Err(match category {
                SourceCategory::Text => ConversionError::UnsupportedTargetFormat(target),
                _ => ConversionError::unsupported_conversion(request.source_mime.clone(), target),
            });
        }

        let (bytes, extension, outcome) = match category {
            SourceCategory::Text => {
                let text = String::from_utf8_lossy(&request.input_bytes);
                let bytes = self.text_service.convert(&text, &target)?;
                (bytes, target.clone(), ConversionOutcome::Succeeded)
            }
            SourceCategory::Pdf => {
                let bytes = self.pdf_service.convert(&request.input_bytes, &target)?;
                (bytes, target.clone(), ConversionOutcome::Succeeded)
            }
            SourceCategory::Image => {
                let encoded = self
                    .image_service
                    .convert(&request.input_bytes, &target, &request.options)
                    .map_err(|e| match e {
                        ConversionError::UnsupportedConversion { target, .. } => {
                            ConversionError::unsupported_conversion(request.source_mime.clone(), target)
                        }
                        other => other,
                    })?;
                match encoded.fallback_reason {
                    Some(reason) => {
                        warn!("目標 {} 改以 {} 輸出：{}", target, encoded.extension, reason);
                        let outcome = ConversionOutcome::SucceededWithFallback {
                            requested: target.clone(),
                            actual: encoded.extension.to_string(),
                            reason,
                        };
                        (encoded.bytes, encoded.extension.to_string(), outcome)
                    }
                    None => (encoded.bytes, target.clone(), ConversionOutcome::Succeeded),
                }
            }
        };

        let descriptor = FormatRegistry::require_extension(&extension)?;
        let output = ConversionOutput {
            file_name: request.output_file_name(&extension),
            mime_type: descriptor.mime_type.to_string(),
            extension,
            bytes,
            outcome,
        };
        info!(
            "轉換完成：{}，輸出大小：{} 位元組{}",
            output.file_name,
            output.bytes.len(),
            if output.outcome.is_fallback() { "（回退格式）" } else { "" }
        );
        Ok(output)
    }

    fn convert_and_deliver(
        &self,
        source: &dyn InputSource,
        target: &str,
        options: ConversionOptions,
        sink: &dyn OutputSink,
    ) -> Result<(ConversionOutput, PathBuf)> {
        let file = source.read_input()?;
        let request = ConversionRequest::new(file.bytes, file.mime_type, target)
            .with_options(options)
            .with_source_name(file.name);
        let output = self.convert(&request)?;
        let location = sink.deliver(&output)?;
        info!("已交付：{}", location.display());
        Ok((output, location))
    }
}
