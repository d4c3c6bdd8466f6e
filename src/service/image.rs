use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageResult};
use log::{debug, info, warn};

use crate::error::{ConversionError, Result};
use crate::models::conversion::ConversionOptions;
use crate::service::traits::i_service::ImageServiceTrait;

// 與 image 解碼預設的 max_alloc 相同
const MAX_OUTPUT_BYTES: u64 = 512 * 1024 * 1024;

/// 圖片可編碼的目標格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageTarget {
    Png,
    Jpeg,
    Gif,
    Bmp,
    WebP,
}

impl ImageTarget {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "png" => Some(ImageTarget::Png),
            "jpeg" | "jpg" => Some(ImageTarget::Jpeg),
            "gif" => Some(ImageTarget::Gif),
            "bmp" => Some(ImageTarget::Bmp),
            "webp" => Some(ImageTarget::WebP),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageTarget::Png => "png",
            ImageTarget::Jpeg => "jpeg",
            ImageTarget::Gif => "gif",
            ImageTarget::Bmp => "bmp",
            ImageTarget::WebP => "webp",
        }
    }
}

/// 編碼完成的圖片；`fallback_reason` 有值代表以 PNG 代替了請求的格式
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub extension: &'static str,
    pub fallback_reason: Option<String>,
}

pub struct ImageService;

impl ImageService {
    pub fn new() -> Self {
        ImageService
    }
}

impl Default for ImageService {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageServiceTrait for ImageService {
    fn convert(&self, data: &[u8], target: &str, options: &ConversionOptions) -> Result<EncodedImage> {
        let target = ImageTarget::from_extension(target)
            .ok_or_else(|| ConversionError::unsupported_conversion("image/*", target))?;

        let img = image::load_from_memory(data).map_err(|e| ConversionError::ImageDecode(e.to_string()))?;
        let (orig_w, orig_h) = img.dimensions();
        debug!("解碼圖片：{}x{}，色彩：{:?}", orig_w, orig_h, img.color());

        let dimensions = target_dimensions(orig_w, orig_h, options.width, options.height);
        if let Some((w, h)) = dimensions {
            check_output_size(w, h, img.color().bytes_per_pixel())?;
        }
        let img = match dimensions {
            Some((w, h)) if (w, h) != (orig_w, orig_h) => {
                info!("縮放圖片：{}x{} -> {}x{}", orig_w, orig_h, w, h);
                img.resize_exact(w, h, FilterType::Triangle)
            }
            _ => img,
        };

        match target {
            ImageTarget::Png => Ok(encoded(encode_png(&img)?, ImageTarget::Png)),
            ImageTarget::Jpeg => Ok(encoded(encode_jpeg(&img, options.jpeg_quality())?, ImageTarget::Jpeg)),
            ImageTarget::Gif => Ok(encoded(encode_gif(&img)?, ImageTarget::Gif)),
            ImageTarget::Bmp => Ok(encoded(encode_bmp(&img)?, ImageTarget::Bmp)),
            ImageTarget::WebP => with_png_fallback(&img, encode_webp(&img)),
        }
    }
}

fn encoded(bytes: Vec<u8>, target: ImageTarget) -> EncodedImage {
    EncodedImage {
        bytes,
        extension: target.extension(),
        fallback_reason: None,
    }
}

/// 計算縮放尺寸；只給一邊時依原始比例推算另一邊，結果至少為 1
pub fn target_dimensions(orig_w: u32, orig_h: u32, width: Option<u32>, height: Option<u32>) -> Option<(u32, u32)> {
    let scaled = |other: u32, provided: u32, orig_provided: u32| -> u32 {
        let value = (other as f64 * provided as f64 / orig_provided.max(1) as f64).round();
        (value as u32).max(1)
    };
    match (width, height) {
        (Some(w), Some(h)) => Some((w, h)),
        (Some(w), None) => Some((w, scaled(orig_h, w, orig_w))),
        (None, Some(h)) => Some((scaled(orig_w, h, orig_h), h)),
        (None, None) => None,
    }
}

/// 縮放後的像素緩衝不得超過 MAX_OUTPUT_BYTES，編碼時至少以 RGBA8 計算
pub fn check_output_size(width: u32, height: u32, bytes_per_pixel: u8) -> Result<()> {
    let channels = u64::from(bytes_per_pixel.max(4));
    let needed = u64::from(width)
        .checked_mul(u64::from(height))
        .and_then(|pixels| pixels.checked_mul(channels));
    match needed {
        Some(bytes) if bytes <= MAX_OUTPUT_BYTES => Ok(()),
        _ => Err(ConversionError::InvalidOptions(format!(
            "輸出尺寸 {}x{} 過大，超過 {} MB 的像素緩衝上限",
            width,
            height,
            MAX_OUTPUT_BYTES / 1_048_576
        ))),
    }
}

fn encode_error(format: &str, err: impl std::fmt::Display) -> ConversionError {
    ConversionError::ImageEncode(format!("{}：{}", format, err))
}

fn write_with_format(img: &DynamicImage, format: ImageFormat) -> ImageResult<Vec<u8>> {
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), format)?;
    Ok(buffer)
}

pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>> {
    write_with_format(img, ImageFormat::Png).map_err(|e| encode_error("PNG", e))
}

// JPEG 不支援透明通道，先轉為 RGB8
fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
    rgb.write_with_encoder(encoder).map_err(|e| encode_error("JPEG", e))?;
    Ok(buffer)
}

fn encode_gif(img: &DynamicImage) -> Result<Vec<u8>> {
    let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
    write_with_format(&rgba, ImageFormat::Gif).map_err(|e| encode_error("GIF", e))
}

fn encode_bmp(img: &DynamicImage) -> Result<Vec<u8>> {
    let normalized = if img.color().has_alpha() {
        DynamicImage::ImageRgba8(img.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8())
    };
    write_with_format(&normalized, ImageFormat::Bmp).map_err(|e| encode_error("BMP", e))
}

#[cfg(feature = "webp")]
fn encode_webp(img: &DynamicImage) -> std::result::Result<Vec<u8>, String> {
    use image::codecs::webp::WebPEncoder;
    use image::ImageEncoder;

    let mut buffer = Vec::new();
    let encoder = WebPEncoder::new_lossless(&mut buffer);
    encoder
        .write_image(img.as_bytes(), img.width(), img.height(), img.color().into())
        .map_err(|e| e.to_string())?;
    Ok(buffer)
}

#[cfg(not(feature = "webp"))]
fn encode_webp(_img: &DynamicImage) -> std::result::Result<Vec<u8>, String> {
    Err("未啟用 WebP 編碼器".to_string())
}

/// WebP 編碼失敗或輸出為空時改用 PNG，並保留回退原因
pub fn with_png_fallback(img: &DynamicImage, attempt: std::result::Result<Vec<u8>, String>) -> Result<EncodedImage> {
    let reason = match attempt {
        Ok(bytes) if !bytes.is_empty() => return Ok(encoded(bytes, ImageTarget::WebP)),
        Ok(_) => "WebP 編碼器輸出為空".to_string(),
        Err(e) => e,
    };
    warn!("無法輸出 WebP（{}），改用 PNG", reason);
    Ok(EncodedImage {
        bytes: encode_png(img)?,
        extension: ImageTarget::Png.extension(),
        fallback_reason: Some(reason),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn sample_png(w: u32, h: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(w, h, |x, y| Rgba([(x * 7) as u8, (y * 5) as u8, 120, 255]));
        encode_png(&DynamicImage::ImageRgba8(img)).unwrap()
    }

    #[test]
    fn dimensions_follow_aspect_ratio() {
        assert_eq!(target_dimensions(400, 300, Some(200), None), Some((200, 150)));
        assert_eq!(target_dimensions(400, 300, None, Some(100)), Some((133, 100)));
        assert_eq!(target_dimensions(400, 300, Some(10), Some(10)), Some((10, 10)));
        assert_eq!(target_dimensions(400, 300, None, None), None);
    }

    #[test]
    fn oversized_resize_is_rejected_before_allocating() {
        let service = ImageService::new();
        let huge = ConversionOptions { width: Some(u32::MAX), height: Some(u32::MAX), ..Default::default() };
        assert!(huge.validate().is_ok());
        let err = service.convert(&sample_png(1, 2), "png", &huge).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidOptions(_)));

        // 只給寬度時，推算出的高度同樣受限
        let tall = ConversionOptions { width: Some(100_000), ..Default::default() };
        let err = service.convert(&sample_png(1, 1000), "jpeg", &tall).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidOptions(_)));
    }

    #[test]
    fn output_size_limit_boundaries() {
        assert!(check_output_size(8192, 8192, 4).is_ok());
        assert!(check_output_size(16384, 16384, 4).is_err());
        assert!(check_output_size(u32::MAX, u32::MAX, 16).is_err());
    }

    #[test]
    fn dimensions_never_collapse_to_zero() {
        assert_eq!(target_dimensions(1000, 1, Some(10), None), Some((10, 1)));
    }

    #[test]
    fn png_round_trip_keeps_dimensions() {
        let out = ImageService::new()
            .convert(&sample_png(37, 21), "png", &ConversionOptions::default())
            .unwrap();
        assert!(out.bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]));
        let decoded = image::load_from_memory(&out.bytes).unwrap();
        assert_eq!(decoded.dimensions(), (37, 21));
    }

    #[test]
    fn resize_by_width_only() {
        let options = ConversionOptions { width: Some(20), ..Default::default() };
        let out = ImageService::new().convert(&sample_png(40, 30), "png", &options).unwrap();
        let decoded = image::load_from_memory(&out.bytes).unwrap();
        assert_eq!(decoded.dimensions(), (20, 15));
    }

    #[test]
    fn jpeg_accepts_alpha_input() {
        let out = ImageService::new()
            .convert(&sample_png(8, 8), "jpg", &ConversionOptions { quality: Some(0), ..Default::default() })
            .unwrap();
        assert_eq!(out.extension, "jpeg");
        assert!(out.bytes.starts_with(&[0xFF, 0xD8]));
    }

    #[test]
    fn garbage_input_is_a_decode_error() {
        let err = ImageService::new()
            .convert(b"not an image", "png", &ConversionOptions::default())
            .unwrap_err();
        assert!(matches!(err, ConversionError::ImageDecode(_)));
    }

    #[test]
    fn unknown_image_target_is_unsupported() {
        let err = ImageService::new()
            .convert(&sample_png(2, 2), "pdf", &ConversionOptions::default())
            .unwrap_err();
        assert!(matches!(err, ConversionError::UnsupportedConversion { .. }));
    }

    #[test]
    fn failed_webp_attempt_falls_back_to_png() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(3, 3, Rgb([1, 2, 3])));
        let out = with_png_fallback(&img, Err("no encoder".to_string())).unwrap();
        assert_eq!(out.extension, "png");
        assert_eq!(out.fallback_reason.as_deref(), Some("no encoder"));
        assert!(out.bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]));
    }

    #[test]
    fn empty_webp_output_falls_back_to_png() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(3, 3, Rgb([1, 2, 3])));
        let out = with_png_fallback(&img, Ok(Vec::new())).unwrap();
        assert_eq!(out.extension, "png");
        assert!(!out.bytes.is_empty());
    }

    #[test]
    fn webp_target_is_webp_or_signalled_png() {
        let out = ImageService::new()
            .convert(&sample_png(5, 4), "webp", &ConversionOptions::default())
            .unwrap();
        match out.fallback_reason {
            None => {
                assert_eq!(&out.bytes[0..4], b"RIFF");
                assert_eq!(&out.bytes[8..12], b"WEBP");
            }
            Some(_) => assert!(out.bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47])),
        }
    }
}
