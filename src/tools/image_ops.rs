//! 灰階影像運算工具
//!
//! 提供清晰度估計與 OCR 前處理所需的像素級運算。
//! 全部以 `image::GrayImage` 實作，不依賴外部視覺函式庫。

use image::{GrayImage, Luma};

/// 計算灰階影像的離散拉普拉斯變異數（清晰度代理指標）
///
/// 使用 4 鄰域拉普拉斯核（上下左右之和減去 4 倍中心值），
/// 對內部像素計算響應後取變異數。模糊影像的邊緣響應集中在 0 附近，
/// 變異數低；清晰影像邊緣響應強，變異數高。
#[must_use]
pub fn laplacian_variance(image: &GrayImage) -> f64 {
    let (width, height) = image.dimensions();
    if width < 3 || height < 3 {
        return 0.0;
    }

    let mut responses = Vec::with_capacity(((width - 2) * (height - 2)) as usize);
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let center = f64::from(image.get_pixel(x, y).0[0]);
            let neighbors = f64::from(image.get_pixel(x - 1, y).0[0])
                + f64::from(image.get_pixel(x + 1, y).0[0])
                + f64::from(image.get_pixel(x, y - 1).0[0])
                + f64::from(image.get_pixel(x, y + 1).0[0]);
            responses.push(neighbors - 4.0 * center);
        }
    }

    variance(&responses)
}

fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
}

/// 直方圖均衡化，拉開字幕區域的對比度
#[must_use]
pub fn equalize_histogram(image: &GrayImage) -> GrayImage {
    let total = u64::from(image.width()) * u64::from(image.height());
    if total == 0 {
        return image.clone();
    }

    let mut histogram = [0u64; 256];
    for pixel in image.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }

    // 累積分布函數的第一個非零值
    let cdf_min = histogram.iter().copied().find(|&count| count > 0).unwrap_or(0);
    let denom = total.saturating_sub(cdf_min) as f64;
    if denom <= 0.0 {
        // 單一灰階值的影像，均衡化沒有意義
        return image.clone();
    }

    let mut lut = [0u8; 256];
    let mut cumulative = 0u64;
    for (level, &count) in histogram.iter().enumerate() {
        cumulative += count;
        let scaled = (cumulative.saturating_sub(cdf_min) as f64 / denom * 255.0).round();
        lut[level] = scaled.clamp(0.0, 255.0) as u8;
    }

    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([lut[image.get_pixel(x, y).0[0] as usize]])
    })
}

/// 區域自適應二值化（均值法）
///
/// 以積分影像計算每個像素周圍 `block_size` 見方視窗的平均值，
/// 像素值大於（平均值 - c）者設為白（255），否則為黑（0）。
/// 視窗超出邊界時裁切至影像範圍。
#[must_use]
pub fn adaptive_threshold(image: &GrayImage, block_size: u32, c: f64) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let radius = i64::from(block_size / 2);
    let integral = integral_image(image);

    GrayImage::from_fn(width, height, |x, y| {
        let x0 = (i64::from(x) - radius).max(0) as u32;
        let y0 = (i64::from(y) - radius).max(0) as u32;
        let x1 = (i64::from(x) + radius).min(i64::from(width) - 1) as u32;
        let y1 = (i64::from(y) + radius).min(i64::from(height) - 1) as u32;

        let area = f64::from((x1 - x0 + 1) * (y1 - y0 + 1));
        let sum = window_sum(&integral, width, x0, y0, x1, y1) as f64;
        let mean = sum / area;

        if f64::from(image.get_pixel(x, y).0[0]) > mean - c {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// 建立積分影像，尺寸為 (width+1) x (height+1)
fn integral_image(image: &GrayImage) -> Vec<u64> {
    let (width, height) = image.dimensions();
    let stride = (width + 1) as usize;
    let mut integral = vec![0u64; stride * (height + 1) as usize];

    for y in 0..height as usize {
        for x in 0..width as usize {
            let pixel = u64::from(image.get_pixel(x as u32, y as u32).0[0]);
            integral[(y + 1) * stride + (x + 1)] = pixel
                + integral[y * stride + (x + 1)]
                + integral[(y + 1) * stride + x]
                - integral[y * stride + x];
        }
    }

    integral
}

/// 查詢積分影像中 [x0, x1] x [y0, y1]（含邊界）的像素總和
fn window_sum(integral: &[u64], width: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> u64 {
    let stride = (width + 1) as usize;
    let (x0, y0, x1, y1) = (x0 as usize, y0 as usize, x1 as usize, y1 as usize);
    integral[(y1 + 1) * stride + (x1 + 1)] + integral[y0 * stride + x0]
        - integral[y0 * stride + (x1 + 1)]
        - integral[(y1 + 1) * stride + x0]
}

/// 計算 Otsu 演算法的最佳二值化門檻
///
/// 在 256 個灰階值中尋找使前景 / 背景類間變異數最大的分割點。
#[must_use]
pub fn otsu_level(image: &GrayImage) -> u8 {
    let total = u64::from(image.width()) * u64::from(image.height());
    if total == 0 {
        return 0;
    }

    let mut histogram = [0u64; 256];
    for pixel in image.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }

    let sum_all: f64 = histogram
        .iter()
        .enumerate()
        .map(|(level, &count)| level as f64 * count as f64)
        .sum();

    let mut weight_bg = 0.0f64;
    let mut sum_bg = 0.0f64;
    let mut best_level = 0u8;
    let mut best_variance = -1.0f64;

    for (level, &count) in histogram.iter().enumerate() {
        weight_bg += count as f64;
        if weight_bg == 0.0 {
            continue;
        }
        let weight_fg = total as f64 - weight_bg;
        if weight_fg == 0.0 {
            break;
        }

        sum_bg += level as f64 * count as f64;
        let mean_bg = sum_bg / weight_bg;
        let mean_fg = (sum_all - sum_bg) / weight_fg;
        let between = weight_bg * weight_fg * (mean_bg - mean_fg).powi(2);

        if between > best_variance {
            best_variance = between;
            best_level = level as u8;
        }
    }

    best_level
}

/// 以固定門檻二值化，大於門檻的像素設為白
#[must_use]
pub fn binarize(image: &GrayImage, level: u8) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        if image.get_pixel(x, y).0[0] > level {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// 黑白反轉
#[must_use]
pub fn invert(image: &GrayImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([255 - image.get_pixel(x, y).0[0]])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_image(width: u32, height: u32, value: u8) -> GrayImage {
        GrayImage::from_pixel(width, height, Luma([value]))
    }

    fn checkerboard(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Luma([0])
            } else {
                Luma([255])
            }
        })
    }

    #[test]
    fn test_laplacian_variance_flat_image_is_zero() {
        let image = flat_image(16, 16, 128);
        assert!(laplacian_variance(&image).abs() < f64::EPSILON);
    }

    #[test]
    fn test_laplacian_variance_checkerboard_is_large() {
        let image = checkerboard(16, 16);
        // 棋盤格的每個像素都是極端邊緣，變異數應遠大於清晰度校準上限
        assert!(laplacian_variance(&image) > 500.0);
    }

    #[test]
    fn test_laplacian_variance_tiny_image() {
        let image = flat_image(2, 2, 100);
        assert!(laplacian_variance(&image).abs() < f64::EPSILON);
    }

    #[test]
    fn test_equalize_histogram_constant_image_unchanged() {
        let image = flat_image(8, 8, 77);
        let equalized = equalize_histogram(&image);
        assert_eq!(equalized.get_pixel(3, 3).0[0], 77);
    }

    #[test]
    fn test_equalize_histogram_stretches_two_levels() {
        let image = GrayImage::from_fn(8, 8, |x, _| {
            if x < 4 { Luma([100]) } else { Luma([150]) }
        });
        let equalized = equalize_histogram(&image);
        let values: Vec<u8> = equalized.pixels().map(|p| p.0[0]).collect();
        assert_eq!(*values.iter().min().unwrap(), 0);
        assert_eq!(*values.iter().max().unwrap(), 255);
    }

    #[test]
    fn test_adaptive_threshold_uniform_image_all_white() {
        // 均勻影像中每個像素都大於（區域平均 - c）
        let image = flat_image(12, 12, 90);
        let result = adaptive_threshold(&image, 11, 2.0);
        assert!(result.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn test_adaptive_threshold_dark_spot_goes_black() {
        let mut image = flat_image(15, 15, 200);
        image.put_pixel(7, 7, Luma([10]));
        let result = adaptive_threshold(&image, 11, 2.0);
        assert_eq!(result.get_pixel(7, 7).0[0], 0);
        assert_eq!(result.get_pixel(0, 0).0[0], 255);
    }

    #[test]
    fn test_otsu_level_separates_bimodal() {
        let image = GrayImage::from_fn(16, 16, |x, _| {
            if x < 8 { Luma([30]) } else { Luma([220]) }
        });
        let level = otsu_level(&image);
        assert!(level >= 30 && level < 220, "門檻應落在兩峰之間: {level}");

        let binary = binarize(&image, level);
        assert_eq!(binary.get_pixel(0, 0).0[0], 0);
        assert_eq!(binary.get_pixel(15, 0).0[0], 255);
    }

    #[test]
    fn test_invert_round_trip() {
        let image = checkerboard(8, 8);
        let restored = invert(&invert(&image));
        assert_eq!(image.as_raw(), restored.as_raw());
    }
}
