//! Average-colour heuristic: a crude local stand-in for a real classifier.

use super::{Label, LabelOracle};
use crate::error::OracleError;
use async_trait::async_trait;

const HEURISTIC_SCORE: f32 = 0.75;

#[derive(Debug, Clone, Copy, Default)]
pub struct ColorOracle;

/// Mean R, G, B over every pixel.
pub fn average_rgb(image: &[u8]) -> Result<[f64; 3], image::ImageError> {
    let rgb = image::load_from_memory(image)?.to_rgb8();
    let mut sums = [0_u64; 3];
    for pixel in rgb.pixels() {
        for (sum, channel) in sums.iter_mut().zip(pixel.0) {
            *sum += u64::from(channel);
        }
    }
    let count = u64::from(rgb.width()) * u64::from(rgb.height());
    if count == 0 {
        return Ok([0.0; 3]);
    }
    Ok(sums.map(|s| s as f64 / count as f64))
}

/// Map an average colour to one of five foods.
pub fn classify([r, g, _b]: [f64; 3]) -> &'static str {
    if r > 200.0 && g > 200.0 {
        "rice"
    } else if r > 150.0 && g > 150.0 {
        if g > r {
            "broccoli"
        } else {
            "apple"
        }
    } else if r < 100.0 && g < 100.0 {
        "chicken breast"
    } else {
        "banana"
    }
}

#[async_trait]
impl LabelOracle for ColorOracle {
    fn name(&self) -> &'static str {
        "color"
    }

    async fn detect(&self, image: &[u8]) -> Result<Vec<Label>, OracleError> {
        let bytes = image.to_vec();
        let avg = tokio::task::spawn_blocking(move || average_rgb(&bytes)).await??;
        Ok(vec![Label::new(classify(avg), HEURISTIC_SCORE)])
    }
}
