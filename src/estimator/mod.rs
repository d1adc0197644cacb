//! Nutrition estimation from detected labels and image bytes.
//!
//! A single pass: derive a seed from the image, match labels against the
//! food table, accumulate portion-scaled macros (or draw a mixed-meal
//! estimate when nothing matched) and expand the micronutrients in
//! proportion to the calorie total. Each call owns its generator.

pub mod archetypes;
pub mod micronutrients;
pub mod profiles;
pub mod seed;

use micronutrients::round_to;
use profiles::FoodProfile;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Calories of the meal the micronutrient ranges describe.
pub const REFERENCE_CALORIES: f64 = 400.0;
pub const MATCHED_CONFIDENCE: f64 = 0.85;
pub const FALLBACK_CONFIDENCE: f64 = 0.6;
pub const FALLBACK_FOOD: &str = "mixed meal";

const PORTION_RANGE: (f64, f64) = (0.8, 1.5);

const FALLBACK_CALORIES: (u32, u32) = (300, 600);
const FALLBACK_PROTEIN: (f64, f64) = (15.0, 35.0);
const FALLBACK_CARBS: (f64, f64) = (30.0, 70.0);
const FALLBACK_FAT: (f64, f64) = (10.0, 30.0);

// Per reference meal; scaled like the micronutrients.
const FIBER_RANGE: (f64, f64) = (3.0, 8.0);
const SUGAR_RANGE: (f64, f64) = (5.0, 15.0);
const SODIUM_RANGE: (f64, f64) = (300.0, 800.0);

/// What the estimator gets to look at.
#[derive(Debug, Clone, Default)]
pub struct AnalysisInput<'a> {
    pub image: Option<&'a [u8]>,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionFacts {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
    pub sugar: f64,
    pub sodium: f64,
    pub micronutrients: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionResult {
    pub nutrition: NutritionFacts,
    pub detected_foods: Vec<String>,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_type: Option<String>,
}

#[derive(Debug, Default, Clone, Copy)]
struct MacroTotals {
    calories: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
}

fn aggregate<R: Rng + ?Sized>(rng: &mut R, foods: &[&FoodProfile]) -> MacroTotals {
    foods.iter().fold(MacroTotals::default(), |acc, food| {
        let portion = rng.gen_range(PORTION_RANGE.0..=PORTION_RANGE.1);
        MacroTotals {
            calories: food.calories.1.mul_add(portion, acc.calories),
            protein: food.protein.1.mul_add(portion, acc.protein),
            carbs: food.carbs.1.mul_add(portion, acc.carbs),
            fat: food.fat.1.mul_add(portion, acc.fat),
        }
    })
}

fn mixed_meal<R: Rng + ?Sized>(rng: &mut R) -> MacroTotals {
    MacroTotals {
        calories: f64::from(rng.gen_range(FALLBACK_CALORIES.0..=FALLBACK_CALORIES.1)),
        protein: rng.gen_range(FALLBACK_PROTEIN.0..=FALLBACK_PROTEIN.1),
        carbs: rng.gen_range(FALLBACK_CARBS.0..=FALLBACK_CARBS.1),
        fat: rng.gen_range(FALLBACK_FAT.0..=FALLBACK_FAT.1),
    }
}

/// `calories / REFERENCE_CALORIES`, never negative.
pub fn base_multiplier(calories: f64) -> f64 {
    (calories / REFERENCE_CALORIES).max(0.0)
}

/// Estimate a full nutrition breakdown. Pure apart from the clock read when
/// no image is given.
pub fn estimate(input: &AnalysisInput<'_>) -> NutritionResult {
    let seed = seed::derive_seed(input.image);
    let mut rng = seed::request_rng(seed);

    let labels: Vec<String> = input.labels.iter().map(|l| l.to_lowercase()).collect();
    let foods = profiles::match_labels(&labels);
    let matched = !foods.is_empty();

    let totals = if matched {
        aggregate(&mut rng, &foods)
    } else {
        mixed_meal(&mut rng)
    };

    let calories = round_to(totals.calories, 0);
    let multiplier = base_multiplier(calories);

    let fiber = round_to(rng.gen_range(FIBER_RANGE.0..=FIBER_RANGE.1) * multiplier, 1);
    let sugar = round_to(rng.gen_range(SUGAR_RANGE.0..=SUGAR_RANGE.1) * multiplier, 1);
    let sodium = round_to(rng.gen_range(SODIUM_RANGE.0..=SODIUM_RANGE.1) * multiplier, 0);
    let micronutrients = micronutrients::expand(&mut rng, multiplier);

    let detected_foods: Vec<String> = if matched {
        foods.iter().map(|f| f.name.to_owned()).collect()
    } else {
        vec![FALLBACK_FOOD.to_owned()]
    };

    debug!(
        seed,
        matched,
        foods = ?detected_foods,
        calories,
        "estimated nutrition"
    );

    NutritionResult {
        nutrition: NutritionFacts {
            calories,
            protein: round_to(totals.protein, 1),
            carbs: round_to(totals.carbs, 1),
            fat: round_to(totals.fat, 1),
            fiber,
            sugar,
            sodium,
            micronutrients,
        },
        detected_foods,
        confidence: if matched {
            MATCHED_CONFIDENCE
        } else {
            FALLBACK_CONFIDENCE
        },
        meal_type: archetypes::identify(&labels).map(str::to_owned),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn matched_macros_use_upper_bounds_times_portion() {
        let bytes = [0_u8; 10];
        let result = estimate(&AnalysisInput {
            image: Some(&bytes[..]),
            labels: labels(&["banana"]),
        });
        let cal = result.nutrition.calories;
        assert!((96.0..=180.0).contains(&cal), "calories {cal}");
        assert_eq!(result.detected_foods, vec!["banana"]);
    }

    #[test]
    fn fallback_calories_are_whole_and_bounded() {
        let result = estimate(&AnalysisInput {
            image: Some(&b"no labels"[..]),
            labels: Vec::new(),
        });
        let cal = result.nutrition.calories;
        assert_eq!(cal.fract(), 0.0);
        assert!((300.0..=600.0).contains(&cal));
        assert!(result.meal_type.is_none());
    }

    #[test]
    fn base_multiplier_is_monotonic() {
        assert!(base_multiplier(800.0) > base_multiplier(400.0));
        assert_eq!(base_multiplier(400.0), 1.0);
        assert_eq!(base_multiplier(-5.0), 0.0);
    }
}
