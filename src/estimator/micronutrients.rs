//! Fixed micronutrient table and calorie-scaled expansion.

use rand::Rng;
use std::collections::BTreeMap;

/// One micronutrient: draw range per reference meal and rounding precision.
#[derive(Debug, Clone, Copy)]
pub struct MicronutrientSpec {
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
    pub decimals: u32,
}

const fn nutrient(name: &'static str, min: f64, max: f64, decimals: u32) -> MicronutrientSpec {
    MicronutrientSpec {
        name,
        min,
        max,
        decimals,
    }
}

/// Draw order is part of the determinism contract; do not reorder.
pub const MICRONUTRIENTS: &[MicronutrientSpec] = &[
    nutrient("iron", 1.0, 5.0, 1),
    nutrient("calcium", 50.0, 200.0, 1),
    nutrient("vitamin_c", 10.0, 50.0, 1),
    nutrient("potassium", 200.0, 600.0, 1),
    nutrient("vitamin_a", 100.0, 800.0, 1),
    nutrient("vitamin_e", 1.0, 5.0, 1),
    nutrient("vitamin_k", 5.0, 25.0, 1),
    nutrient("folate", 20.0, 80.0, 1),
    nutrient("niacin", 3.0, 12.0, 1),
    nutrient("riboflavin", 0.2, 0.8, 2),
    nutrient("thiamin", 0.1, 0.5, 2),
    nutrient("vitamin_b6", 0.3, 1.2, 2),
    nutrient("phosphorus", 80.0, 180.0, 1),
    nutrient("selenium", 5.0, 25.0, 1),
    nutrient("copper", 0.1, 0.5, 2),
    nutrient("manganese", 0.2, 0.8, 2),
    nutrient("chromium", 2.0, 8.0, 1),
    nutrient("molybdenum", 5.0, 15.0, 1),
    nutrient("iodine", 5.0, 25.0, 1),
    nutrient("chloride", 100.0, 400.0, 1),
    nutrient("biotin", 2.0, 8.0, 1),
    nutrient("pantothenic_acid", 1.0, 4.0, 1),
    nutrient("choline", 20.0, 80.0, 1),
    nutrient("betaine", 5.0, 20.0, 1),
    nutrient("taurine", 10.0, 40.0, 1),
    nutrient("creatine", 1.0, 5.0, 1),
    nutrient("carnitine", 5.0, 25.0, 1),
    nutrient("inositol", 10.0, 40.0, 1),
    nutrient("paba", 0.5, 2.0, 1),
    nutrient("lipoic_acid", 0.2, 1.0, 2),
    nutrient("coq10", 0.5, 2.0, 1),
    nutrient("glutathione", 5.0, 20.0, 1),
    nutrient("melatonin", 0.05, 0.2, 2),
    nutrient("serotonin", 0.02, 0.1, 2),
    nutrient("dopamine", 0.01, 0.05, 2),
    nutrient("norepinephrine", 0.005, 0.02, 3),
    nutrient("epinephrine", 0.002, 0.01, 3),
    nutrient("histamine", 0.05, 0.2, 2),
    nutrient("gaba", 0.2, 1.0, 2),
    nutrient("glycine", 50.0, 150.0, 1),
    nutrient("proline", 40.0, 120.0, 1),
    nutrient("serine", 30.0, 90.0, 1),
    nutrient("threonine", 25.0, 75.0, 1),
    nutrient("tryptophan", 10.0, 30.0, 1),
    nutrient("tyrosine", 20.0, 60.0, 1),
    nutrient("valine", 35.0, 105.0, 1),
    nutrient("alanine", 45.0, 135.0, 1),
    nutrient("arginine", 40.0, 120.0, 1),
    nutrient("asparagine", 30.0, 90.0, 1),
    nutrient("aspartic_acid", 35.0, 105.0, 1),
    nutrient("cysteine", 15.0, 45.0, 1),
    nutrient("glutamine", 50.0, 150.0, 1),
    nutrient("glutamic_acid", 60.0, 180.0, 1),
    nutrient("isoleucine", 30.0, 90.0, 1),
    nutrient("leucine", 40.0, 120.0, 1),
    nutrient("lysine", 35.0, 105.0, 1),
    nutrient("methionine", 12.0, 38.0, 1),
    nutrient("phenylalanine", 25.0, 75.0, 1),
    nutrient("histidine", 15.0, 45.0, 1),
];

/// Round half away from zero to `decimals` digits.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Draw every micronutrient once, in table order, scaled by `base_multiplier`.
pub fn expand<R: Rng + ?Sized>(rng: &mut R, base_multiplier: f64) -> BTreeMap<String, f64> {
    let base_multiplier = base_multiplier.max(0.0);
    MICRONUTRIENTS
        .iter()
        .map(|m| {
            let draw = rng.gen_range(m.min..=m.max);
            (m.name.to_owned(), round_to(draw * base_multiplier, m.decimals))
        })
        .collect()
}
