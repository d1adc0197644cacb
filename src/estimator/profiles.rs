//! Static food profiles and label matching.

/// Inclusive `(min, max)` range.
pub type Range = (f64, f64);

/// Nutrient ranges for one canonical food, per typical serving.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoodProfile {
    pub name: &'static str,
    pub calories: Range,
    pub protein: Range,
    pub carbs: Range,
    pub fat: Range,
}

const fn profile(
    name: &'static str,
    calories: Range,
    protein: Range,
    carbs: Range,
    fat: Range,
) -> FoodProfile {
    FoodProfile {
        name,
        calories,
        protein,
        carbs,
        fat,
    }
}

/// Canonical foods, in match priority order.
pub const FOOD_PROFILES: &[FoodProfile] = &[
    profile("chicken", (150.0, 250.0), (25.0, 35.0), (0.0, 2.0), (3.0, 10.0)),
    profile("beef", (200.0, 300.0), (20.0, 30.0), (0.0, 1.0), (10.0, 20.0)),
    profile("steak", (250.0, 350.0), (25.0, 35.0), (0.0, 1.0), (15.0, 25.0)),
    profile("pork", (200.0, 300.0), (20.0, 28.0), (0.0, 1.0), (10.0, 20.0)),
    profile("salmon", (200.0, 300.0), (20.0, 28.0), (0.0, 1.0), (10.0, 18.0)),
    profile("fish", (120.0, 200.0), (20.0, 26.0), (0.0, 1.0), (2.0, 8.0)),
    profile("shrimp", (80.0, 140.0), (15.0, 24.0), (0.0, 2.0), (1.0, 3.0)),
    profile("egg", (70.0, 160.0), (6.0, 13.0), (0.5, 1.5), (5.0, 11.0)),
    profile("tofu", (80.0, 180.0), (8.0, 18.0), (2.0, 5.0), (4.0, 11.0)),
    profile("rice", (150.0, 250.0), (3.0, 5.0), (30.0, 50.0), (0.3, 2.0)),
    profile("pasta", (200.0, 350.0), (7.0, 12.0), (40.0, 65.0), (1.0, 5.0)),
    profile("noodle", (190.0, 320.0), (6.0, 11.0), (38.0, 60.0), (1.0, 6.0)),
    profile("bread", (70.0, 160.0), (3.0, 6.0), (13.0, 28.0), (1.0, 3.0)),
    profile("pizza", (250.0, 400.0), (10.0, 16.0), (30.0, 45.0), (10.0, 18.0)),
    profile("burger", (350.0, 600.0), (20.0, 30.0), (30.0, 45.0), (15.0, 35.0)),
    profile("sandwich", (250.0, 450.0), (12.0, 25.0), (30.0, 45.0), (8.0, 20.0)),
    profile("fries", (300.0, 450.0), (3.0, 5.0), (40.0, 55.0), (15.0, 22.0)),
    profile("potato", (110.0, 200.0), (3.0, 5.0), (25.0, 40.0), (0.2, 1.0)),
    profile("salad", (50.0, 150.0), (2.0, 5.0), (5.0, 12.0), (3.0, 10.0)),
    profile("broccoli", (30.0, 60.0), (2.5, 4.0), (6.0, 11.0), (0.3, 0.7)),
    profile("vegetable", (25.0, 80.0), (1.0, 4.0), (5.0, 15.0), (0.2, 1.0)),
    profile("avocado", (160.0, 240.0), (2.0, 3.0), (8.0, 13.0), (15.0, 22.0)),
    profile("apple", (80.0, 110.0), (0.3, 0.6), (20.0, 28.0), (0.2, 0.4)),
    profile("banana", (90.0, 120.0), (1.0, 1.5), (23.0, 30.0), (0.3, 0.5)),
    profile("berries", (50.0, 85.0), (0.7, 1.5), (12.0, 20.0), (0.3, 0.8)),
    profile("fruit", (50.0, 120.0), (0.5, 1.5), (12.0, 30.0), (0.1, 0.5)),
    profile("cheese", (100.0, 200.0), (6.0, 14.0), (0.5, 2.0), (8.0, 16.0)),
    profile("yogurt", (100.0, 180.0), (8.0, 18.0), (10.0, 20.0), (0.5, 5.0)),
    profile("soup", (100.0, 250.0), (4.0, 12.0), (10.0, 25.0), (2.0, 10.0)),
    profile("beans", (200.0, 250.0), (13.0, 16.0), (35.0, 45.0), (0.5, 1.5)),
];

/// Coarse bucket tried when a label matches no canonical food.
#[derive(Debug, Clone, Copy)]
pub struct FallbackBucket {
    pub keywords: &'static [&'static str],
    pub profile: FoodProfile,
}

pub const FALLBACK_BUCKETS: &[FallbackBucket] = &[
    FallbackBucket {
        keywords: &[
            "meat", "poultry", "lamb", "turkey", "duck", "bacon", "sausage", "ham", "veal",
            "seafood", "protein",
        ],
        profile: profile("meat", (200.0, 300.0), (20.0, 30.0), (0.0, 2.0), (10.0, 20.0)),
    },
    FallbackBucket {
        keywords: &[
            "grain", "cereal", "wheat", "oat", "barley", "quinoa", "corn", "flour", "toast",
            "tortilla", "baked goods", "staple food",
        ],
        profile: profile("grain", (150.0, 250.0), (4.0, 8.0), (30.0, 50.0), (1.0, 4.0)),
    },
];

fn label_matches(label: &str, key: &str) -> bool {
    if label.contains(key) || key.contains(label) {
        return true;
    }
    label
        .split_whitespace()
        .any(|word| key.split_whitespace().any(|k| k == word))
}

/// Resolve one lowercase label to a profile: canonical foods first, then the
/// coarse buckets. Blank labels never match.
pub fn match_label(label: &str) -> Option<&'static FoodProfile> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }

    FOOD_PROFILES
        .iter()
        .find(|food| label_matches(label, food.name))
        .or_else(|| {
            FALLBACK_BUCKETS
                .iter()
                .find(|bucket| bucket.keywords.iter().any(|kw| label.contains(kw)))
                .map(|bucket| &bucket.profile)
        })
}

/// Match every label, dropping the unmatched and deduplicating in first-seen order.
pub fn match_labels<S: AsRef<str>>(labels: &[S]) -> Vec<&'static FoodProfile> {
    let mut matched: Vec<&'static FoodProfile> = Vec::new();
    for label in labels {
        let lowered = label.as_ref().to_lowercase();
        if let Some(food) = match_label(&lowered) {
            if !matched.iter().any(|m| m.name == food.name) {
                matched.push(food);
            }
        }
    }
    matched
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(labels: &[&str]) -> Vec<&'static str> {
        match_labels(labels).iter().map(|f| f.name).collect()
    }

    #[test]
    fn substring_match_in_either_direction() {
        assert_eq!(names(&["grilled chicken"]), vec!["chicken"]);
        assert_eq!(names(&["egg"]), vec!["egg"]);
        assert_eq!(names(&["eggs"]), vec!["egg"]);
    }

    #[test]
    fn first_match_wins_and_duplicates_collapse() {
        assert_eq!(
            names(&["grilled chicken", "salad", "chicken wing", "Chicken"]),
            vec!["chicken", "salad"]
        );
    }

    #[test]
    fn token_overlap_matches() {
        assert_eq!(names(&["green vegetable"]), vec!["vegetable"]);
    }

    #[test]
    fn unmatched_labels_fall_into_buckets_or_drop() {
        assert_eq!(names(&["roast lamb"]), vec!["meat"]);
        assert_eq!(names(&["whole wheat"]), vec!["grain"]);
        assert!(names(&["tableware", "green", ""]).is_empty());
    }

    #[test]
    fn blank_label_never_matches() {
        assert!(match_label("   ").is_none());
    }

    #[test]
    fn ranges_are_ordered_and_non_negative() {
        let all = FOOD_PROFILES
            .iter()
            .chain(FALLBACK_BUCKETS.iter().map(|b| &b.profile));
        for food in all {
            for (lo, hi) in [food.calories, food.protein, food.carbs, food.fat] {
                assert!(lo >= 0.0 && lo <= hi, "{} has a bad range", food.name);
            }
        }
    }
}
