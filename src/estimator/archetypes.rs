//! Meal archetypes used to name the overall dish.

pub struct MealArchetype {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
}

pub const MEAL_ARCHETYPES: &[MealArchetype] = &[
    MealArchetype {
        name: "Grilled Chicken Salad",
        keywords: &["chicken", "salad", "lettuce", "greens", "leaf vegetable"],
    },
    MealArchetype {
        name: "Pasta with Marinara Sauce",
        keywords: &["pasta", "spaghetti", "noodle", "tomato", "sauce"],
    },
    MealArchetype {
        name: "Avocado Toast",
        keywords: &["avocado", "toast", "bread"],
    },
    MealArchetype {
        name: "Greek Yogurt with Berries",
        keywords: &["yogurt", "berries", "berry", "granola"],
    },
    MealArchetype {
        name: "Burger and Fries",
        keywords: &["burger", "fries", "bun", "fast food"],
    },
    MealArchetype {
        name: "Salmon with Vegetables",
        keywords: &["salmon", "fish", "vegetable", "broccoli"],
    },
];

/// Fraction of an archetype's keywords found in at least one label.
fn overlap(archetype: &MealArchetype, labels: &[String]) -> f64 {
    let hits = archetype
        .keywords
        .iter()
        .filter(|kw| labels.iter().any(|label| label.contains(*kw)))
        .count();
    hits as f64 / archetype.keywords.len() as f64
}

/// Best-scoring archetype for lowercase labels; ties keep the earlier entry.
pub fn identify(labels: &[String]) -> Option<&'static str> {
    let mut best: Option<(&'static str, f64)> = None;
    for archetype in MEAL_ARCHETYPES {
        let score = overlap(archetype, labels);
        if score > 0.0 && best.map_or(true, |(_, s)| score > s) {
            best = Some((archetype.name, score));
        }
    }
    best.map(|(name, _)| name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn picks_highest_overlap() {
        let found = identify(&labels(&["hamburger", "french fries", "bun"]));
        assert_eq!(found, Some("Burger and Fries"));
    }

    #[test]
    fn none_without_overlap() {
        assert_eq!(identify(&labels(&["tableware"])), None);
        assert_eq!(identify(&[]), None);
    }
}
