use chrono::NaiveDateTime;
use convosynth_common::Place;
use rand::Rng;

use crate::calendar::{SpecialPeriods, TimeContext};
use crate::categories::CategoryGroup;
use crate::weighted::choose;

/// Stand-in when a place has no name.
pub const UNNAMED_PLACE: &str = "this location";

const NAME_PLACEHOLDER: &str = "{name}";

pub const GENERIC_TEMPLATES: &[&str] = &[
    "How do I get from Al Jafiliya bus stop to {name}?",
    "Which bus should I take from Al Jafiliya to reach {name}?",
    "I am at Al Jafiliya bus stop. What is the best bus route to {name}?",
    "Can you suggest a bus route from Al Jafiliya to {name}?",
    "Need directions by bus from Al Jafiliya to {name}.",
];

pub const MOSQUE_DAYTIME_TEMPLATES: &[&str] = &[
    "I need a nearby mosque for dhuhr. How do I get to {name} from Al Jafiliya?",
    "Is {name} the closest mosque? What bus should I take from Al Jafiliya?",
    "Looking for a mosque for daytime prayers. How do I reach {name} by bus?",
];

pub const MOSQUE_NIGHTTIME_TEMPLATES: &[&str] = &[
    "I want to go to taraweeh at {name}. Which bus should I take?",
    "How do I get from Al Jafiliya to {name} for night prayers?",
    "Is there a bus route to {name} for taraweeh tonight?",
];

pub const LATE_NIGHT_FOOD_TEMPLATES: &[&str] = &[
    "Any iftar places near {name}? How do I reach it by bus?",
    "I am looking for a late dinner near {name}. Which bus should I take?",
    "Is {name} open late? How do I get there from Al Jafiliya?",
];

/// Template pool for a category at a given time context.
pub fn template_pool(category: &str, context: TimeContext) -> &'static [&'static str] {
    let group = CategoryGroup::of(category);
    match (context, group) {
        (TimeContext::SpecialDaytime, CategoryGroup::Mosque) => MOSQUE_DAYTIME_TEMPLATES,
        // Mosque questions in the 02:01-04:59 gap still read as night prayers.
        (TimeContext::SpecialNighttime | TimeContext::SpecialGap, CategoryGroup::Mosque) => {
            MOSQUE_NIGHTTIME_TEMPLATES
        }
        (TimeContext::SpecialNighttime, CategoryGroup::Restaurant) => LATE_NIGHT_FOOD_TEMPLATES,
        _ => GENERIC_TEMPLATES,
    }
}

/// Render a commuter question about `place`.
pub fn render_question<R: Rng + ?Sized>(
    rng: &mut R,
    category: &str,
    place: &Place,
    timestamp: NaiveDateTime,
    periods: &SpecialPeriods,
) -> String {
    let pool = template_pool(category, periods.context(timestamp));
    let template = choose(rng, pool).copied().unwrap_or(GENERIC_TEMPLATES[0]);
    let name = place.name.as_deref().unwrap_or(UNNAMED_PLACE);
    template.replace(NAME_PLACEHOLDER, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn at(m: u32, d: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, m, d)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn rendered_from(pool: &[&str], question: &str, name: &str) -> bool {
        pool.iter().any(|t| t.replace(NAME_PLACEHOLDER, name) == question)
    }

    #[test]
    fn pool_selection() {
        assert_eq!(template_pool("mosques", TimeContext::SpecialDaytime), MOSQUE_DAYTIME_TEMPLATES);
        assert_eq!(template_pool("Mosque", TimeContext::SpecialNighttime), MOSQUE_NIGHTTIME_TEMPLATES);
        assert_eq!(template_pool("mosques", TimeContext::SpecialGap), MOSQUE_NIGHTTIME_TEMPLATES);
        assert_eq!(template_pool("mosques", TimeContext::Regular), GENERIC_TEMPLATES);
        assert_eq!(template_pool("cafes", TimeContext::SpecialNighttime), LATE_NIGHT_FOOD_TEMPLATES);
        assert_eq!(template_pool("cafes", TimeContext::SpecialDaytime), GENERIC_TEMPLATES);
        assert_eq!(template_pool("cafes", TimeContext::SpecialGap), GENERIC_TEMPLATES);
        assert_eq!(template_pool("hotels", TimeContext::SpecialNighttime), GENERIC_TEMPLATES);
    }

    #[test]
    fn fills_place_name() {
        let periods = SpecialPeriods::ramadan();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let place = Place::named("Al Jafiliya Mosque");
        for _ in 0..20 {
            let q = render_question(&mut rng, "mosques", &place, at(3, 12, 13, 0), &periods);
            assert!(rendered_from(MOSQUE_DAYTIME_TEMPLATES, &q, "Al Jafiliya Mosque"), "{q}");
        }
    }

    #[test]
    fn late_night_restaurant_question() {
        let periods = SpecialPeriods::ramadan();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let place = Place::named("Karak House");
        let q = render_question(&mut rng, "restaurants_cafes", &place, at(3, 12, 23, 45), &periods);
        assert!(rendered_from(LATE_NIGHT_FOOD_TEMPLATES, &q, "Karak House"), "{q}");
    }

    #[test]
    fn unnamed_place_uses_fallback_phrase() {
        let periods = SpecialPeriods::ramadan();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let q = render_question(&mut rng, "malls", &Place::default(), at(6, 1, 10, 0), &periods);
        assert!(q.contains(UNNAMED_PLACE), "{q}");
        assert!(rendered_from(GENERIC_TEMPLATES, &q, UNNAMED_PLACE));
    }

    #[test]
    fn every_template_has_one_placeholder() {
        for pool in [
            GENERIC_TEMPLATES,
            MOSQUE_DAYTIME_TEMPLATES,
            MOSQUE_NIGHTTIME_TEMPLATES,
            LATE_NIGHT_FOOD_TEMPLATES,
        ] {
            for t in pool {
                assert_eq!(t.matches(NAME_PLACEHOLDER).count(), 1, "{t}");
            }
        }
    }
}
