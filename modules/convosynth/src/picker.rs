use chrono::NaiveDateTime;
use rand::Rng;

use crate::calendar::{SpecialPeriods, TimeContext};
use crate::categories::{CategoryGroup, GroupedCategories};
use crate::weighted::{choose, weighted_index};

/// Group weights during special-period daytime: mosques dominate.
const SPECIAL_DAYTIME_WEIGHTS: &[(CategoryGroup, u32)] = &[
    (CategoryGroup::Mosque, 25),
    (CategoryGroup::Restaurant, 1),
    (CategoryGroup::Mall, 1),
    (CategoryGroup::Hotel, 1),
    (CategoryGroup::AtmExchange, 1),
    (CategoryGroup::Other, 1),
];

/// Group weights during special-period nighttime: food first, then prayer.
const SPECIAL_NIGHTTIME_WEIGHTS: &[(CategoryGroup, u32)] = &[
    (CategoryGroup::Restaurant, 10),
    (CategoryGroup::Mosque, 6),
    (CategoryGroup::Mall, 2),
    (CategoryGroup::Hotel, 2),
    (CategoryGroup::AtmExchange, 1),
    (CategoryGroup::Other, 1),
];

fn group_weight(table: &[(CategoryGroup, u32)], group: CategoryGroup) -> Option<u32> {
    table.iter().find(|(g, _)| *g == group).map(|(_, w)| *w)
}

/// Pick the category a commuter asks about at `timestamp`.
///
/// Returns an empty string only when no category has any place.
pub fn pick_category<R: Rng + ?Sized>(
    rng: &mut R,
    timestamp: NaiveDateTime,
    grouped: &GroupedCategories,
    periods: &SpecialPeriods,
) -> String {
    let table = match periods.context(timestamp) {
        TimeContext::SpecialDaytime => SPECIAL_DAYTIME_WEIGHTS,
        TimeContext::SpecialNighttime => SPECIAL_NIGHTTIME_WEIGHTS,
        TimeContext::Regular | TimeContext::SpecialGap => {
            return pick_weighted_category(rng, grouped);
        }
    };

    let candidates: Vec<(CategoryGroup, u32)> = grouped
        .available_groups()
        .filter_map(|group| group_weight(table, group).map(|w| (group, w)))
        .collect();
    let weights: Vec<u32> = candidates.iter().map(|(_, w)| *w).collect();
    let Some(idx) = weighted_index(rng, &weights) else {
        return String::new();
    };

    match choose(rng, grouped.get(candidates[idx].0)) {
        Some(category) => category.clone(),
        None => choose(rng, &grouped.all_categories())
            .map(|c| c.to_string())
            .unwrap_or_default(),
    }
}

/// Every category weighted individually by its group's regular weight.
fn pick_weighted_category<R: Rng + ?Sized>(rng: &mut R, grouped: &GroupedCategories) -> String {
    let categories = grouped.all_categories();
    let weights: Vec<u32> = categories
        .iter()
        .map(|c| CategoryGroup::of(c).regular_weight())
        .collect();
    weighted_index(rng, &weights)
        .map(|i| categories[i].to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashMap;

    fn at(y: i32, m: u32, d: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn grouped(categories: &[&str]) -> GroupedCategories {
        let mut g = GroupedCategories::default();
        for c in categories {
            g.insert(c);
        }
        g
    }

    fn tally(ts: NaiveDateTime, g: &GroupedCategories, draws: usize) -> HashMap<String, usize> {
        let periods = SpecialPeriods::ramadan();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut counts = HashMap::new();
        for _ in 0..draws {
            *counts.entry(pick_category(&mut rng, ts, g, &periods)).or_default() += 1;
        }
        counts
    }

    #[test]
    fn empty_grouping_yields_empty_string_in_every_context() {
        let periods = SpecialPeriods::ramadan();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let empty = GroupedCategories::default();
        for ts in [at(2025, 3, 5, 12, 0), at(2025, 3, 5, 21, 0), at(2025, 6, 5, 12, 0)] {
            assert_eq!(pick_category(&mut rng, ts, &empty, &periods), "");
        }
    }

    #[test]
    fn only_present_categories_are_returned() {
        let g = grouped(&["mosques", "restaurants_cafes", "malls", "pharmacies"]);
        for ts in [
            at(2025, 3, 5, 12, 0),
            at(2025, 3, 5, 22, 0),
            at(2025, 3, 5, 3, 30),
            at(2025, 7, 1, 9, 0),
        ] {
            for category in tally(ts, &g, 500).keys() {
                assert!(g.all_categories().contains(&category.as_str()), "{category}");
            }
        }
    }

    #[test]
    fn special_daytime_favours_mosques() {
        let g = grouped(&["mosques", "restaurants", "hotels"]);
        let counts = tally(at(2025, 3, 10, 13, 0), &g, 9_000);
        let share = counts["mosques"] as f64 / 9_000.0;
        // 25 / (25 + 1 + 1)
        assert!((share - 25.0 / 27.0).abs() < 0.02, "share was {share}");
    }

    #[test]
    fn special_nighttime_favours_restaurants() {
        let g = grouped(&["mosques", "restaurants", "hotels"]);
        let counts = tally(at(2025, 3, 10, 20, 0), &g, 9_000);
        let share = counts["restaurants"] as f64 / 9_000.0;
        // 10 / (10 + 6 + 2)
        assert!((share - 10.0 / 18.0).abs() < 0.03, "share was {share}");
    }

    #[test]
    fn regular_time_weights_each_category() {
        // Two restaurant categories at 2 each, one mall at 3.
        let g = grouped(&["cafes", "restaurants", "malls"]);
        let counts = tally(at(2025, 8, 1, 10, 0), &g, 14_000);
        let mall_share = counts["malls"] as f64 / 14_000.0;
        assert!((mall_share - 3.0 / 7.0).abs() < 0.03, "share was {mall_share}");
        assert!(counts.contains_key("cafes") && counts.contains_key("restaurants"));
    }

    #[test]
    fn gap_uses_regular_weighting() {
        // In the gap, an "other" category still competes at weight 1 against
        // mosques at 6, unlike the 25:1 daytime table.
        let g = grouped(&["mosques", "pharmacies"]);
        let counts = tally(at(2025, 3, 10, 3, 0), &g, 7_000);
        let share = counts["mosques"] as f64 / 7_000.0;
        assert!((share - 6.0 / 7.0).abs() < 0.02, "share was {share}");
    }

    #[test]
    fn single_mosque_category_always_chosen_in_special_daytime() {
        let g = grouped(&["mosques"]);
        let counts = tally(at(2025, 3, 4, 12, 0), &g, 200);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts["mosques"], 200);
    }
}
