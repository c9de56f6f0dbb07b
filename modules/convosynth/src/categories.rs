use crate::knowledge_base::KnowledgeBase;

/// Coarse bucket used for weighting. Raw knowledge base keys map onto these
/// through a fixed, case-insensitive membership table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryGroup {
    Mosque,
    Restaurant,
    Mall,
    Hotel,
    AtmExchange,
    Other,
}

const MOSQUE_CATEGORIES: &[&str] = &["mosque", "mosques"];
const RESTAURANT_CATEGORIES: &[&str] = &[
    "restaurant",
    "restaurants",
    "restaurants_cafes_bars",
    "restaurants_cafes",
    "cafes",
    "bars",
];
const MALL_CATEGORIES: &[&str] = &["mall", "malls"];
const HOTEL_CATEGORIES: &[&str] = &["hotel", "hotels"];
const ATM_EXCHANGE_CATEGORIES: &[&str] = &[
    "atm",
    "atms",
    "money_exchange",
    "atms_money_exchanges",
    "atms_money_exchange",
];

impl CategoryGroup {
    pub fn of(category: &str) -> Self {
        let key = category.to_lowercase();
        let key = key.as_str();
        if MOSQUE_CATEGORIES.contains(&key) {
            Self::Mosque
        } else if RESTAURANT_CATEGORIES.contains(&key) {
            Self::Restaurant
        } else if MALL_CATEGORIES.contains(&key) {
            Self::Mall
        } else if HOTEL_CATEGORIES.contains(&key) {
            Self::Hotel
        } else if ATM_EXCHANGE_CATEGORIES.contains(&key) {
            Self::AtmExchange
        } else {
            Self::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mosque => "mosque",
            Self::Restaurant => "restaurant",
            Self::Mall => "mall",
            Self::Hotel => "hotel",
            Self::AtmExchange => "atm_exchange",
            Self::Other => "other",
        }
    }

    /// Per-category weight outside the special period's day and night spans.
    pub fn regular_weight(&self) -> u32 {
        match self {
            Self::Mosque => 6,
            Self::Restaurant => 2,
            Self::Mall => 3,
            Self::Hotel => 2,
            Self::AtmExchange => 2,
            Self::Other => 1,
        }
    }
}

impl std::fmt::Display for CategoryGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Categories that have at least one place, bucketed by group. Both the group
/// order and the category order within a group follow first appearance in the
/// knowledge base.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedCategories {
    groups: Vec<(CategoryGroup, Vec<String>)>,
}

impl GroupedCategories {
    pub fn from_knowledge_base(kb: &KnowledgeBase) -> Self {
        let mut grouped = Self::default();
        for (category, places) in kb.iter() {
            if !places.is_empty() {
                grouped.insert(category);
            }
        }
        grouped
    }

    pub fn insert(&mut self, category: &str) {
        let group = CategoryGroup::of(category);
        let idx = match self.groups.iter().position(|(g, _)| *g == group) {
            Some(idx) => idx,
            None => {
                self.groups.push((group, Vec::new()));
                self.groups.len() - 1
            }
        };
        let members = &mut self.groups[idx].1;
        if !members.iter().any(|c| c == category) {
            members.push(category.to_string());
        }
    }

    pub fn get(&self, group: CategoryGroup) -> &[String] {
        self.groups
            .iter()
            .find(|(g, _)| *g == group)
            .map(|(_, members)| members.as_slice())
            .unwrap_or(&[])
    }

    /// Groups with at least one category, in first-appearance order.
    pub fn available_groups(&self) -> impl Iterator<Item = CategoryGroup> + '_ {
        self.groups
            .iter()
            .filter(|(_, members)| !members.is_empty())
            .map(|(g, _)| *g)
    }

    pub fn all_categories(&self) -> Vec<&str> {
        self.groups
            .iter()
            .flat_map(|(_, members)| members.iter().map(String::as_str))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|(_, members)| members.is_empty())
    }
}
