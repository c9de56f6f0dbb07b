//! Dataset report: aggregate views over a generated batch (traffic by day and
//! hour, category mix, busiest destinations, bus routes mentioned in answers,
//! most recent conversations).

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use convosynth_common::Conversation;
use regex::Regex;
use serde::Serialize;

use crate::categories::CategoryGroup;
use crate::knowledge_base::KnowledgeBase;

const TOP_N: usize = 10;

// =============================================================================
// Bus route extraction
// =============================================================================

static RE_BUS_OR_ROUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:bus|route)\s*(?:number|no\.?|#)?\s*([0-9]{1,3}[a-zA-Z]?)(?:\s*(?:and|or|,)\s*([0-9]{1,3}[a-zA-Z]?))?",
    )
    .unwrap()
});
static RE_NUMBER_N_BUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bnumber\s*([0-9]{1,3}[a-zA-Z]?)\s*bus\b").unwrap());
static RE_N_BUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b([0-9]{1,3}[a-zA-Z]?)\s*bus\b").unwrap());
static RE_SENTENCE_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\n.!?]+").unwrap());
static RE_BARE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,3}[a-zA-Z]?\b").unwrap());

/// Words that, directly before a number, mark it as a stop rather than a route.
const STOP_WORDS: &[&str] = &["stop", "station"];

/// Words that, directly after a number, mark it as a quantity.
const UNIT_WORDS: &[&str] = &[
    "minute", "minutes", "min", "mins", "meter", "meters", "m", "km", "kilometer", "kilometers",
    "kilometre", "kilometres", "hour", "hours",
];

fn push_unique(routes: &mut Vec<String>, value: &str) {
    let value = value.to_uppercase();
    if !routes.contains(&value) {
        routes.push(value);
    }
}

fn lowercase_word(word: Option<&str>) -> String {
    word.unwrap_or_default().to_lowercase()
}

/// Bus route identifiers mentioned in an answer, upper-cased, in first-seen
/// order. Explicit "bus 12" / "route 12" / "12 bus" phrasings win; otherwise
/// bare numbers in sentences mentioning "bus" are taken unless they read as
/// a stop number or a distance/duration.
pub fn extract_bus_routes(text: &str) -> Vec<String> {
    let mut routes = Vec::new();
    if text.is_empty() {
        return routes;
    }

    for re in [&*RE_BUS_OR_ROUTE, &*RE_NUMBER_N_BUS, &*RE_N_BUS] {
        for caps in re.captures_iter(text) {
            for m in caps.iter().skip(1).flatten() {
                push_unique(&mut routes, m.as_str());
            }
        }
    }
    if !routes.is_empty() {
        return routes;
    }

    for segment in RE_SENTENCE_BREAK.split(text) {
        if !segment.to_lowercase().contains("bus") {
            continue;
        }
        for m in RE_BARE_NUMBER.find_iter(segment) {
            let before = segment[..m.start()].trim();
            let after = segment[m.end()..].trim();
            let prev_word = lowercase_word(before.split_whitespace().last());
            let next_word = lowercase_word(after.split_whitespace().next());
            if STOP_WORDS.contains(&prev_word.as_str()) || UNIT_WORDS.contains(&next_word.as_str()) {
                continue;
            }
            push_unique(&mut routes, m.as_str());
        }
    }
    routes
}

// =============================================================================
// Report
// =============================================================================

/// Hub all generated questions start from.
pub const HUB: &str = "Al Jafiliya";

const RECENT_N: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationSummary {
    pub location: String,
    /// Most frequent category for this location.
    pub category: String,
    pub volume: usize,
    pub avg_latency_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteCount {
    pub route: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub weight: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Spoke {
    pub label: String,
    pub value: usize,
}

/// Destinations reached from the hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HubSpoke {
    pub hub: String,
    pub spokes: Vec<Spoke>,
}

/// Hourly series for the groups whose demand shifts most across the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryHourly {
    pub restaurants: [usize; 24],
    pub atm_exchange: [usize; 24],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetReport {
    pub total: usize,
    pub answered: usize,
    /// Percentage of conversations with a non-empty answer, rounded.
    pub answer_rate: u32,
    pub unique_locations: usize,
    /// `"YYYY-MM-DD HH:MM:SS"` of the latest conversation.
    pub last_updated: Option<String>,
    pub by_date: BTreeMap<String, usize>,
    pub by_hour: [usize; 24],
    /// Busiest hour; the earliest wins ties.
    pub peak_hour: Option<usize>,
    pub category_hourly: CategoryHourly,
    pub by_category: BTreeMap<String, usize>,
    pub top_locations: Vec<LocationSummary>,
    pub top_routes: Vec<RouteCount>,
    pub hub_spoke: HubSpoke,
    pub heatmap: Vec<HeatmapPoint>,
    /// Latest conversations first.
    pub recent_conversations: Vec<Conversation>,
}

/// Counts in first-seen order, so ties sort stably by first appearance.
struct OrderedCounts {
    keys: Vec<String>,
    counts: HashMap<String, usize>,
}

impl OrderedCounts {
    fn new() -> Self {
        Self {
            keys: Vec::new(),
            counts: HashMap::new(),
        }
    }

    fn add(&mut self, key: &str) {
        match self.counts.get_mut(key) {
            Some(n) => *n += 1,
            None => {
                self.keys.push(key.to_string());
                self.counts.insert(key.to_string(), 1);
            }
        }
    }

    /// First-seen order.
    fn entries(&self) -> impl Iterator<Item = (&str, usize)> {
        self.keys.iter().map(|k| (k.as_str(), self.counts[k]))
    }

    /// Descending by count; ties keep first-seen order.
    fn ranked(&self) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self.entries().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

fn percent(part: usize, total: usize) -> u32 {
    ((part as f64 / total.max(1) as f64) * 100.0).round() as u32
}

/// Sort key `date T time`; a missing time sorts as midnight.
fn timestamp_key(conv: &Conversation) -> String {
    let time = if conv.meta.time.is_empty() {
        "00:00:00"
    } else {
        conv.meta.time.as_str()
    };
    format!("{}T{time}", conv.meta.date)
}

fn peak_hour(by_hour: &[usize; 24]) -> Option<usize> {
    let max = *by_hour.iter().max()?;
    by_hour.iter().position(|&n| n == max && n > 0)
}

impl DatasetReport {
    pub fn from_conversations(conversations: &[Conversation], kb: &KnowledgeBase) -> Self {
        let total = conversations.len();
        let answered = conversations.iter().filter(|c| c.is_answered()).count();

        let mut by_date = BTreeMap::new();
        let mut by_hour = [0usize; 24];
        let mut category_hourly = CategoryHourly {
            restaurants: [0; 24],
            atm_exchange: [0; 24],
        };
        let mut by_category = BTreeMap::new();
        let mut locations = OrderedCounts::new();
        let mut hub_locations = OrderedCounts::new();
        let mut routes = OrderedCounts::new();
        let mut location_categories: HashMap<&str, OrderedCounts> = HashMap::new();
        let mut location_latency: HashMap<&str, u64> = HashMap::new();
        let hub_marker = HUB.to_lowercase();

        for conv in conversations {
            *by_date.entry(conv.meta.date.clone()).or_insert(0) += 1;
            if let Some(hour) = conv.hour() {
                let hour = hour as usize;
                by_hour[hour] += 1;
                match CategoryGroup::of(&conv.category) {
                    CategoryGroup::Restaurant => category_hourly.restaurants[hour] += 1,
                    CategoryGroup::AtmExchange => category_hourly.atm_exchange[hour] += 1,
                    _ => {}
                }
            }
            *by_category.entry(conv.category.clone()).or_insert(0) += 1;

            let location = conv.location.as_deref().unwrap_or("");
            locations.add(location);
            location_categories
                .entry(location)
                .or_insert_with(OrderedCounts::new)
                .add(&conv.category);
            *location_latency.entry(location).or_insert(0) += conv.meta.latency_ms;

            if !location.is_empty() && conv.user_question().to_lowercase().contains(&hub_marker) {
                hub_locations.add(location);
            }

            for route in extract_bus_routes(conv.assistant_answer()) {
                routes.add(&route);
            }
        }

        let ranked_locations = locations.ranked();

        let top_locations = ranked_locations
            .iter()
            .take(TOP_N)
            .map(|&(location, volume)| {
                let latency = location_latency.get(location).copied().unwrap_or(0);
                LocationSummary {
                    location: location.to_string(),
                    category: location_categories
                        .get(location)
                        .and_then(|c| c.ranked().first().map(|(c, _)| c.to_string()))
                        .unwrap_or_else(|| "-".to_string()),
                    volume,
                    avg_latency_ms: (latency as f64 / volume.max(1) as f64).round() as u64,
                }
            })
            .collect();

        let top_routes = routes
            .ranked()
            .into_iter()
            .take(TOP_N)
            .map(|(route, count)| RouteCount {
                route: route.to_string(),
                count,
            })
            .collect();

        // Questions naming the hub drive the view; without any, fall back to
        // overall volume.
        let spokes = if hub_locations.is_empty() {
            ranked_locations.iter().take(TOP_N).copied().collect::<Vec<_>>()
        } else {
            hub_locations.ranked().into_iter().take(TOP_N).collect()
        };
        let hub_spoke = HubSpoke {
            hub: HUB.to_string(),
            spokes: spokes
                .into_iter()
                .map(|(label, value)| Spoke {
                    label: label.to_string(),
                    value,
                })
                .collect(),
        };

        let heatmap = locations
            .entries()
            .filter_map(|(location, weight)| {
                let (latitude, longitude) = kb.coordinates(location)?;
                Some(HeatmapPoint {
                    latitude,
                    longitude,
                    weight,
                })
            })
            .collect();

        let last_updated = conversations
            .iter()
            .map(timestamp_key)
            .filter(|key| key != "T00:00:00")
            .max()
            .map(|key| key.replacen('T', " ", 1));

        let mut recent: Vec<&Conversation> = conversations.iter().collect();
        recent.sort_by_cached_key(|c| std::cmp::Reverse(timestamp_key(c)));
        let recent_conversations = recent.into_iter().take(RECENT_N).cloned().collect();

        Self {
            total,
            answered,
            answer_rate: percent(answered, total),
            unique_locations: locations.keys.len(),
            last_updated,
            by_date,
            peak_hour: peak_hour(&by_hour),
            by_hour,
            category_hourly,
            by_category,
            top_locations,
            top_routes,
            hub_spoke,
            heatmap,
            recent_conversations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routes(text: &str) -> Vec<String> {
        extract_bus_routes(text)
    }

    #[test]
    fn explicit_bus_and_route_mentions() {
        assert_eq!(routes("Take bus 27 towards Satwa."), vec!["27"]);
        assert_eq!(routes("Hop on route no. 9 or the F27."), vec!["9"]);
        assert_eq!(routes("Bus number 12a and 33 both stop there."), vec!["12A", "33"]);
        assert_eq!(routes("The 61 bus is quickest."), vec!["61"]);
        assert_eq!(routes("Catch number 8 bus, or bus #8."), vec!["8"]);
    }

    #[test]
    fn fallback_skips_stops_and_quantities() {
        // "bus" appears but not adjacent to a number, so the fallback runs.
        let text = "From stop 4 the bus takes 15 minutes and look for the C1 sign or 44.";
        assert_eq!(routes(text), vec!["44"]);
    }

    #[test]
    fn fallback_compares_neighbouring_words_as_written() {
        // Trailing punctuation keeps "minutes," from matching a unit word.
        let text = "From stop 4 the bus takes 15 minutes, look for the C1 sign or 44.";
        assert_eq!(routes(text), vec!["15", "44"]);
    }

    #[test]
    fn fallback_ignores_sentences_without_bus() {
        assert!(routes("It is 300 meters away. Walk 5 minutes.").is_empty());
        assert!(routes("").is_empty());
    }

    #[test]
    fn empty_batch() {
        let report = DatasetReport::from_conversations(&[], &KnowledgeBase::default());
        assert_eq!(report.total, 0);
        assert_eq!(report.answer_rate, 0);
        assert_eq!(report.peak_hour, None);
        assert_eq!(report.last_updated, None);
        assert!(report.hub_spoke.spokes.is_empty());
        assert!(report.recent_conversations.is_empty());
    }

    #[test]
    fn peak_hour_prefers_earliest_tie() {
        let mut by_hour = [0usize; 24];
        by_hour[9] = 4;
        by_hour[20] = 4;
        assert_eq!(peak_hour(&by_hour), Some(9));
        assert_eq!(peak_hour(&[0; 24]), None);
    }
}
