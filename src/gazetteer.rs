//! # Gazetteer Store
//! Static, ordered lookup tables used by the classifier, the geo extractor and
//! the risk aggregator. Pure data plus one traversal helper.
//!
//! Every table is scanned front to back and the first matching entry wins.
//! Overlapping names between entries are therefore resolved purely by table
//! order; [`collisions`] lists those overlaps for diagnostics without changing
//! how matching works.

use serde::Serialize;

/// Ordered `(key, value)` table with a deterministic front-to-back traversal.
#[derive(Debug, Clone, Copy)]
pub struct OrderedTable<'a, K, V> {
    entries: &'a [(K, V)],
}

impl<'a, K, V> OrderedTable<'a, K, V> {
    pub const fn new(entries: &'a [(K, V)]) -> Self {
        Self { entries }
    }

    pub fn iter(&self) -> std::slice::Iter<'a, (K, V)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry (in table order) accepted by `pred`.
    pub fn first_match<P>(&self, mut pred: P) -> Option<&'a (K, V)>
    where
        P: FnMut(&K, &V) -> bool,
    {
        self.entries.iter().find(|(k, v)| pred(k, v))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

const fn at(lat: f64, lon: f64) -> Coord {
    Coord { lat, lon }
}

/// Country → name/city variants. Matched case-sensitively against the raw
/// title (short tokens like `US` and `UK` rely on that).
pub static COUNTRY_KEYWORDS: OrderedTable<'static, &str, &[&str]> =
    OrderedTable::new(COUNTRY_ENTRIES);

const COUNTRY_ENTRIES: &[(&str, &[&str])] = &[
    (
        "Canada",
        &[
            "Canada", "Canadian", "Toronto", "Vancouver", "Brampton", "Surrey", "Ontario",
            "Trudeau", "Khalistan", "Alberta", "Mississauga", "Edmonton",
        ],
    ),
    (
        "USA",
        &[
            "USA", "US", "America", "American", "New York", "California", "Texas", "Chicago",
            "Seattle", "Ohio", "Purdue", "Jersey", "Dallas", "San Francisco", "Atlanta",
            "Boston", "Washington",
        ],
    ),
    (
        "UK",
        &[
            "UK", "United Kingdom", "British", "London", "Leicester", "Birmingham", "England",
            "Scotland", "Manchester", "Leeds",
        ],
    ),
    (
        "Australia",
        &[
            "Australia", "Australian", "Sydney", "Melbourne", "Canberra", "Brisbane", "Perth",
            "Adelaide",
        ],
    ),
    ("Germany", &["Germany", "German", "Berlin", "Frankfurt", "Munich", "Hamburg"]),
    ("Ukraine", &["Ukraine", "Kyiv", "Kharkiv", "Odessa"]),
    ("Russia", &["Russia", "Moscow", "St. Petersburg"]),
    ("Israel", &["Israel", "Tel Aviv", "Jerusalem", "Haifa"]),
    ("UAE", &["UAE", "Dubai", "Abu Dhabi", "Emirates", "Sharjah"]),
    ("Saudi Arabia", &["Saudi", "Riyadh", "Jeddah", "Mecca"]),
    ("Qatar", &["Qatar", "Doha"]),
    ("Kuwait", &["Kuwait"]),
    ("Singapore", &["Singapore"]),
    ("Malaysia", &["Malaysia", "Kuala Lumpur"]),
    ("New Zealand", &["New Zealand", "Auckland", "Kiwi", "Christchurch"]),
    ("Italy", &["Italy", "Italian", "Milan", "Rome", "Latina"]),
    ("Poland", &["Poland", "Polish", "Warsaw"]),
    ("France", &["France", "French", "Paris"]),
    ("Bangladesh", &["Bangladesh", "Dhaka", "Chittagong"]),
    ("Oman", &["Oman", "Muscat"]),
    ("Bahrain", &["Bahrain", "Manama"]),
];

/// Lowercase place names → coordinates, matched against the lowercased title.
pub static CITY_COORDS: OrderedTable<'static, &str, Coord> = OrderedTable::new(CITY_ENTRIES);

const CITY_ENTRIES: &[(&str, Coord)] = &[
    // India
    ("delhi", at(28.61, 77.20)),
    ("new delhi", at(28.61, 77.20)),
    ("mumbai", at(19.07, 72.87)),
    ("bengaluru", at(12.97, 77.59)),
    ("bangalore", at(12.97, 77.59)),
    ("hyderabad", at(17.38, 78.48)),
    ("ladakh", at(34.15, 77.57)),
    ("galwan", at(34.75, 78.28)),
    ("arunachal", at(28.21, 94.72)),
    ("kashmir", at(34.08, 74.79)),
    ("srinagar", at(34.08, 74.79)),
    ("punjab", at(31.14, 75.34)),
    ("gujarat", at(23.02, 72.57)),
    // US
    ("washington", at(38.90, -77.03)),
    ("new york", at(40.71, -74.00)),
    ("silicon valley", at(37.38, -122.08)),
    ("san francisco", at(37.77, -122.41)),
    ("california", at(36.77, -119.41)),
    ("texas", at(31.00, -100.00)),
    // China
    ("beijing", at(39.90, 116.40)),
    ("shanghai", at(31.23, 121.47)),
    // Global
    ("london", at(51.50, -0.12)),
    ("canada", at(56.13, -106.34)),
    ("toronto", at(43.65, -79.38)),
    ("vancouver", at(49.28, -123.12)),
    ("ukraine", at(48.37, 31.16)),
    ("russia", at(61.52, 105.31)),
    ("moscow", at(55.75, 37.61)),
    ("israel", at(31.04, 34.85)),
    ("gaza", at(31.35, 34.30)),
    ("dubai", at(25.20, 55.27)),
];

/// Severity 3 terms (death, assault, violent crime).
pub const CRITICAL_KEYWORDS: &[&str] = &[
    "killed",
    "dead",
    "murder",
    "attacked",
    "violence",
    "assault",
    "stabbed",
    "shot",
    "mob",
    "lynch",
    "kidnap",
    "death penalty",
    "execution",
];

/// Severity 2 terms (discrimination, threat, detention, protest).
pub const HIGH_KEYWORDS: &[&str] = &[
    "hate",
    "racism",
    "racist",
    "slur",
    "discrimination",
    "vandalism",
    "temple",
    "deport",
    "visa",
    "threat",
    "protest",
    "agitation",
    "arrested",
    "detained",
    "job loss",
];

/// Any of these in a headline marks the record high priority.
pub const URGENT_KEYWORDS: &[&str] = &[
    "alert",
    "crisis",
    "war",
    "urgent",
    "breaking",
    "nuclear",
    "attack",
    "sanction",
    "killed",
    "death",
    "racist",
    "hate",
    "student death",
    "assault",
    "violation",
    "mob",
    "lynch",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HotspotKind {
    Conflict,
    Diplomacy,
    Tech,
    Economic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HotspotStatus {
    Active,
    Monitoring,
    Critical,
}

/// Fixed map annotation shown alongside live markers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hotspot {
    pub id: &'static str,
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
    pub kind: HotspotKind,
    pub description: &'static str,
    pub status: HotspotStatus,
}

const fn hotspot(
    id: &'static str,
    name: &'static str,
    lat: f64,
    lon: f64,
    kind: HotspotKind,
    description: &'static str,
    status: HotspotStatus,
) -> Hotspot {
    Hotspot {
        id,
        name,
        lat,
        lon,
        kind,
        description,
        status,
    }
}

pub const STATIC_HOTSPOTS: &[Hotspot] = &[
    hotspot("lac", "Ladakh (LAC)", 34.15, 77.57, HotspotKind::Conflict, "China-India Border Standoff", HotspotStatus::Critical),
    hotspot("scs", "South China Sea", 12.0, 113.0, HotspotKind::Conflict, "Maritime Territorial Disputes", HotspotStatus::Critical),
    hotspot("sv", "Silicon Valley", 37.38, -122.08, HotspotKind::Tech, "Global AI Innovation Hub", HotspotStatus::Monitoring),
    hotspot("dc", "Washington DC", 38.90, -77.03, HotspotKind::Diplomacy, "US Foreign Policy Center", HotspotStatus::Active),
    hotspot("del", "New Delhi", 28.61, 77.20, HotspotKind::Diplomacy, "Indian Government", HotspotStatus::Active),
    hotspot("bei", "Beijing", 39.90, 116.40, HotspotKind::Diplomacy, "Chinese Government", HotspotStatus::Active),
    hotspot("ukr", "Ukraine Front", 48.0, 37.0, HotspotKind::Conflict, "Active Conflict Zone", HotspotStatus::Critical),
    hotspot("guj", "Gujarat", 23.0, 72.5, HotspotKind::Economic, "Strategic Trade & Port Hub", HotspotStatus::Monitoring),
];

/// One name that is a substring of another entry's name. The entry scanned
/// first decides which owner a title containing `longer` is attributed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub shorter: &'static str,
    pub shorter_owner: &'static str,
    pub longer: &'static str,
    pub longer_owner: &'static str,
    /// True when `shorter_owner` is scanned before `longer_owner`, i.e. the
    /// shorter name shadows the longer one.
    pub shadows: bool,
}

fn find_collisions(
    names: &[(&'static str, &'static str)],
    case_sensitive: bool,
) -> Vec<Collision> {
    let fold = |s: &str| {
        if case_sensitive {
            s.to_string()
        } else {
            s.to_lowercase()
        }
    };

    let mut out = Vec::new();
    for (i, &(owner_a, a)) in names.iter().enumerate() {
        for (j, &(owner_b, b)) in names.iter().enumerate() {
            if i == j || owner_a == owner_b || a.len() >= b.len() {
                continue;
            }
            if fold(b).contains(fold(a).as_str()) {
                let first_a = names.iter().position(|(o, _)| *o == owner_a);
                let first_b = names.iter().position(|(o, _)| *o == owner_b);
                out.push(Collision {
                    shorter: a,
                    shorter_owner: owner_a,
                    longer: b,
                    longer_owner: owner_b,
                    shadows: first_a < first_b,
                });
            }
        }
    }
    out
}

/// Cross-entry overlaps in both gazetteers (countries, then cities).
pub fn collisions() -> Vec<Collision> {
    let countries: Vec<(&'static str, &'static str)> = COUNTRY_KEYWORDS
        .iter()
        .flat_map(|(country, variants)| variants.iter().map(move |v| (*country, *v)))
        .collect();
    let cities: Vec<(&'static str, &'static str)> =
        CITY_COORDS.iter().map(|(name, _)| (*name, *name)).collect();

    let mut out = find_collisions(&countries, true);
    out.extend(find_collisions(&cities, false));
    out
}
