//! The full rule configuration, loaded once per run and treated as
//! read-only afterwards.

use crate::errors::CoreError;
use crate::models::decision::Side;
use crate::models::rule::{RuleRef, RuleSpec};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Per-timeframe rule trees, one list per side. A side passes iff every
/// top-level entry passes (the list is an implicit all-of).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SideRules {
    #[serde(default)]
    pub long: Vec<RuleRef>,
    #[serde(default)]
    pub short: Vec<RuleRef>,
}

/// Tie-break when both sides pass on the same timeframe and no run-level
/// side hint is given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SidePriority {
    #[default]
    LongFirst,
    ShortFirst,
}

impl SidePriority {
    pub fn preferred(&self) -> Side {
        match self {
            SidePriority::LongFirst => Side::Long,
            SidePriority::ShortFirst => Side::Short,
        }
    }
}

/// Tunable bounds for execution-timeframe selection. All values are
/// configuration, never hard-coded in the selector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorThresholds {
    /// Expected reward in R-multiples required to call a setup high quality.
    pub min_r_multiple: f64,
    /// Widest entry zone (percent) still considered tight.
    pub max_entry_zone_width_pct: f64,
    /// Highest 15m ATR (basis points) still considered tight.
    pub max_atr_pct_15m_bps: f64,
    /// Minimum 5m ADX needed before dropping to the fast timeframe.
    pub adx_floor: f64,
    /// Maximum spread (basis points) tolerated on the fast timeframe.
    pub spread_bps_ceiling: f64,
}

impl Default for SelectorThresholds {
    fn default() -> Self {
        Self {
            min_r_multiple: 2.0,
            max_entry_zone_width_pct: 1.2,
            max_atr_pct_15m_bps: 120.0,
            adx_floor: 18.0,
            spread_bps_ceiling: 8.0,
        }
    }
}

fn default_context_tf() -> String {
    "15m".to_string()
}

fn default_fast_tf() -> String {
    "5m".to_string()
}

/// Execution selector configuration: mandatory guard rules plus thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Guards evaluated first; any failure vetoes execution outright.
    #[serde(default)]
    pub guards: Vec<RuleRef>,
    #[serde(default)]
    pub thresholds: SelectorThresholds,
    /// Timeframe the enriched context was built on.
    #[serde(default = "default_context_tf")]
    pub context_timeframe: String,
    /// Faster candidate timeframe.
    #[serde(default = "default_fast_tf")]
    pub fast_timeframe: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            guards: Vec::new(),
            thresholds: SelectorThresholds::default(),
            context_timeframe: default_context_tf(),
            fast_timeframe: default_fast_tf(),
        }
    }
}

fn default_cascade() -> Vec<String> {
    ["4h", "1h", "15m", "5m", "1m"].iter().map(|s| s.to_string()).collect()
}

/// The complete validation rule set.
///
/// Loaded once via [`ValidationConfig::from_json`]; a parse failure there is
/// the only fatal configuration error. Structural defects in a parseable
/// config are reported by the consistency checker instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Rule trees per timeframe and side.
    #[serde(default)]
    pub timeframes: HashMap<String, SideRules>,
    /// Named rules reusable by reference. Ordered for deterministic
    /// analysis output.
    #[serde(default)]
    pub rules: BTreeMap<String, RuleSpec>,
    /// Filters applied regardless of timeframe; any failure vetoes both
    /// sides.
    #[serde(default)]
    pub filters_mandatory: Vec<RuleRef>,
    #[serde(default)]
    pub execution_selector: SelectorConfig,
    /// Hand-maintained list of mutually exclusive rule-name pairs used by
    /// the contradiction check. Heuristic, not satisfiability analysis.
    #[serde(default)]
    pub conflict_pairs: Vec<(String, String)>,
    #[serde(default)]
    pub side_priority: SidePriority,
    /// Cascade order, slowest timeframe first.
    #[serde(default = "default_cascade")]
    pub cascade: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            timeframes: HashMap::new(),
            rules: BTreeMap::new(),
            filters_mandatory: Vec::new(),
            execution_selector: SelectorConfig::default(),
            conflict_pairs: Vec::new(),
            side_priority: SidePriority::default(),
            cascade: default_cascade(),
        }
    }
}

impl ValidationConfig {
    /// Parse the configuration from JSON. Fatal on malformed input.
    pub fn from_json(raw: &str) -> Result<Self, CoreError> {
        serde_json::from_str(raw)
            .map_err(|e| CoreError::Config(format!("invalid validation config: {e}")))
    }

    pub fn side_rules(&self, timeframe: &str) -> Option<&SideRules> {
        self.timeframes.get(timeframe)
    }

    /// Look up a named rule.
    pub fn rule(&self, name: &str) -> Option<&RuleSpec> {
        self.rules.get(name)
    }

    /// Cascade restricted to timeframes that actually have rule trees,
    /// slowest first.
    pub fn active_cascade(&self) -> Vec<String> {
        self.cascade
            .iter()
            .filter(|tf| self.timeframes.contains_key(*tf))
            .cloned()
            .collect()
    }
}
