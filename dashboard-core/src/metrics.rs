use crate::incidents::Snapshot;
use crate::risk::RiskLevel;
use serde::Serialize;
use std::collections::BTreeMap;

/// Aggregates shown next to the incident table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DerivedMetrics {
    pub total: usize,
    pub ai_ratio: u8,
    pub by_level: BTreeMap<RiskLevel, usize>,
}

impl DerivedMetrics {
    pub fn compute(snapshot: &Snapshot, ai_marker: &str) -> Self {
        let mut by_level = BTreeMap::new();
        for incident in snapshot.iter() {
            *by_level.entry(incident.risk_level()).or_insert(0) += 1;
        }
        Self {
            total: snapshot.len(),
            ai_ratio: ai_ratio(snapshot, ai_marker),
            by_level,
        }
    }

    pub fn count(&self, level: RiskLevel) -> usize {
        self.by_level.get(&level).copied().unwrap_or(0)
    }
}

/// Percentage (rounded half up) of incidents whose `raw_data.source`
/// contains `marker`. Zero for an empty snapshot.
pub fn ai_ratio(snapshot: &Snapshot, marker: &str) -> u8 {
    let total = snapshot.len();
    if total == 0 {
        return 0;
    }
    let ai = snapshot
        .iter()
        .filter(|incident| incident.is_ai_sourced(marker))
        .count();
    let percent = (ai * 100 + total / 2) / total;
    u8::try_from(percent).unwrap_or(100)
}

/// Memoizes [`DerivedMetrics`] on snapshot identity.
#[derive(Debug)]
pub struct MetricsCache {
    ai_marker: String,
    last: Option<(Snapshot, DerivedMetrics)>,
}

impl MetricsCache {
    pub fn new(ai_marker: impl Into<String>) -> Self {
        Self {
            ai_marker: ai_marker.into(),
            last: None,
        }
    }

    pub fn get(&mut self, snapshot: &Snapshot) -> &DerivedMetrics {
        if matches!(&self.last, Some((seen, _)) if !seen.same_as(snapshot)) {
            self.last = None;
        }
        let marker = &self.ai_marker;
        let (_, metrics) = self
            .last
            .get_or_insert_with(|| (snapshot.clone(), DerivedMetrics::compute(snapshot, marker)));
        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(value: serde_json::Value) -> Snapshot {
        Snapshot::from_json(value).expect("array of objects")
    }

    #[test]
    fn half_ai_snapshot_reports_fifty() {
        let s = snapshot(json!([
            {"raw_data": {"source": "AI", "cmd": "rm x"}},
            {"raw_data": {"source": "human", "cmd": ""}}
        ]));
        assert_eq!(ai_ratio(&s, "AI"), 50);
    }

    #[test]
    fn empty_snapshot_is_zero() {
        assert_eq!(ai_ratio(&Snapshot::default(), "AI"), 0);
        assert_eq!(DerivedMetrics::compute(&Snapshot::default(), "AI").total, 0);
    }

    #[test]
    fn marker_is_a_substring_match() {
        let s = snapshot(json!([
            {"raw_data": {"source": "AI (tinyllama)"}},
            {"raw_data": {"source": "Local Dictionary"}},
            {"raw_data": {}},
        ]));
        assert_eq!(ai_ratio(&s, "AI"), 33);
    }

    #[test]
    fn rounds_half_up_and_stays_in_range() {
        let mut items = Vec::new();
        for n in 0..8 {
            let source = if n < 1 { "AI" } else { "Rules" };
            items.push(json!({"raw_data": {"source": source}}));
            let s = snapshot(serde_json::Value::Array(items.clone()));
            let ratio = ai_ratio(&s, "AI");
            assert!(ratio <= 100);
            let expected = (100.0 / items.len() as f64).round() as u8;
            assert_eq!(ratio, expected, "with {} incidents", items.len());
        }
        let all_ai = snapshot(json!([{"raw_data": {"source": "AI"}}]));
        assert_eq!(ai_ratio(&all_ai, "AI"), 100);
    }

    #[test]
    fn counts_per_risk_level() {
        let s = snapshot(json!([
            {"risk_score": 95},
            {"risk_score": 91},
            {"risk_score": 75},
            {"risk_score": 10},
            {}
        ]));
        let metrics = DerivedMetrics::compute(&s, "AI");
        assert_eq!(metrics.total, 5);
        assert_eq!(metrics.count(RiskLevel::Critical), 2);
        assert_eq!(metrics.count(RiskLevel::High), 1);
        assert_eq!(metrics.count(RiskLevel::Medium), 0);
        assert_eq!(metrics.count(RiskLevel::Low), 2);
    }

    #[test]
    fn cache_recomputes_only_on_new_snapshot() {
        let mut cache = MetricsCache::new("AI");
        let first = snapshot(json!([{"raw_data": {"source": "AI"}}]));
        assert_eq!(cache.get(&first).ai_ratio, 100);
        assert_eq!(cache.get(&first.clone()).ai_ratio, 100);

        let second = snapshot(json!([{"raw_data": {"source": "human"}}]));
        assert_eq!(cache.get(&second).ai_ratio, 0);
    }
}
