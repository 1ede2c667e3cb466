//! Column names shared by price cubes, Greek cubes and reports.

/// Trade identifier.
pub const TRADE_ID: &str = "TradeId";
/// Instrument type.
pub const TRADE_TYPE: &str = "TradeType";
/// Display form of the bumped [`RiskFactorId`](crate::scenarios::RiskFactorId).
pub const RISK_FACTOR_ID: &str = "RiskFactorId";
/// Label of the bumped pillar.
pub const PILLAR_LABEL: &str = "PillarLabel";
/// Metric name, e.g. `Delta` or `Gamma`.
pub const METRIC: &str = "Metric";
/// Adapter that produced a row in a composite report.
pub const METRIC_GROUP: &str = "MetricGroup";
/// Valuation date run tag.
pub const VALUATION_DATE: &str = "ValuationDate";

/// Fixed leading columns of every Greek cube.
pub const GREEK_COLUMNS: [&str; 5] = [TRADE_ID, TRADE_TYPE, RISK_FACTOR_ID, PILLAR_LABEL, METRIC];

/// Deterministic row order of a Greek cube.
pub const GREEK_SORT_ORDER: [&str; 4] = [RISK_FACTOR_ID, PILLAR_LABEL, TRADE_ID, METRIC];
