//! Trades: an instrument plus identity and reporting tags.

use std::collections::BTreeMap;

use super::ids::TradeId;
use super::instrument::Instrument;

/// A booked position.
#[derive(Clone, Debug, PartialEq)]
pub struct Trade {
    id: TradeId,
    instrument: Instrument,
    tags: BTreeMap<String, String>,
}

impl Trade {
    /// Creates an untagged trade.
    pub fn new(id: impl Into<TradeId>, instrument: Instrument) -> Self {
        Self {
            id: id.into(),
            instrument,
            tags: BTreeMap::new(),
        }
    }

    /// Adds a reporting tag such as `Book` or `Desk`.
    pub fn with_tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(name.into(), value.into());
        self
    }

    /// Trade identifier.
    #[inline]
    pub fn id(&self) -> &TradeId {
        &self.id
    }

    /// Instrument terms.
    #[inline]
    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    /// Tag value, if set.
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }

    /// All tags.
    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }
}
