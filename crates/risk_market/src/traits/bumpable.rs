//! The bumped-copy contract implemented by market objects.

use crate::market_data::{Bump, MarketDataError, PillarScenario};
use crate::types::Date;

/// A market object that can hand out perturbed copies of itself.
///
/// `Target` selects what is bumped when an object has more than one
/// quoted component (a surface parameter); it is `()` for curves.
pub trait Bumpable: Sized {
    /// Component selector.
    type Target: Copy;

    /// One copy per pillar, in pillar order, each with only that pillar
    /// shifted by `bump`. Pillars past the first one dated on or after
    /// `horizon` are omitted; that first one still interpolates into it.
    fn scenarios(
        &self,
        target: Self::Target,
        bump: &Bump,
        horizon: Option<Date>,
    ) -> Result<Vec<PillarScenario<Self>>, MarketDataError>;

    /// A single copy with every pillar shifted.
    fn parallel(
        &self,
        target: Self::Target,
        bump: &Bump,
    ) -> Result<PillarScenario<Self>, MarketDataError>;
}
