//! Closed-form reference pricer.

use risk_cube::ResultCube;
use risk_market::market_data::MarketModel;
use risk_market::types::{Currency, Date};

use super::distributions::norm_cdf;
use super::{price_schema, PortfolioPricer, PricingError};
use crate::portfolio::{Instrument, OptionType, Trade};

/// Below this total volatility an option is valued at intrinsic.
const MIN_STD_DEV: f64 = 1e-12;

/// Analytic pricer for the reference instrument set.
///
/// - Forward: `units · (F(T) − K) · DF(T)`
/// - European option: Black-76 on `F(T)` with smile vol from the surface
/// - FX forward: `N · (S · DF_for(T) − K · DF_dom(T))` in domestic currency
/// - Zero-coupon bond: `N · DF(T)`
///
/// Every value is converted into the reporting currency at spot.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnalyticPricer;

impl AnalyticPricer {
    /// Creates the pricer.
    pub fn new() -> Self {
        Self
    }

    /// Value of one trade in `reporting_ccy`.
    pub fn price_trade(
        &self,
        trade: &Trade,
        model: &MarketModel,
        reporting_ccy: Currency,
    ) -> Result<f64, PricingError> {
        let asof = model.valuation_date();
        let local = match trade.instrument() {
            Instrument::Forward {
                underlying,
                discount_curve,
                delivery,
                strike,
                units,
                ..
            } => {
                let forward = model.curve(underlying)?.price(*delivery)?;
                let df = model.curve(discount_curve)?.discount_factor(asof, *delivery)?;
                units * (forward - strike) * df
            }
            Instrument::EuropeanOption {
                underlying,
                surface,
                discount_curve,
                expiry,
                strike,
                units,
                option_type,
                ..
            } => {
                let forward = model.curve(underlying)?.price(*expiry)?;
                let df = model.curve(discount_curve)?.discount_factor(asof, *expiry)?;
                let vol = model.surface(surface)?.vol(*expiry, *strike, forward);
                units * df * black76(forward, *strike, vol, asof, *expiry, *option_type)
            }
            Instrument::FxForward {
                foreign,
                domestic,
                foreign_curve,
                domestic_curve,
                delivery,
                strike,
                notional,
            } => {
                let spot = model.fx_rate(*foreign, *domestic)?;
                let df_for = model.curve(foreign_curve)?.discount_factor(asof, *delivery)?;
                let df_dom = model.curve(domestic_curve)?.discount_factor(asof, *delivery)?;
                notional * (spot * df_for - strike * df_dom)
            }
            Instrument::ZeroCouponBond {
                discount_curve,
                maturity,
                notional,
                ..
            } => notional * model.curve(discount_curve)?.discount_factor(asof, *maturity)?,
        };

        let ccy = trade.instrument().currency();
        let fx = if ccy == reporting_ccy {
            1.0
        } else {
            model.fx_rate(ccy, reporting_ccy)?
        };
        let value = local * fx;
        if !value.is_finite() {
            return Err(PricingError::InvalidInput(format!(
                "trade {} priced to {}",
                trade.id(),
                value
            )));
        }
        Ok(value)
    }
}

impl PortfolioPricer for AnalyticPricer {
    fn price(
        &self,
        trades: &[Trade],
        model: &MarketModel,
        reporting_ccy: Currency,
    ) -> Result<ResultCube, PricingError> {
        let mut cube = ResultCube::new(price_schema()?);
        for trade in trades {
            let value = self.price_trade(trade, model, reporting_ccy)?;
            cube.add_row(
                vec![
                    trade.id().as_str().into(),
                    trade.instrument().trade_type().into(),
                ],
                value,
            )?;
        }
        Ok(cube)
    }
}

/// Undiscounted Black-76 price.
fn black76(
    forward: f64,
    strike: f64,
    vol: f64,
    asof: Date,
    expiry: Date,
    option_type: OptionType,
) -> f64 {
    let t = asof.year_fraction_to(expiry);
    let std_dev = vol * t.max(0.0).sqrt();
    let intrinsic = match option_type {
        OptionType::Call => (forward - strike).max(0.0),
        OptionType::Put => (strike - forward).max(0.0),
    };
    if std_dev < MIN_STD_DEV {
        return intrinsic;
    }
    let d1 = ((forward / strike).ln() + 0.5 * std_dev * std_dev) / std_dev;
    let d2 = d1 - std_dev;
    match option_type {
        OptionType::Call => forward * norm_cdf(d1) - strike * norm_cdf(d2),
        OptionType::Put => strike * norm_cdf(-d2) - forward * norm_cdf(-d1),
    }
}
