//! Instrument terms understood by the reference pricer.

use std::collections::BTreeSet;

use risk_market::types::{Currency, Date};

/// Call or put.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OptionType {
    /// Right to buy
    Call,
    /// Right to sell
    Put,
}

/// Economic terms of a trade.
///
/// Every variant names the market objects it reads, so the selector can
/// decide exposure without pricing.
#[derive(Clone, Debug, PartialEq)]
pub enum Instrument {
    /// Linear forward on a price curve.
    Forward {
        /// Price curve of the underlying
        underlying: String,
        /// Discount curve
        discount_curve: String,
        /// Settlement currency
        currency: Currency,
        /// Delivery date
        delivery: Date,
        /// Contract price
        strike: f64,
        /// Signed quantity
        units: f64,
    },
    /// European option priced with Black-76 on the forward.
    EuropeanOption {
        /// Price curve of the underlying
        underlying: String,
        /// Volatility surface
        surface: String,
        /// Discount curve
        discount_curve: String,
        /// Settlement currency
        currency: Currency,
        /// Expiry date
        expiry: Date,
        /// Strike
        strike: f64,
        /// Signed quantity
        units: f64,
        /// Call or put
        option_type: OptionType,
    },
    /// Exchange of `notional` foreign units for `notional * strike`
    /// domestic units on `delivery`.
    FxForward {
        /// Currency bought
        foreign: Currency,
        /// Currency sold
        domestic: Currency,
        /// Discount curve of the foreign currency
        foreign_curve: String,
        /// Discount curve of the domestic currency
        domestic_curve: String,
        /// Delivery date
        delivery: Date,
        /// Contract rate, domestic per foreign
        strike: f64,
        /// Foreign notional
        notional: f64,
    },
    /// Single cash flow of `notional` at maturity.
    ZeroCouponBond {
        /// Discount curve
        discount_curve: String,
        /// Currency of the flow
        currency: Currency,
        /// Payment date
        maturity: Date,
        /// Amount paid
        notional: f64,
    },
}

impl Instrument {
    /// Short type name written to the `TradeType` column.
    pub fn trade_type(&self) -> &'static str {
        match self {
            Instrument::Forward { .. } => "Forward",
            Instrument::EuropeanOption { .. } => "EuropeanOption",
            Instrument::FxForward { .. } => "FxForward",
            Instrument::ZeroCouponBond { .. } => "ZeroCouponBond",
        }
    }

    /// Curve names, surface names and currency codes the instrument reads.
    pub fn references(&self) -> BTreeSet<String> {
        let names: Vec<String> = match self {
            Instrument::Forward {
                underlying,
                discount_curve,
                currency,
                ..
            } => vec![
                underlying.clone(),
                discount_curve.clone(),
                currency.code().to_string(),
            ],
            Instrument::EuropeanOption {
                underlying,
                surface,
                discount_curve,
                currency,
                ..
            } => vec![
                underlying.clone(),
                surface.clone(),
                discount_curve.clone(),
                currency.code().to_string(),
            ],
            Instrument::FxForward {
                foreign,
                domestic,
                foreign_curve,
                domestic_curve,
                ..
            } => vec![
                foreign_curve.clone(),
                domestic_curve.clone(),
                foreign.code().to_string(),
                domestic.code().to_string(),
            ],
            Instrument::ZeroCouponBond {
                discount_curve,
                currency,
                ..
            } => vec![discount_curve.clone(), currency.code().to_string()],
        };
        names.into_iter().collect()
    }

    /// Last date on which the instrument has a cash flow or fixing.
    pub fn last_date(&self) -> Date {
        match self {
            Instrument::Forward { delivery, .. } | Instrument::FxForward { delivery, .. } => {
                *delivery
            }
            Instrument::EuropeanOption { expiry, .. } => *expiry,
            Instrument::ZeroCouponBond { maturity, .. } => *maturity,
        }
    }

    /// Currency the instrument is valued in before conversion.
    pub fn currency(&self) -> Currency {
        match self {
            Instrument::Forward { currency, .. }
            | Instrument::EuropeanOption { currency, .. }
            | Instrument::ZeroCouponBond { currency, .. } => *currency,
            Instrument::FxForward { domestic, .. } => *domestic,
        }
    }

    /// Checks that quantities and prices are finite.
    pub(crate) fn check_terms(&self) -> Result<(), String> {
        let numbers: Vec<(&str, f64)> = match self {
            Instrument::Forward { strike, units, .. } => {
                vec![("strike", *strike), ("units", *units)]
            }
            Instrument::EuropeanOption { strike, units, .. } => {
                if *strike <= 0.0 {
                    return Err(format!("option strike must be positive, got {}", strike));
                }
                vec![("strike", *strike), ("units", *units)]
            }
            Instrument::FxForward {
                foreign,
                domestic,
                strike,
                notional,
                ..
            } => {
                if foreign == domestic {
                    return Err(format!("FX forward with identical currencies {}", foreign));
                }
                vec![("strike", *strike), ("notional", *notional)]
            }
            Instrument::ZeroCouponBond { notional, .. } => vec![("notional", *notional)],
        };
        for (field, value) in numbers {
            if !value.is_finite() {
                return Err(format!("{} must be finite, got {}", field, value));
            }
        }
        Ok(())
    }
}
