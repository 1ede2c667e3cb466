//! Unit conventions applied to raw finite differences.

use risk_market::market_data::{MarketModel, Pillar};

use crate::error::GreeksError;

/// How a raw `ΔV / h` is converted into reporting units.
#[derive(Clone, Debug, PartialEq)]
pub enum UnitRescale {
    /// Report `ΔV / h` as is
    Identity,
    /// Multiply by a constant, e.g. `1e-4` for per-basis-point
    Multiply(f64),
    /// Divide by the discount factor to the pillar date, for sensitivities
    /// to forward-quoted curves
    ForwardDeDiscount {
        /// Discount curve used
        discount_curve: String,
    },
}

impl UnitRescale {
    /// Multiplier for a scenario on `pillar`.
    pub fn factor(&self, model: &MarketModel, pillar: &Pillar) -> Result<f64, GreeksError> {
        match self {
            UnitRescale::Identity => Ok(1.0),
            UnitRescale::Multiply(k) => Ok(*k),
            UnitRescale::ForwardDeDiscount { discount_curve } => {
                let df = model
                    .curve(discount_curve)?
                    .discount_factor(model.valuation_date(), pillar.date)?;
                Ok(1.0 / df)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use risk_market::market_data::curves::{CurveEnum, RateCurve};
    use risk_market::market_data::FxMatrix;
    use risk_market::types::{Currency, Date};

    #[test]
    fn test_forward_de_discount() {
        let asof = Date::from_ymd(2024, 1, 1).unwrap();
        let pillar = Pillar::new("1Y", asof.add_days(365));
        let mut model = MarketModel::new(asof, FxMatrix::new(Currency::USD));
        model.add_curve(CurveEnum::Rate(
            RateCurve::new("USD-OIS", Currency::USD, vec![pillar.clone()], vec![0.05]).unwrap(),
        ));

        let rescale = UnitRescale::ForwardDeDiscount {
            discount_curve: "USD-OIS".to_string(),
        };
        assert_relative_eq!(
            rescale.factor(&model, &pillar).unwrap(),
            0.05f64.exp(),
            epsilon = 1e-12
        );
        assert_relative_eq!(UnitRescale::Multiply(0.01).factor(&model, &pillar).unwrap(), 0.01);
        assert!(UnitRescale::ForwardDeDiscount {
            discount_curve: "EUR-OIS".to_string()
        }
        .factor(&model, &pillar)
        .is_err());
    }
}
