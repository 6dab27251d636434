use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Weights for the linear suitability model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub throughput_weight: f64,
    pub elec_cost_weight: f64,
    pub sst_deviation_weight: f64,
    pub ideal_sst: f64,
    /// Decimal digits kept in the returned score
    pub precision: u32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            throughput_weight: 0.5,
            elec_cost_weight: 0.3,
            sst_deviation_weight: 0.2,
            ideal_sst: 18.0,
            precision: 3,
        }
    }
}

/// Feature vector accepted by `/predict`
///
/// Each field takes a JSON number or a string holding one, so `"18.5"` and
/// `18.5` are equivalent. Unknown fields are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    #[serde(deserialize_with = "lax_f64")]
    pub sst: f64,
    #[serde(deserialize_with = "lax_f64")]
    pub elec_cost: f64,
    #[serde(deserialize_with = "lax_f64")]
    pub throughput: f64,
}

impl FeatureVector {
    pub fn new(sst: f64, elec_cost: f64, throughput: f64) -> Self {
        Self {
            sst,
            elec_cost,
            throughput,
        }
    }
}

/// Linear scoring model
#[derive(Debug, Clone, Default)]
pub struct ScoringModel {
    weights: ScoringWeights,
}

impl ScoringModel {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// Score a feature vector.
    ///
    /// Rewards throughput, penalises electricity cost and distance from the
    /// ideal sea-surface temperature, then rounds to `precision` digits.
    /// Non-finite inputs propagate unchanged.
    pub fn evaluate(&self, features: &FeatureVector) -> f64 {
        let w = &self.weights;
        let raw = w.throughput_weight * features.throughput
            - w.elec_cost_weight * features.elec_cost
            - w.sst_deviation_weight * (features.sst - w.ideal_sst).abs();

        round_to(raw, w.precision)
    }
}

/// Score with the default weights
pub fn score(sst: f64, elec_cost: f64, throughput: f64) -> f64 {
    ScoringModel::default().evaluate(&FeatureVector::new(sst, elec_cost, throughput))
}

/// Round half away from zero to `digits` decimal places.
///
/// Values too large to carry fractional digits at this precision are
/// returned unchanged, so a finite input never rounds to infinity.
pub fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    let scaled = value * factor;
    if !scaled.is_finite() || value.abs() >= 2f64.powi(52) / factor {
        return value;
    }
    scaled.round() / factor
}

fn lax_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    struct LaxF64;

    impl Visitor<'_> for LaxF64 {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a number or a numeric string")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
            v.trim()
                .parse::<f64>()
                .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
        }
    }

    deserializer.deserialize_any(LaxF64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ideal_temperature_with_no_cost_or_throughput_scores_zero() {
        assert_eq!(score(18.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn reference_example() {
        assert_eq!(score(18.0, 10.0, 100.0), 47.0);
    }

    #[test]
    fn throughput_slope_is_one_half() {
        let base = score(20.0, 4.0, 10.0);
        let bumped = score(20.0, 4.0, 12.0);
        assert!((bumped - base - 1.0).abs() < 1e-9);
    }

    #[test]
    fn elec_cost_slope_is_minus_three_tenths() {
        let base = score(20.0, 4.0, 10.0);
        let bumped = score(20.0, 14.0, 10.0);
        assert!((bumped - base + 3.0).abs() < 1e-9);
    }

    #[test]
    fn symmetric_around_ideal_temperature() {
        for d in [0.5, 1.0, 3.25, 10.0, 42.0] {
            assert_eq!(score(18.0 + d, 7.0, 33.0), score(18.0 - d, 7.0, 33.0));
        }
    }

    #[test]
    fn temperature_deviation_is_penalised() {
        assert_eq!(score(23.0, 0.0, 0.0), -1.0);
    }

    #[test]
    fn rounds_to_three_digits() {
        // 0.5 * 1.23456 = 0.61728
        assert_eq!(score(18.0, 0.0, 1.23456), 0.617);
    }

    #[test]
    fn huge_finite_inputs_stay_finite() {
        let high = score(18.0, 0.0, 1e308);
        assert!(high.is_finite());
        assert_eq!(high, 0.5 * 1e308);

        let low_cost = score(18.0, -1e308, 0.0);
        assert!(low_cost.is_finite());
        assert_eq!(low_cost, 0.3 * 1e308);
    }

    #[test]
    fn rounding_leaves_integral_magnitudes_alone() {
        assert_eq!(round_to(1e300, 15), 1e300);
        assert_eq!(round_to(-4.5e15, 3), -4.5e15);
        assert_eq!(round_to(2.0004, 3), 2.0);
    }

    #[test]
    fn infinity_propagates() {
        assert_eq!(score(18.0, 0.0, f64::INFINITY), f64::INFINITY);
    }

    #[test]
    fn nan_propagates() {
        assert!(score(f64::NAN, 0.0, 0.0).is_nan());
    }

    #[test]
    fn custom_weights_are_applied() {
        let model = ScoringModel::new(ScoringWeights {
            throughput_weight: 1.0,
            elec_cost_weight: 0.0,
            sst_deviation_weight: 0.0,
            ideal_sst: 0.0,
            precision: 0,
        });
        assert_eq!(model.evaluate(&FeatureVector::new(99.0, 99.0, 2.4)), 2.0);
    }

    #[test]
    fn feature_vector_accepts_numeric_strings() {
        let fv: FeatureVector =
            serde_json::from_str(r#"{"sst": "18", "elec_cost": " 10.5 ", "throughput": 100}"#)
                .unwrap();
        assert_eq!(fv, FeatureVector::new(18.0, 10.5, 100.0));
    }

    #[test]
    fn feature_vector_rejects_non_numeric_values() {
        let err = serde_json::from_str::<FeatureVector>(
            r#"{"sst": "warm", "elec_cost": 1, "throughput": 1}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("numeric string"));

        assert!(serde_json::from_str::<FeatureVector>(
            r#"{"sst": true, "elec_cost": 1, "throughput": 1}"#
        )
        .is_err());
        assert!(serde_json::from_str::<FeatureVector>(
            r#"{"sst": null, "elec_cost": 1, "throughput": 1}"#
        )
        .is_err());
    }

    #[test]
    fn feature_vector_requires_every_field() {
        let err = serde_json::from_str::<FeatureVector>(r#"{"sst": 1, "throughput": 1}"#)
            .unwrap_err();
        assert!(err.to_string().contains("missing field `elec_cost`"));
    }

    #[test]
    fn feature_vector_ignores_unknown_fields() {
        let fv: FeatureVector = serde_json::from_str(
            r#"{"sst": 1, "elec_cost": 2, "throughput": 3, "region": "north"}"#,
        )
        .unwrap();
        assert_eq!(fv, FeatureVector::new(1.0, 2.0, 3.0));
    }
}
