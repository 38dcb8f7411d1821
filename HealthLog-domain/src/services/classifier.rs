use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::entities::vitals::{BloodPressureStage, FitnessVerdict, VitalReading};

/// Classify blood pressure into a stage.
///
/// Stages are tested least severe first and each stage is an OR over the two
/// pressures, so the first band either value falls into wins. A reading with
/// one value in a milder band can therefore be labelled milder than its other
/// value alone would suggest (170/85 is Prehypertension).
pub fn classify_blood_pressure(systolic: i32, diastolic: i32) -> BloodPressureStage {
    if systolic < 120 && diastolic < 80 {
        BloodPressureStage::Normal
    } else if (120..=139).contains(&systolic) || (80..=89).contains(&diastolic) {
        BloodPressureStage::Prehypertension
    } else if (140..=159).contains(&systolic) || (90..=99).contains(&diastolic) {
        BloodPressureStage::Hypertension1
    } else {
        BloodPressureStage::Hypertension2
    }
}

/// Named rule set for the fitness-for-duty verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FitnessPolicy {
    /// Each vital scored FIT / FIT WITH NOTE / UNFIT; the worst tier wins
    #[default]
    ThreeTier,

    /// Every vital inside its normal band is FIT, anything else is UNFIT
    TwoTier,
}

impl FitnessPolicy {
    /// Overall verdict for a reading
    pub fn classify(&self, reading: &VitalReading) -> FitnessVerdict {
        self.assess(reading).verdict
    }

    /// Per-vital breakdown and overall verdict for a reading
    pub fn assess(&self, reading: &VitalReading) -> FitnessAssessment {
        let (blood_pressure, pulse, spo2, temperature) = match self {
            FitnessPolicy::ThreeTier => (
                three_tier_blood_pressure(reading.systolic, reading.diastolic),
                three_tier_pulse(reading.pulse),
                three_tier_spo2(reading.spo2),
                three_tier_temperature(reading.temperature),
            ),
            FitnessPolicy::TwoTier => (
                pass_fail(reading.systolic < 140 && reading.diastolic < 90),
                pass_fail((60..=100).contains(&reading.pulse)),
                pass_fail(reading.spo2 >= 95.0),
                pass_fail((36.0..=37.5).contains(&reading.temperature)),
            ),
        };

        let verdict = [blood_pressure, pulse, spo2, temperature]
            .into_iter()
            .max()
            .unwrap_or(FitnessVerdict::Fit);

        FitnessAssessment {
            policy: *self,
            blood_pressure,
            pulse,
            spo2,
            temperature,
            verdict,
        }
    }
}

impl fmt::Display for FitnessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitnessPolicy::ThreeTier => f.write_str("three-tier"),
            FitnessPolicy::TwoTier => f.write_str("two-tier"),
        }
    }
}

impl FromStr for FitnessPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "three-tier" | "three_tier" | "a" => Ok(FitnessPolicy::ThreeTier),
            "two-tier" | "two_tier" | "b" => Ok(FitnessPolicy::TwoTier),
            _ => Err(format!(
                "Unknown fitness policy '{}', expected 'three-tier' or 'two-tier'",
                s
            )),
        }
    }
}

/// Per-vital tiers and the composite verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FitnessAssessment {
    /// Policy that produced this assessment
    pub policy: FitnessPolicy,
    pub blood_pressure: FitnessVerdict,
    pub pulse: FitnessVerdict,
    pub spo2: FitnessVerdict,
    pub temperature: FitnessVerdict,
    /// Worst of the four
    pub verdict: FitnessVerdict,
}

fn pass_fail(within_normal_band: bool) -> FitnessVerdict {
    if within_normal_band {
        FitnessVerdict::Fit
    } else {
        FitnessVerdict::Unfit
    }
}

fn three_tier_blood_pressure(systolic: i32, diastolic: i32) -> FitnessVerdict {
    if systolic >= 150 || diastolic >= 100 {
        FitnessVerdict::Unfit
    } else if systolic >= 130 || diastolic >= 90 {
        FitnessVerdict::FitWithNote
    } else {
        FitnessVerdict::Fit
    }
}

fn three_tier_pulse(pulse: i32) -> FitnessVerdict {
    if pulse > 130 {
        FitnessVerdict::Unfit
    } else if pulse >= 100 {
        FitnessVerdict::FitWithNote
    } else {
        FitnessVerdict::Fit
    }
}

fn three_tier_spo2(spo2: f64) -> FitnessVerdict {
    if spo2 < 92.0 {
        FitnessVerdict::Unfit
    } else if spo2 < 95.0 {
        FitnessVerdict::FitWithNote
    } else {
        FitnessVerdict::Fit
    }
}

fn three_tier_temperature(temperature: f64) -> FitnessVerdict {
    if temperature >= 38.0 {
        FitnessVerdict::Unfit
    } else if temperature >= 37.5 {
        FitnessVerdict::FitWithNote
    } else {
        FitnessVerdict::Fit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(systolic: i32, diastolic: i32, pulse: i32, spo2: f64, temperature: f64) -> VitalReading {
        VitalReading {
            systolic,
            diastolic,
            pulse,
            spo2,
            temperature,
        }
    }

    #[test]
    fn test_bp_normal() {
        for systolic in [0, 90, 119] {
            for diastolic in [0, 60, 79] {
                assert_eq!(
                    classify_blood_pressure(systolic, diastolic),
                    BloodPressureStage::Normal
                );
            }
        }
    }

    #[test]
    fn test_bp_prehypertension_or_semantics() {
        // Diastolic alone does not keep the reading Normal
        assert_eq!(classify_blood_pressure(120, 70), BloodPressureStage::Prehypertension);
        assert_eq!(classify_blood_pressure(139, 60), BloodPressureStage::Prehypertension);
        assert_eq!(classify_blood_pressure(110, 80), BloodPressureStage::Prehypertension);
        assert_eq!(classify_blood_pressure(110, 89), BloodPressureStage::Prehypertension);
    }

    #[test]
    fn test_bp_stage1() {
        assert_eq!(classify_blood_pressure(145, 70), BloodPressureStage::Hypertension1);
        assert_eq!(classify_blood_pressure(140, 79), BloodPressureStage::Hypertension1);
        assert_eq!(classify_blood_pressure(159, 75), BloodPressureStage::Hypertension1);
        assert_eq!(classify_blood_pressure(115, 95), BloodPressureStage::Hypertension1);
    }

    #[test]
    fn test_bp_stage2() {
        assert_eq!(classify_blood_pressure(160, 70), BloodPressureStage::Hypertension2);
        assert_eq!(classify_blood_pressure(110, 100), BloodPressureStage::Hypertension2);
        assert_eq!(classify_blood_pressure(200, 130), BloodPressureStage::Hypertension2);
    }

    #[test]
    fn test_bp_first_matching_band_wins() {
        // Systolic in the Stage 1 band, diastolic in the Prehypertension band
        assert_eq!(classify_blood_pressure(145, 85), BloodPressureStage::Prehypertension);
        // Systolic in the Stage 2 range, diastolic in the Prehypertension band
        assert_eq!(classify_blood_pressure(170, 85), BloodPressureStage::Prehypertension);
        // Systolic in the Stage 2 range, diastolic in the Stage 1 band
        assert_eq!(classify_blood_pressure(180, 95), BloodPressureStage::Hypertension1);
    }

    #[test]
    fn test_bp_out_of_range_values_fall_through() {
        // Negative systolic escapes every band once diastolic is high
        assert_eq!(classify_blood_pressure(-10, 100), BloodPressureStage::Hypertension2);
        assert_eq!(classify_blood_pressure(-10, -10), BloodPressureStage::Normal);
        assert_eq!(classify_blood_pressure(1000, 50), BloodPressureStage::Hypertension2);
    }

    #[test]
    fn test_three_tier_all_fit() {
        let assessment = FitnessPolicy::ThreeTier.assess(&reading(118, 76, 72, 98.0, 36.6));
        assert_eq!(assessment.verdict, FitnessVerdict::Fit);
    }

    #[test]
    fn test_three_tier_bp_note() {
        let assessment = FitnessPolicy::ThreeTier.assess(&reading(135, 70, 80, 97.0, 36.8));
        assert_eq!(assessment.blood_pressure, FitnessVerdict::FitWithNote);
        assert_eq!(assessment.pulse, FitnessVerdict::Fit);
        assert_eq!(assessment.spo2, FitnessVerdict::Fit);
        assert_eq!(assessment.temperature, FitnessVerdict::Fit);
        assert_eq!(assessment.verdict, FitnessVerdict::FitWithNote);
    }

    #[test]
    fn test_three_tier_boundaries() {
        let policy = FitnessPolicy::ThreeTier;
        let base = reading(118, 76, 72, 98.0, 36.6);

        let cases = [
            (VitalReading { systolic: 129, ..base }, FitnessVerdict::Fit),
            (VitalReading { systolic: 130, ..base }, FitnessVerdict::FitWithNote),
            (VitalReading { systolic: 149, ..base }, FitnessVerdict::FitWithNote),
            (VitalReading { systolic: 150, ..base }, FitnessVerdict::Unfit),
            (VitalReading { diastolic: 89, ..base }, FitnessVerdict::Fit),
            (VitalReading { diastolic: 90, ..base }, FitnessVerdict::FitWithNote),
            (VitalReading { diastolic: 100, ..base }, FitnessVerdict::Unfit),
            (VitalReading { pulse: 99, ..base }, FitnessVerdict::Fit),
            (VitalReading { pulse: 100, ..base }, FitnessVerdict::FitWithNote),
            (VitalReading { pulse: 130, ..base }, FitnessVerdict::FitWithNote),
            (VitalReading { pulse: 131, ..base }, FitnessVerdict::Unfit),
            (VitalReading { spo2: 95.0, ..base }, FitnessVerdict::Fit),
            (VitalReading { spo2: 94.9, ..base }, FitnessVerdict::FitWithNote),
            (VitalReading { spo2: 92.0, ..base }, FitnessVerdict::FitWithNote),
            (VitalReading { spo2: 91.9, ..base }, FitnessVerdict::Unfit),
            (VitalReading { temperature: 37.4, ..base }, FitnessVerdict::Fit),
            (VitalReading { temperature: 37.5, ..base }, FitnessVerdict::FitWithNote),
            (VitalReading { temperature: 37.9, ..base }, FitnessVerdict::FitWithNote),
            (VitalReading { temperature: 38.0, ..base }, FitnessVerdict::Unfit),
        ];

        for (reading, expected) in cases {
            assert_eq!(policy.classify(&reading), expected, "{:?}", reading);
        }
    }

    #[test]
    fn test_three_tier_any_unfit_wins() {
        let assessment = FitnessPolicy::ThreeTier.assess(&reading(118, 76, 72, 98.0, 38.2));
        assert_eq!(assessment.temperature, FitnessVerdict::Unfit);
        assert_eq!(assessment.verdict, FitnessVerdict::Unfit);

        // A note-tier value elsewhere does not soften an UNFIT one
        let mixed = FitnessPolicy::ThreeTier.classify(&reading(135, 70, 110, 93.0, 38.2));
        assert_eq!(mixed, FitnessVerdict::Unfit);
    }

    #[test]
    fn test_two_tier() {
        let policy = FitnessPolicy::TwoTier;
        assert_eq!(policy.classify(&reading(139, 89, 60, 95.0, 36.0)), FitnessVerdict::Fit);
        assert_eq!(policy.classify(&reading(120, 80, 100, 99.0, 37.5)), FitnessVerdict::Fit);
        assert_eq!(policy.classify(&reading(140, 80, 72, 98.0, 36.6)), FitnessVerdict::Unfit);
        assert_eq!(policy.classify(&reading(120, 90, 72, 98.0, 36.6)), FitnessVerdict::Unfit);
        assert_eq!(policy.classify(&reading(120, 80, 59, 98.0, 36.6)), FitnessVerdict::Unfit);
        assert_eq!(policy.classify(&reading(120, 80, 101, 98.0, 36.6)), FitnessVerdict::Unfit);
        assert_eq!(policy.classify(&reading(120, 80, 72, 94.9, 36.6)), FitnessVerdict::Unfit);
        assert_eq!(policy.classify(&reading(120, 80, 72, 98.0, 35.9)), FitnessVerdict::Unfit);
        assert_eq!(policy.classify(&reading(120, 80, 72, 98.0, 37.6)), FitnessVerdict::Unfit);
    }

    #[test]
    fn test_two_tier_never_requires_note() {
        // The same reading that needs a note under the three-tier rules
        let value = reading(135, 70, 80, 97.0, 36.8);
        assert_eq!(FitnessPolicy::TwoTier.classify(&value), FitnessVerdict::Fit);
        assert_eq!(FitnessPolicy::ThreeTier.classify(&value), FitnessVerdict::FitWithNote);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let value = reading(150, 95, 120, 93.5, 37.7);
        for policy in [FitnessPolicy::ThreeTier, FitnessPolicy::TwoTier] {
            assert_eq!(policy.assess(&value), policy.assess(&value));
        }
        assert_eq!(classify_blood_pressure(150, 95), classify_blood_pressure(150, 95));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("three-tier".parse::<FitnessPolicy>().unwrap(), FitnessPolicy::ThreeTier);
        assert_eq!("TWO-TIER".parse::<FitnessPolicy>().unwrap(), FitnessPolicy::TwoTier);
        assert_eq!(FitnessPolicy::default(), FitnessPolicy::ThreeTier);
        assert!("strict".parse::<FitnessPolicy>().is_err());
        assert_eq!(
            FitnessPolicy::TwoTier.to_string().parse::<FitnessPolicy>().unwrap(),
            FitnessPolicy::TwoTier
        );
    }
}
