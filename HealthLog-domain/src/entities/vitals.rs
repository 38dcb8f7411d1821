use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The five raw vital-sign inputs of one assessment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VitalReading {
    /// Systolic blood pressure (the higher number) in mmHg
    pub systolic: i32,

    /// Diastolic blood pressure (the lower number) in mmHg
    pub diastolic: i32,

    /// Pulse rate in beats per minute
    pub pulse: i32,

    /// Blood-oxygen saturation in percent
    pub spo2: f64,

    /// Body temperature in degrees Celsius
    pub temperature: f64,
}

/// Four-level severity palette shared by the display and the report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityColor {
    Green,
    Yellow,
    Orange,
    Red,
}

impl SeverityColor {
    /// Cell fill used in exported reports
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            SeverityColor::Green => (187, 247, 208),
            SeverityColor::Yellow => (254, 240, 138),
            SeverityColor::Orange => (253, 186, 116),
            SeverityColor::Red => (252, 165, 165),
        }
    }
}

/// Blood pressure stage, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BloodPressureStage {
    /// Systolic < 120 and diastolic < 80
    #[serde(rename = "Normal")]
    Normal,

    /// Systolic 120-139 or diastolic 80-89
    #[serde(rename = "Prehypertension")]
    Prehypertension,

    /// Systolic 140-159 or diastolic 90-99
    #[serde(rename = "Hypertension Stage 1")]
    Hypertension1,

    /// Anything else
    #[serde(rename = "Hypertension Stage 2")]
    Hypertension2,
}

impl BloodPressureStage {
    /// All stages in severity order
    pub const ALL: [BloodPressureStage; 4] = [
        BloodPressureStage::Normal,
        BloodPressureStage::Prehypertension,
        BloodPressureStage::Hypertension1,
        BloodPressureStage::Hypertension2,
    ];

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            BloodPressureStage::Normal => "Normal",
            BloodPressureStage::Prehypertension => "Prehypertension",
            BloodPressureStage::Hypertension1 => "Hypertension Stage 1",
            BloodPressureStage::Hypertension2 => "Hypertension Stage 2",
        }
    }

    /// Severity color of the stage
    pub fn color(&self) -> SeverityColor {
        match self {
            BloodPressureStage::Normal => SeverityColor::Green,
            BloodPressureStage::Prehypertension => SeverityColor::Yellow,
            BloodPressureStage::Hypertension1 => SeverityColor::Orange,
            BloodPressureStage::Hypertension2 => SeverityColor::Red,
        }
    }

    /// Background color token frozen into records
    pub fn color_token(&self) -> &'static str {
        match self {
            BloodPressureStage::Normal => "bg-green-200",
            BloodPressureStage::Prehypertension => "bg-yellow-200",
            BloodPressureStage::Hypertension1 => "bg-orange-300",
            BloodPressureStage::Hypertension2 => "bg-red-300",
        }
    }
}

impl fmt::Display for BloodPressureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BloodPressureStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BloodPressureStage::ALL
            .into_iter()
            .find(|stage| stage.label() == s)
            .ok_or_else(|| format!("Unknown blood pressure stage: {}", s))
    }
}

/// Fitness-for-duty verdict, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FitnessVerdict {
    #[serde(rename = "FIT")]
    Fit,

    /// Fit, but only with a written note
    #[serde(rename = "FIT WITH NOTE")]
    FitWithNote,

    #[serde(rename = "UNFIT")]
    Unfit,
}

impl FitnessVerdict {
    /// All verdicts in severity order
    pub const ALL: [FitnessVerdict; 3] = [
        FitnessVerdict::Fit,
        FitnessVerdict::FitWithNote,
        FitnessVerdict::Unfit,
    ];

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            FitnessVerdict::Fit => "FIT",
            FitnessVerdict::FitWithNote => "FIT WITH NOTE",
            FitnessVerdict::Unfit => "UNFIT",
        }
    }

    /// Whether a submission with this verdict must carry a note
    pub fn requires_note(&self) -> bool {
        matches!(self, FitnessVerdict::FitWithNote)
    }

    /// Severity color of the verdict
    pub fn color(&self) -> SeverityColor {
        match self {
            FitnessVerdict::Fit => SeverityColor::Green,
            FitnessVerdict::FitWithNote => SeverityColor::Orange,
            FitnessVerdict::Unfit => SeverityColor::Red,
        }
    }
}

impl fmt::Display for FitnessVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FitnessVerdict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FitnessVerdict::ALL
            .into_iter()
            .find(|verdict| verdict.label() == s)
            .ok_or_else(|| format!("Unknown fitness verdict: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_labels_round_trip() {
        for stage in BloodPressureStage::ALL {
            assert_eq!(stage.label().parse::<BloodPressureStage>().unwrap(), stage);
        }
        assert!("Elevated".parse::<BloodPressureStage>().is_err());
    }

    #[test]
    fn test_stage_palette() {
        assert_eq!(BloodPressureStage::Normal.color_token(), "bg-green-200");
        assert_eq!(BloodPressureStage::Hypertension2.color_token(), "bg-red-300");
        assert_eq!(BloodPressureStage::Prehypertension.color().rgb(), (254, 240, 138));
        assert_eq!(BloodPressureStage::Hypertension1.color().rgb(), (253, 186, 116));
    }

    #[test]
    fn test_verdict_palette() {
        assert_eq!(FitnessVerdict::Fit.color().rgb(), (187, 247, 208));
        assert_eq!(FitnessVerdict::FitWithNote.color().rgb(), (253, 186, 116));
        assert_eq!(FitnessVerdict::Unfit.color().rgb(), (252, 165, 165));
    }

    #[test]
    fn test_severity_ordering() {
        assert!(BloodPressureStage::Normal < BloodPressureStage::Prehypertension);
        assert!(BloodPressureStage::Hypertension1 < BloodPressureStage::Hypertension2);
        assert!(FitnessVerdict::Fit < FitnessVerdict::FitWithNote);
        assert!(FitnessVerdict::FitWithNote < FitnessVerdict::Unfit);
    }

    #[test]
    fn test_only_middle_verdict_requires_note() {
        assert!(!FitnessVerdict::Fit.requires_note());
        assert!(FitnessVerdict::FitWithNote.requires_note());
        assert!(!FitnessVerdict::Unfit.requires_note());
    }

    #[test]
    fn test_verdict_serializes_as_label() {
        let json = serde_json::to_string(&FitnessVerdict::FitWithNote).unwrap();
        assert_eq!(json, "\"FIT WITH NOTE\"");
        assert_eq!("UNFIT".parse::<FitnessVerdict>().unwrap(), FitnessVerdict::Unfit);
    }
}
