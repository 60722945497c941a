// Known coin diameters in millimetres.
pub const DIAMETER_1_MM: f32 = 21.;
pub const DIAMETER_2_MM: f32 = 23.;
pub const DIAMETER_5_MM: f32 = 25.5;

/// Label code of the "eagle side up" coin that can be a 1, 2 or 5.
pub const AMBIGUOUS_CODE: &str = "125";

// Codes that only get a caption. Storing the code and the display text.
const AMBIGUOUS_CAPTION: [&str; 2] = [AMBIGUOUS_CODE, "Eagle"];
const OTHER_CAPTION: [&str; 2] = ["0", "Other"];

/// What a label means for the value aggregator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoinClass {
    /// An explicit denomination, e.g. `"$10"` or `"5"`.
    Known(f32),
    /// A coin that can only be told apart by size.
    Ambiguous,
    /// A label that is neither a non-negative number nor the ambiguous code.
    Unrecognized,
}

impl CoinClass {
    /// Classifies a label. A leading `$` is ignored.
    pub fn from_label(label: &str) -> Self {
        let code = label_code(label);
        if code == AMBIGUOUS_CODE {
            return CoinClass::Ambiguous;
        }
        match code.parse::<f32>() {
            Ok(value) if value.is_finite() && value >= 0. => CoinClass::Known(value),
            _ => CoinClass::Unrecognized,
        }
    }

    /// Physical diameter of a denomination usable as calibration reference (1, 2 or 5).
    pub fn reference_diameter(&self) -> Option<f32> {
        match self {
            CoinClass::Known(v) if *v == 1. => Some(DIAMETER_1_MM),
            CoinClass::Known(v) if *v == 2. => Some(DIAMETER_2_MM),
            CoinClass::Known(v) if *v == 5. => Some(DIAMETER_5_MM),
            _ => None,
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, CoinClass::Ambiguous)
    }
}

/// Strips the currency sign from a label.
pub fn label_code(label: &str) -> &str {
    label.strip_prefix('$').unwrap_or(label)
}

/// Display text for a label, mapping the special codes to words.
pub fn caption(label: &str) -> String {
    match label_code(label) {
        c if c == AMBIGUOUS_CAPTION[0] => AMBIGUOUS_CAPTION[1].to_string(),
        c if c == OTHER_CAPTION[0] => OTHER_CAPTION[1].to_string(),
        _ => label.to_string(),
    }
}
