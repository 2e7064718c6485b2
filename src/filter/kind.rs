use std::str::FromStr;

use crate::foundation::error::{StudioError, StudioResult};

/// A named per-pixel transform.
///
/// Every variant is stateless and maps to exactly one pure transform in
/// [`crate::filter::engine`].
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    /// Identity.
    #[default]
    None,
    /// `255 - c` on r, g, b.
    Invert,
    /// Classic sepia matrix, clamped at 255.
    Sepia,
    /// Zero the red channel.
    RemoveRed,
    /// Zero the green channel.
    RemoveGreen,
    /// Zero the blue channel.
    RemoveBlue,
    /// Swap red and green.
    PermuteRgbGrb,
    /// Swap red and blue.
    PermuteRgbBrg,
    /// Quantize each channel to four levels.
    Posterize,
    /// Invert channels above the 128 threshold.
    Solarize,
}

impl FilterKind {
    /// All variants in declaration order.
    pub const ALL: [FilterKind; 10] = [
        FilterKind::None,
        FilterKind::Invert,
        FilterKind::Sepia,
        FilterKind::RemoveRed,
        FilterKind::RemoveGreen,
        FilterKind::RemoveBlue,
        FilterKind::PermuteRgbGrb,
        FilterKind::PermuteRgbBrg,
        FilterKind::Posterize,
        FilterKind::Solarize,
    ];

    /// Canonical snake_case name.
    pub fn name(self) -> &'static str {
        match self {
            FilterKind::None => "none",
            FilterKind::Invert => "invert",
            FilterKind::Sepia => "sepia",
            FilterKind::RemoveRed => "remove_red",
            FilterKind::RemoveGreen => "remove_green",
            FilterKind::RemoveBlue => "remove_blue",
            FilterKind::PermuteRgbGrb => "permute_rgb_grb",
            FilterKind::PermuteRgbBrg => "permute_rgb_brg",
            FilterKind::Posterize => "posterize",
            FilterKind::Solarize => "solarize",
        }
    }

    /// `true` for the identity filter.
    pub fn is_identity(self) -> bool {
        self == FilterKind::None
    }
}

impl std::fmt::Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterKind {
    type Err = StudioError;

    fn from_str(s: &str) -> StudioResult<Self> {
        let kind = s.trim().to_ascii_lowercase();
        if kind.is_empty() {
            return Err(StudioError::invalid_config("filter kind must be non-empty"));
        }

        match kind.as_str() {
            "none" | "identity" | "original" => Ok(FilterKind::None),
            "invert" => Ok(FilterKind::Invert),
            "sepia" => Ok(FilterKind::Sepia),
            "remove_red" | "remove-red" | "removered" => Ok(FilterKind::RemoveRed),
            "remove_green" | "remove-green" | "removegreen" => Ok(FilterKind::RemoveGreen),
            "remove_blue" | "remove-blue" | "removeblue" => Ok(FilterKind::RemoveBlue),
            "permute_rgb_grb" | "permute-rgb-grb" | "rgb_grb" | "grb" => {
                Ok(FilterKind::PermuteRgbGrb)
            }
            "permute_rgb_brg" | "permute-rgb-brg" | "rgb_brg" | "brg" => {
                Ok(FilterKind::PermuteRgbBrg)
            }
            "posterize" => Ok(FilterKind::Posterize),
            "solarize" => Ok(FilterKind::Solarize),
            _ => Err(StudioError::invalid_config(format!(
                "unknown filter kind '{kind}'"
            ))),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/filter/kind.rs"]
mod tests;
