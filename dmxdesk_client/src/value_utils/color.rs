use serde::{Deserialize, Serialize};

use super::scaling::{clamp_dmx, round_unit};
use crate::engine::types::DmxValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
	pub red: DmxValue,
	pub green: DmxValue,
	pub blue: DmxValue,
}
impl Rgb {
	pub fn new(red: DmxValue, green: DmxValue, blue: DmxValue) -> Self {
		return Rgb { red, green, blue };
	}

	/// The portion of the color every emitter shares
	pub fn white(&self) -> DmxValue {
		return self.red.min(self.green).min(self.blue);
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// A color in hue (0-360), saturation (0-100), lightness (0-100)
pub struct Hsl {
	pub hue: f64,
	pub saturation: f64,
	pub lightness: f64,
}
impl Hsl {
	/// Creates a new color, wrapping hue into `[0, 360)` and clamping the rest
	pub fn new(hue: f64, saturation: f64, lightness: f64) -> Self {
		let hue = if hue.is_finite() { hue.rem_euclid(360f64) } else { 0f64 };
		return Hsl {
			hue,
			saturation: clamp_percent(saturation),
			lightness: clamp_percent(lightness),
		};
	}
}

fn clamp_percent(value: f64) -> f64 {
	if !value.is_finite() {
		return 0f64;
	}
	return value.clamp(0f64, 100f64);
}

/// Standard HSL to RGB conversion, rounding each component half-up
pub fn hsl_to_rgb(color: Hsl) -> Rgb {
	let color = Hsl::new(color.hue, color.saturation, color.lightness);
	let s = color.saturation / 100f64;
	let l = color.lightness / 100f64;
	let chroma = (1f64 - (2f64 * l - 1f64).abs()) * s;
	let sector = color.hue / 60f64;
	let x = chroma * (1f64 - (sector % 2f64 - 1f64).abs());
	let (r, g, b) = match sector as u32 {
		0 => (chroma, x, 0f64),
		1 => (x, chroma, 0f64),
		2 => (0f64, chroma, x),
		3 => (0f64, x, chroma),
		4 => (x, 0f64, chroma),
		_ => (chroma, 0f64, x),
	};
	let m = l - chroma / 2f64;
	return Rgb {
		red: round_unit((r + m) * 255f64),
		green: round_unit((g + m) * 255f64),
		blue: round_unit((b + m) * 255f64),
	};
}

/// Inverse of [`hsl_to_rgb`]. Achromatic colors report a hue of 0.
pub fn rgb_to_hsl(color: Rgb) -> Hsl {
	let r = color.red as f64 / 255f64;
	let g = color.green as f64 / 255f64;
	let b = color.blue as f64 / 255f64;
	let max = r.max(g).max(b);
	let min = r.min(g).min(b);
	let l = (max + min) / 2f64;
	let delta = max - min;
	if delta <= f64::EPSILON {
		return Hsl::new(0f64, 0f64, l * 100f64);
	}
	let s = delta / (1f64 - (2f64 * l - 1f64).abs());
	let h = if max == r {
		((g - b) / delta).rem_euclid(6f64)
	} else if max == g {
		(b - r) / delta + 2f64
	} else {
		(r - g) / delta + 4f64
	};
	return Hsl::new(h * 60f64, s * 100f64, l * 100f64);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// What a color-mixer member's channel physically emits
pub enum ColorRole {
	Red,
	Green,
	Blue,
	White,
	WarmWhite,
	CoolWhite,
	Amber,
	Orange,
	Yellow,
	Cyan,
	Magenta,
	Lime,
	Uv,
}

/// Maps an RGB color onto the intensity a channel of the given role should take.
///
/// Only red, green, and blue are exact. White-family emitters take the shared
/// minimum. The secondary emitters are fixed two-component blends tuned against
/// real fixtures rather than a colorimetric model, and fixtures in the field
/// have been focused against these exact numbers:
///
/// | Role    | Formula            |
/// |---------|--------------------|
/// | Amber   | `min(R, 2G)`       |
/// | Orange  | `min(R, 3G)`       |
/// | Yellow  | `min(R, G)`        |
/// | Cyan    | `min(G, B)`        |
/// | Magenta | `min(R, B)`        |
/// | Lime    | `min(G, 2R)`       |
/// | UV      | `min(B, 2R)`       |
pub fn role_intensity(role: ColorRole, color: Rgb) -> DmxValue {
	let Rgb { red, green, blue } = color;
	return match role {
		ColorRole::Red => red,
		ColorRole::Green => green,
		ColorRole::Blue => blue,
		ColorRole::White | ColorRole::WarmWhite | ColorRole::CoolWhite => color.white(),
		ColorRole::Amber => red.min(boost(green, 2)),
		ColorRole::Orange => red.min(boost(green, 3)),
		ColorRole::Yellow => red.min(green),
		ColorRole::Cyan => green.min(blue),
		ColorRole::Magenta => red.min(blue),
		ColorRole::Lime => green.min(boost(red, 2)),
		ColorRole::Uv => blue.min(boost(red, 2)),
	};
}

fn boost(value: DmxValue, factor: i32) -> DmxValue {
	return clamp_dmx(value as i32 * factor);
}
