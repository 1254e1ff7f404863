use crate::engine::types::DmxValue;

/// Divides two non-negative integers, rounding halves up.
///
/// All intensity arithmetic goes through here so results are reproducible
/// regardless of floating-point behavior.
pub fn div_round_half_up(numerator: u32, denominator: u32) -> u32 {
	if denominator == 0 {
		return 0;
	}
	return (numerator * 2 + denominator) / (denominator * 2);
}

/// Scales `value` by `factor / 255`, rounding halves up.
///
/// ```rust
/// # use dmxdesk_lib::value_utils::scaling::scale_by;
/// assert_eq!(scale_by(200, 128), 100);
/// assert_eq!(scale_by(255, 255), 255);
/// assert_eq!(scale_by(1, 128), 1);
/// assert_eq!(scale_by(0, 255), 0);
/// ```
pub fn scale_by(value: DmxValue, factor: DmxValue) -> DmxValue {
	let scaled = div_round_half_up(value as u32 * factor as u32, u8::MAX as u32);
	return clamp_dmx(scaled as i32);
}

/// Clamps any integer into the 0-255 range
pub fn clamp_dmx(value: i32) -> DmxValue {
	return value.clamp(u8::MIN as i32, u8::MAX as i32) as DmxValue;
}

/// Adds a signed step to a value, sticking to the outer bounds on overflow
pub fn nudge(value: DmxValue, delta: i16) -> DmxValue {
	return clamp_dmx(value as i32 + delta as i32);
}

/// Rounds a floating-point intensity into the 0-255 range. Halves round up.
pub fn round_unit(value: f64) -> DmxValue {
	if !value.is_finite() {
		return 0;
	}
	return (value + 0.5).floor().clamp(0f64, 255f64) as DmxValue;
}
