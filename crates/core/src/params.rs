//! Lenient typed lookups into a JSON parameter object.
//!
//! Every helper takes the object, a key and a default. A missing key or a
//! value of the wrong JSON type yields the default; none of them can fail.
//! `Settings::from_json` is built entirely on these.

use std::str::FromStr;

use serde_json::Value;

/// Reads `params[name]` as `f64`. Integers are widened.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Reads `params[name]` as a non-negative integer.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(default)
}

/// Reads `params[name]` as a `u32`; values above `u32::MAX` yield the default.
pub fn param_u32(params: &Value, name: &str, default: u32) -> u32 {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(default)
}

pub fn param_bool(params: &Value, name: &str, default: bool) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(default)
}

pub fn param_string(params: &Value, name: &str, default: &str) -> String {
    params
        .get(name)
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| default.to_owned())
}

/// Reads `params[name]` as a string and parses it with `FromStr`.
///
/// A string that does not parse logs a warning and yields the default; a
/// missing key or non-string value yields the default silently.
pub fn param_parsed<T: FromStr>(params: &Value, name: &str, default: T) -> T {
    let Some(raw) = params.get(name).and_then(Value::as_str) else {
        return default;
    };
    raw.parse().unwrap_or_else(|_| {
        log::warn!("unrecognised value {raw:?} for {name:?}, using default");
        default
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq)]
    enum Cap {
        Round,
        Square,
    }

    impl FromStr for Cap {
        type Err = ();
        fn from_str(s: &str) -> Result<Self, ()> {
            match s {
                "round" => Ok(Cap::Round),
                "square" => Ok(Cap::Square),
                _ => Err(()),
            }
        }
    }

    // -- param_f64 --

    #[test]
    fn param_f64_extracts_existing_float() {
        let params = json!({"noise_scale": 0.01});
        assert!((param_f64(&params, "noise_scale", 0.005) - 0.01).abs() < f64::EPSILON);
    }

    #[test]
    fn param_f64_extracts_integer_as_float() {
        let params = json!({"resolution": 10});
        assert!((param_f64(&params, "resolution", 0.0) - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn param_f64_returns_default_when_key_missing_or_null() {
        let params = json!({"margin": null});
        assert!((param_f64(&params, "margin", 0.2) - 0.2).abs() < f64::EPSILON);
        assert!((param_f64(&params, "opacity", 150.0) - 150.0).abs() < f64::EPSILON);
    }

    #[test]
    fn param_f64_returns_default_when_wrong_type() {
        let params = json!({"step_length": "long"});
        assert!((param_f64(&params, "step_length", 2.0) - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn param_f64_returns_default_for_non_object() {
        let params = json!([1, 2, 3]);
        assert!((param_f64(&params, "margin", 0.3) - 0.3).abs() < f64::EPSILON);
    }

    // -- param_usize / param_u32 --

    #[test]
    fn param_usize_extracts_existing_integer() {
        let params = json!({"num_curves": 500});
        assert_eq!(param_usize(&params, "num_curves", 0), 500);
    }

    #[test]
    fn param_usize_rejects_float_and_negative() {
        let params = json!({"steps": 2.5, "octaves": -1});
        assert_eq!(param_usize(&params, "steps", 100), 100);
        assert_eq!(param_usize(&params, "octaves", 1), 1);
    }

    #[test]
    fn param_u32_rejects_values_above_range() {
        let params = json!({"seed": 5_000_000_000_u64});
        assert_eq!(param_u32(&params, "seed", 1234), 1234);
        let params = json!({"seed": 77});
        assert_eq!(param_u32(&params, "seed", 1234), 77);
    }

    // -- param_bool / param_string --

    #[test]
    fn param_bool_reads_and_falls_back() {
        let params = json!({"shadows": false, "tapering": 1});
        assert!(!param_bool(&params, "shadows", true));
        assert!(param_bool(&params, "tapering", true));
        assert!(!param_bool(&params, "watercolor", false));
    }

    #[test]
    fn param_string_reads_and_falls_back() {
        let params = json!({"palette": "Ember", "thickness_scale": 3});
        assert_eq!(param_string(&params, "palette", "Celestial"), "Ember");
        assert_eq!(param_string(&params, "thickness_scale", "Jumbo"), "Jumbo");
    }

    #[test]
    fn param_string_keeps_empty_string() {
        let params = json!({"palette": ""});
        assert_eq!(param_string(&params, "palette", "Celestial"), "");
    }

    // -- param_parsed --

    #[test]
    fn param_parsed_reads_known_value() {
        let params = json!({"stroke_cap": "square"});
        assert_eq!(param_parsed(&params, "stroke_cap", Cap::Round), Cap::Square);
    }

    #[test]
    fn param_parsed_unknown_string_falls_back() {
        let params = json!({"stroke_cap": "butt"});
        assert_eq!(param_parsed(&params, "stroke_cap", Cap::Round), Cap::Round);
    }

    #[test]
    fn param_parsed_non_string_falls_back() {
        let params = json!({"stroke_cap": 2});
        assert_eq!(param_parsed(&params, "stroke_cap", Cap::Square), Cap::Square);
    }
}
