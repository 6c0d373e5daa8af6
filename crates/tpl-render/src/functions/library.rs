//! Helper functions added on top of minijinja's built-ins.
//!
//! Helpers never fail a render. Bad input is logged as a warning and the
//! helper returns a neutral value instead.

use minijinja::Value;

use super::FunctionSet;

const FNV64_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV64_PRIME: u64 = 0x0000_0100_0000_01b3;

/// The fixed helper set.
///
/// | Function | Result |
/// |----------|--------|
/// | `baseConvert(from, to, s)` | `s` parsed in base `from`, printed in base `to` |
/// | `fnv64sum(s)` | 64-bit FNV-1 hash of `s` as 16 hex digits |
/// | `fromJson(s)` / `fromYaml(s)` | decoded structure, `none` when malformed |
/// | `toJson(v)` / `toYaml(v)` | encoded text |
/// | `trimLeft(cut, s)` / `trimRight(cut, s)` | `s` without leading/trailing chars from `cut` |
pub fn library() -> FunctionSet {
    let mut set = FunctionSet::new();
    set.insert("baseConvert".into(), Value::from_function(base_convert));
    set.insert("fnv64sum".into(), Value::from_function(fnv64sum));
    set.insert("fromJson".into(), Value::from_function(from_json));
    set.insert("fromYaml".into(), Value::from_function(from_yaml));
    set.insert("toJson".into(), Value::from_function(to_json));
    set.insert("toYaml".into(), Value::from_function(to_yaml));
    set.insert("trimLeft".into(), Value::from_function(trim_left));
    set.insert("trimRight".into(), Value::from_function(trim_right));
    set
}

fn base_convert(from: u32, to: u32, s: String) -> String {
    if !(2..=36).contains(&from) || !(2..=36).contains(&to) {
        log::warn!(
            "cannot convert {:?} from base {} to base {}: unsupported base",
            s,
            from,
            to
        );
        return "0".to_string();
    }
    match i64::from_str_radix(s.trim(), from) {
        Ok(n) => format_radix(n, to),
        Err(err) => {
            log::warn!(
                "cannot parse integer base {} from string {:?}: {}",
                from,
                s,
                err
            );
            "0".to_string()
        }
    }
}

fn format_radix(n: i64, radix: u32) -> String {
    let mut magnitude = n.unsigned_abs();
    if magnitude == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while magnitude > 0 {
        let digit = (magnitude % radix as u64) as u32;
        digits.push(std::char::from_digit(digit, radix).unwrap_or('?'));
        magnitude /= radix as u64;
    }
    if n < 0 {
        digits.push('-');
    }
    digits.iter().rev().collect()
}

fn fnv64sum(s: String) -> String {
    let mut hash = FNV64_OFFSET;
    for byte in s.bytes() {
        hash = hash.wrapping_mul(FNV64_PRIME) ^ u64::from(byte);
    }
    format!("{:016x}", hash)
}

fn from_json(s: String) -> Value {
    match serde_json::from_str::<serde_json::Value>(&s) {
        Ok(decoded) => Value::from_serialize(&decoded),
        Err(err) => {
            log::warn!("cannot unmarshal JSON: {} (in {:?})", err, s);
            Value::from(())
        }
    }
}

fn from_yaml(s: String) -> Value {
    match serde_yaml::from_str::<serde_yaml::Value>(&s) {
        Ok(decoded) => Value::from_serialize(&decoded),
        Err(err) => {
            log::warn!("cannot unmarshal YAML: {} (in {:?})", err, s);
            Value::from(())
        }
    }
}

fn to_json(v: Value) -> String {
    serde_json::to_string(&v).unwrap_or_else(|err| {
        log::warn!("cannot marshal JSON: {}", err);
        String::new()
    })
}

fn to_yaml(v: Value) -> String {
    serde_yaml::to_string(&v).unwrap_or_else(|err| {
        log::warn!("cannot marshal YAML: {}", err);
        String::new()
    })
}

fn trim_left(cut: String, s: String) -> String {
    s.trim_start_matches(|c: char| cut.contains(c)).to_string()
}

fn trim_right(cut: String, s: String) -> String {
    s.trim_end_matches(|c: char| cut.contains(c)).to_string()
}
