//! Thin versioned encode/decode of a wearable's weight and texture table.
//!
//! The record is line-oriented: a version header, the category, a counted
//! parameter block of `id weight` pairs, and a counted texture block of
//! `slot image` pairs. Weights print with the shortest round-tripping
//! representation, so decode restores them exactly.

use crate::definition::model::WearableCategory;
use crate::foundation::core::ParamId;
use crate::foundation::error::{VestureError, VestureResult};
use crate::param::registry::ParameterRegistry;
use crate::wearable::model::Wearable;

/// Current record version.
pub const RECORD_VERSION: u32 = 1;

/// Encode a wearable to its line-oriented record.
pub fn encode(wearable: &Wearable) -> String {
    let mut out = String::new();
    out.push_str(&format!("vesture wearable version {RECORD_VERSION}\n"));
    out.push_str(&format!("category {}\n", wearable.category().as_str()));

    out.push_str(&format!("parameters {}\n", wearable.param_count()));
    for p in wearable.params() {
        out.push_str(&format!("{} {}\n", p.id().0, p.current_weight()));
    }

    let textures: Vec<_> = wearable.textures().collect();
    out.push_str(&format!("textures {}\n", textures.len()));
    for (slot, tex) in textures {
        out.push_str(&format!("{slot} {}\n", tex.image));
    }
    out
}

/// Decode a record into a fresh wearable built against `registry`.
///
/// Parameter ids absent from the registry's matching category are rejected:
/// a persisted wearable must agree with the config it is loaded under.
pub fn decode(record: &str, registry: &ParameterRegistry) -> VestureResult<Wearable> {
    let mut lines = record.lines();

    let header = next_line(&mut lines, "version header")?;
    let version: u32 = header
        .strip_prefix("vesture wearable version ")
        .and_then(|v| v.trim().parse().ok())
        .ok_or_else(|| VestureError::persistence(format!("bad version header '{header}'")))?;
    if version > RECORD_VERSION {
        return Err(VestureError::persistence(format!(
            "unsupported record version {version}"
        )));
    }

    let category_line = next_line(&mut lines, "category")?;
    let category = category_line
        .strip_prefix("category ")
        .and_then(WearableCategory::from_str_name)
        .ok_or_else(|| {
            VestureError::persistence(format!("bad category line '{category_line}'"))
        })?;

    let mut wearable = Wearable::new(category, registry);

    let count = counted_block(&mut lines, "parameters")?;
    for _ in 0..count {
        let line = next_line(&mut lines, "parameter entry")?;
        let (id, weight) = line
            .split_once(' ')
            .and_then(|(id, w)| Some((id.parse::<i32>().ok()?, w.trim().parse::<f32>().ok()?)))
            .ok_or_else(|| VestureError::persistence(format!("bad parameter line '{line}'")))?;
        let param = wearable.param_mut(ParamId(id)).ok_or_else(|| {
            VestureError::persistence(format!(
                "parameter {id} is not part of category '{}'",
                category.as_str()
            ))
        })?;
        param.restore_weight(weight);
    }
    wearable.save_weights();

    let count = counted_block(&mut lines, "textures")?;
    for _ in 0..count {
        let line = next_line(&mut lines, "texture entry")?;
        let (slot, image) = line
            .split_once(' ')
            .and_then(|(slot, image)| Some((slot.parse::<u32>().ok()?, image.trim())))
            .ok_or_else(|| VestureError::persistence(format!("bad texture line '{line}'")))?;
        if image.is_empty() {
            return Err(VestureError::persistence(format!(
                "texture slot {slot} has an empty image name"
            )));
        }
        wearable.set_texture(slot, image);
    }

    Ok(wearable)
}

fn next_line<'a>(lines: &mut std::str::Lines<'a>, what: &str) -> VestureResult<&'a str> {
    lines
        .next()
        .ok_or_else(|| VestureError::persistence(format!("truncated record: missing {what}")))
}

fn counted_block(lines: &mut std::str::Lines<'_>, keyword: &str) -> VestureResult<usize> {
    let line = next_line(lines, keyword)?;
    line.strip_prefix(keyword)
        .and_then(|rest| rest.trim().parse().ok())
        .ok_or_else(|| VestureError::persistence(format!("bad {keyword} line '{line}'")))
}

#[cfg(test)]
#[path = "../../tests/unit/wearable/persist.rs"]
mod tests;
