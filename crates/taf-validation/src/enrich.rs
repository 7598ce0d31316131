//! TAF enrichment rules.
//!
//! [`enrich`] walks the forecast and its change groups in temporal order
//! and annotates the tree with derived facts; the enriched schema then
//! constrains those facts. Rules are tolerant: a missing or unparseable
//! node makes the rule skip the spot silently. Rules only ever add
//! fields, never remove them, so enrichment is safe on any JSON value.
//!
//! Most rules maintain a running baseline starting at the base
//! `forecast`. A change group advances the baseline only when its
//! `changeType` does not start with `PROB`: probabilistic groups describe
//! deviations, not new prevailing conditions.

use chrono::NaiveDateTime;
use serde_json::Value;

use taf_json::{as_int, find_parent_paths, find_value, find_value_paths, parse_int};

use crate::modular::shortest_arc;

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
const PROB_PREFIX: &str = "PROB";

/// Annotate a TAF document with derived facts, in place.
///
/// The rule order is fixed; each rule tracks its own baselines.
pub fn enrich(taf: &mut Value) {
    augment_changegroups_increasing_in_time(taf);
    augment_overlapping_becoming_changegroups(taf);
    augment_changegroup_duration(taf);
    augment_wind_gust(taf);
    augment_ascending_clouds(taf);
    augment_end_times(taf);
    augment_visibility_weather_required(taf);
    augment_enough_wind_change(taf);
    augment_cloud_needed_rain_or_modifier(taf);
    augment_max_visibility(taf);
    augment_non_repeating_changes(taf);
}

fn parse_time(node: &Value) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(node.as_str()?, TIME_FORMAT).ok()
}

/// Scalar-to-text coercion: strings verbatim, other scalars via their
/// literal, containers as the empty string.
fn text_of(node: &Value) -> String {
    match node {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => "null".to_owned(),
        Value::Array(_) | Value::Object(_) => String::new(),
    }
}

fn insert(node: &mut Value, key: &str, value: Value) {
    if let Value::Object(fields) = node {
        fields.insert(key.to_owned(), value);
    }
}

fn changegroups_mut(taf: &mut Value) -> Option<&mut Vec<Value>> {
    match taf.get_mut("changegroups") {
        Some(Value::Array(groups)) => Some(groups),
        _ => None,
    }
}

/// Whether a change group replaces the running baseline.
fn advances_baseline(group: &Value) -> bool {
    group
        .get("changeType")
        .is_some_and(|ct| !text_of(ct).starts_with(PROB_PREFIX))
}

// ─────────────────────────────────────────────────────────────────────────
// Rule 1: change groups must not move backwards in time
// ─────────────────────────────────────────────────────────────────────────

fn augment_changegroups_increasing_in_time(taf: &mut Value) {
    let Some(taf_start) = find_value(taf, "validityStart").and_then(parse_time) else {
        return;
    };
    let mut prev_start = taf_start;
    let Some(groups) = changegroups_mut(taf) else {
        return;
    };
    for group in groups.iter_mut() {
        let Some(parsed) = find_value(group, "changeStart").map(parse_time) else {
            continue;
        };
        let Some(change_type) = find_value(group, "changeType").map(text_of) else {
            continue;
        };
        match parsed {
            Some(start) => {
                // Equal starts are allowed for PROB groups, and for
                // BECMG/TEMPO groups sitting exactly at TAF validity start.
                let comes_after = start > prev_start
                    || (start == prev_start && change_type.starts_with(PROB_PREFIX))
                    || (start == prev_start
                        && start == taf_start
                        && (change_type.starts_with("BECMG")
                            || change_type.starts_with("TEMPO")));
                insert(group, "changegroupsAscending", Value::Bool(comes_after));
                prev_start = start;
            }
            None => insert(group, "changegroupsAscending", Value::Bool(false)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Rule 2: BECMG groups must not overlap earlier BECMG groups
// ─────────────────────────────────────────────────────────────────────────

fn augment_overlapping_becoming_changegroups(taf: &mut Value) {
    let Some(groups) = changegroups_mut(taf) else {
        return;
    };
    let mut becmg_ends: Vec<NaiveDateTime> = Vec::new();
    for group in groups.iter_mut() {
        let Some(change_type) = find_value(group, "changeType").map(text_of) else {
            continue;
        };
        if find_value(group, "changeStart").is_none() || change_type != "BECMG" {
            continue;
        }
        let Some(start) = find_value(group, "changeStart").and_then(parse_time) else {
            continue;
        };
        let overlaps = becmg_ends.iter().any(|end| start < *end);
        if let Some(end) = find_value(group, "changeEnd").and_then(parse_time) {
            becmg_ends.push(end);
        }
        insert(group, "changegroupBecomingOverlaps", Value::Bool(overlaps));
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Rule 3: change group duration in whole hours
// ─────────────────────────────────────────────────────────────────────────

fn augment_changegroup_duration(taf: &mut Value) {
    let validity_end = find_value(taf, "validityEnd").and_then(parse_time);
    let Some(groups) = changegroups_mut(taf) else {
        return;
    };
    for group in groups.iter_mut() {
        let Some(start) = find_value(group, "changeStart").and_then(parse_time) else {
            continue;
        };
        // A group without its own end runs to the end of the TAF.
        let end = match find_value(group, "changeEnd") {
            Some(node) => parse_time(node),
            None => validity_end,
        };
        let Some(end) = end else {
            continue;
        };
        let hours = (end - start).num_seconds().abs() / 3600;
        insert(group, "changeDurationInHours", Value::from(hours));
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Rule 4: gusts are only significant well above the mean wind
// ─────────────────────────────────────────────────────────────────────────

fn augment_wind_gust(taf: &mut Value) {
    for path in find_value_paths(&*taf, "wind") {
        let Some(wind) = taf.pointer_mut(&path) else {
            continue;
        };
        let Some(gusts) = find_value(wind, "gusts").and_then(parse_int) else {
            continue;
        };
        let Some(speed) = find_value(wind, "speed").and_then(parse_int) else {
            continue;
        };
        insert(
            wind,
            "gustFastEnough",
            Value::Bool(gusts >= speed.saturating_add(10)),
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Rule 5: cloud layers are reported bottom-up
// ─────────────────────────────────────────────────────────────────────────

fn augment_ascending_clouds(taf: &mut Value) {
    for path in find_parent_paths(&*taf, "clouds") {
        let Some(forecast) = taf.pointer_mut(&path) else {
            continue;
        };
        let Some(clouds) = find_value(forecast, "clouds").cloned() else {
            continue;
        };
        let ascending = match &clouds {
            Value::Array(entries) => {
                let mut prev_height = 0;
                let mut ascending = true;
                for cloud in entries {
                    let Some(height) = find_value(cloud, "height").and_then(parse_int) else {
                        continue;
                    };
                    if ascending && height < prev_height {
                        ascending = false;
                    }
                    prev_height = height;
                }
                ascending
            }
            // NSC and other scalars have nothing to order.
            _ => true,
        };
        insert(forecast, "cloudsAscending", Value::Bool(ascending));
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Rule 6: a change group ends after it starts
// ─────────────────────────────────────────────────────────────────────────

fn augment_end_times(taf: &mut Value) {
    let Some(groups) = changegroups_mut(taf) else {
        return;
    };
    for group in groups.iter_mut() {
        let Some(start) = find_value(group, "changeStart").and_then(parse_time) else {
            continue;
        };
        let Some(end) = find_value(group, "changeEnd").and_then(parse_time) else {
            continue;
        };
        insert(group, "endAfterStart", Value::Bool(start <= end));
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Rule 7: low visibility requires reported weather
// ─────────────────────────────────────────────────────────────────────────

fn augment_visibility_weather_required(taf: &mut Value) {
    let (mut baseline_weather, mut baseline_visibility) = {
        let Some(forecast) = taf.get("forecast") else {
            return;
        };
        if !forecast.is_object() {
            return;
        }
        (
            forecast.get("weather").cloned(),
            find_value(forecast, "visibility").cloned(),
        )
    };

    if let Some(value) = baseline_visibility.as_ref().and_then(|v| v.get("value")) {
        if as_int(value) <= 5000 {
            let present = baseline_weather.as_ref().is_some_and(Value::is_array);
            if let Some(forecast) = taf.get_mut("forecast") {
                insert(
                    forecast,
                    "visibilityWeatherRequiredAndPresent",
                    Value::Bool(present),
                );
            }
        }
    }

    let Some(groups) = changegroups_mut(taf) else {
        return;
    };
    for group in groups.iter_mut() {
        let mut change_visibility = find_value(group, "visibility").cloned();
        if change_visibility
            .as_ref()
            .and_then(|v| v.get("value"))
            .is_none()
        {
            change_visibility = baseline_visibility.clone();
        }
        let Some(visibility) = change_visibility
            .as_ref()
            .and_then(|v| v.get("value"))
            .map(as_int)
        else {
            continue;
        };
        let weather = find_value(group, "weather")
            .cloned()
            .or_else(|| baseline_weather.clone());
        if visibility <= 5000 {
            let present = weather.as_ref().is_some_and(Value::is_array);
            insert(
                group,
                "visibilityWeatherRequiredAndPresent",
                Value::Bool(present),
            );
        }
        if advances_baseline(group) {
            if weather.is_some() {
                baseline_weather = weather;
            }
            if change_visibility.is_some() {
                baseline_visibility = change_visibility;
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Rule 8: a wind change group must change the wind noticeably
// ─────────────────────────────────────────────────────────────────────────

fn augment_enough_wind_change(taf: &mut Value) {
    let (mut baseline_direction, mut baseline_speed, baseline_gusty) = {
        let Some(wind) = taf.get("forecast").and_then(|f| f.get("wind")) else {
            return;
        };
        let (Some(direction), Some(speed)) = (wind.get("direction"), wind.get("speed"))
        else {
            return;
        };
        (
            as_int(direction),
            as_int(speed),
            wind.get("gusts").map_or(0, as_int) > 0,
        )
    };

    let Some(groups) = changegroups_mut(taf) else {
        return;
    };
    for group in groups.iter_mut() {
        let Some((change_direction, change_speed, becomes_gusty)) =
            group.get("forecast").and_then(|f| f.get("wind")).and_then(|wind| {
                let (direction, speed) = (wind.get("direction")?, wind.get("speed")?);
                Some((
                    as_int(direction),
                    as_int(speed),
                    !baseline_gusty && wind.get("gusts").map_or(0, as_int) > 0,
                ))
            })
        else {
            continue;
        };

        let speed_difference = change_speed.saturating_sub(baseline_speed).saturating_abs();
        let direction_difference = shortest_arc(baseline_direction, change_direction);
        insert(group, "directionDiff", Value::from(direction_difference));
        insert(group, "speedDiff", Value::from(speed_difference));
        insert(
            group,
            "windEnoughDifference",
            Value::Bool(direction_difference >= 30 || speed_difference >= 5 || becomes_gusty),
        );
        if advances_baseline(group) {
            baseline_direction = change_direction;
            baseline_speed = change_speed;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Rule 9: showers and thunderstorms need matching clouds, and CB clouds
// need matching weather
// ─────────────────────────────────────────────────────────────────────────

fn augment_cloud_needed_rain_or_modifier(taf: &mut Value) {
    {
        let Some(forecast) = taf.get("forecast") else {
            return;
        };
        if !forecast.is_object() {
            return;
        }
        if matches!(forecast.get("clouds"), None | Some(Value::Null)) {
            return;
        }
    }
    if let Some(forecast) = taf.get_mut("forecast") {
        process_weather_and_cloud_group(forecast);
    }
    let Some(groups) = changegroups_mut(taf) else {
        return;
    };
    for group in groups.iter_mut() {
        let Some(change_forecast) = group.get_mut("forecast") else {
            continue;
        };
        if !change_forecast.is_object() {
            continue;
        }
        process_weather_and_cloud_group(change_forecast);
    }
}

fn process_weather_and_cloud_group(forecast: &mut Value) {
    let weather = forecast.get("weather").cloned();
    let clouds = forecast.get("clouds").cloned();

    let significant_weather = match &weather {
        Some(Value::String(s)) => s != "NSW" && !s.is_empty(),
        Some(Value::Array(groups)) => !groups.is_empty(),
        _ => false,
    };
    let cloud_entries = clouds.as_ref().and_then(Value::as_array);

    if significant_weather {
        let mut requires_clouds = false;
        let mut requires_cb = false;
        let mut requires_cb_or_tcu = false;
        let mut rain_or_thunderstorm = false;
        if let Some(Value::Array(groups)) = &weather {
            for group in groups {
                match group.get("descriptor").and_then(Value::as_str) {
                    Some("showers") => {
                        requires_clouds = true;
                        requires_cb_or_tcu = true;
                        rain_or_thunderstorm = true;
                    }
                    Some("thunderstorm") => {
                        requires_cb = true;
                        rain_or_thunderstorm = true;
                    }
                    _ => {}
                }
            }
        }

        if requires_clouds {
            let present = cloud_entries.is_some_and(|entries| !entries.is_empty());
            insert(forecast, "cloudsNeededAndPresent", Value::Bool(present));
        }
        if requires_cb {
            let present = cloud_entries.is_some_and(|entries| any_cloud_mod(entries, &["CB"]));
            insert(forecast, "cloudsCBNeededAndPresent", Value::Bool(present));
        }
        if requires_cb_or_tcu {
            let present =
                cloud_entries.is_some_and(|entries| any_cloud_mod(entries, &["CB", "TCU"]));
            insert(forecast, "cloudsCBorTCUNeededAndPresent", Value::Bool(present));
        }
        if cloud_entries.is_some_and(|entries| any_cloud_mod(entries, &["CB"])) {
            insert(
                forecast,
                "cloudsModifierHasWeatherPresent",
                Value::Bool(rain_or_thunderstorm),
            );
        }
    } else if let Some(entries) = cloud_entries {
        // No significant weather: a CB group would have nothing to explain.
        insert(
            forecast,
            "cloudsModifierHasWeatherPresent",
            Value::Bool(!any_cloud_mod(entries, &["CB"])),
        );
    }
}

fn any_cloud_mod(entries: &[Value], mods: &[&str]) -> bool {
    entries.iter().any(|cloud| {
        cloud
            .get("mod")
            .and_then(Value::as_str)
            .is_some_and(|m| mods.contains(&m))
    })
}

// ─────────────────────────────────────────────────────────────────────────
// Rule 10: obstruction phenomena constrain the visibility range
// ─────────────────────────────────────────────────────────────────────────

fn augment_max_visibility(taf: &mut Value) {
    let (mut baseline_weather, mut baseline_visibility) = {
        let Some(forecast) = taf.get("forecast") else {
            return;
        };
        if !forecast.is_object() {
            return;
        }
        (
            forecast.get("weather").cloned(),
            forecast.get("visibility").cloned(),
        )
    };

    let mut within_limit: Option<bool> = None;
    if let (Some(weather), Some(visibility)) = (&baseline_weather, &baseline_visibility) {
        if let Some(value) = visibility.get("value") {
            if let Some(result) = visibility_within_limit(weather, as_int(value)) {
                within_limit = Some(result);
            }
        }
    }

    if let Some(Value::Array(groups)) = taf.get("changegroups") {
        for group in groups {
            let Some(change_forecast) = group.get("forecast").filter(|f| f.is_object())
            else {
                break;
            };
            let mut change_weather = change_forecast.get("weather").cloned();
            let mut change_visibility = change_forecast.get("visibility").cloned();
            if change_weather.is_none() && change_visibility.is_none() {
                break;
            }
            if change_weather.is_none() {
                change_weather = baseline_weather.clone();
            }
            if change_visibility.is_none() {
                change_visibility = baseline_visibility.clone();
            }
            let (Some(weather), Some(visibility)) = (&change_weather, &change_visibility)
            else {
                continue;
            };
            let Some(value) = visibility.get("value") else {
                continue;
            };
            if let Some(result) = visibility_within_limit(weather, as_int(value)) {
                within_limit = Some(result);
            }
            if advances_baseline(group) {
                baseline_weather = change_weather;
                baseline_visibility = change_visibility;
            }
        }
    }

    // The flag lands on the base forecast even for change-group findings;
    // the enriched schema reads it there.
    if let Some(result) = within_limit {
        if let Some(forecast) = taf.get_mut("forecast") {
            insert(forecast, "visibilityWithinLimit", Value::Bool(result));
        }
    }
}

fn visibility_within_limit(weather: &Value, visibility: i64) -> Option<bool> {
    let groups = weather.as_array()?;
    let mut result = None;
    for group in groups {
        let Some(Value::Array(phenomena)) = group.get("phenomena") else {
            continue;
        };
        let has = |name: &str| phenomena.iter().any(|p| p.as_str() == Some(name));
        if has("fog") {
            result = Some(match group.get("descriptor") {
                None => visibility < 1000,
                Some(descriptor) => {
                    if text_of(descriptor) == "shallow" {
                        visibility > 1000
                    } else {
                        true
                    }
                }
            });
        }
        if has("smoke") || has("dust") || has("sand") || has("volcanic ash") {
            result = Some(visibility < 5000);
        }
        if has("mist") {
            result = Some((1000..=5000).contains(&visibility));
        }
        if has("haze") {
            result = Some(visibility <= 5000);
        }
    }
    result
}

// ─────────────────────────────────────────────────────────────────────────
// Rule 11: a change group must actually change something
// ─────────────────────────────────────────────────────────────────────────

fn augment_non_repeating_changes(taf: &mut Value) {
    {
        let Some(forecast) = taf.get_mut("forecast") else {
            return;
        };
        let Value::Object(fields) = forecast else {
            return;
        };
        // A base forecast without a weather group means NSW.
        if matches!(fields.get("weather"), None | Some(Value::Null)) {
            fields.insert("weather".to_owned(), Value::String("NSW".to_owned()));
        }
    }

    let mut baseline = taf.get("forecast").cloned().unwrap_or(Value::Null);
    let Some(groups) = changegroups_mut(taf) else {
        return;
    };
    for group in groups.iter_mut() {
        let Some(change_forecast) = group.get("forecast").filter(|f| f.is_object()).cloned()
        else {
            continue;
        };
        let mut repeating = false;
        for field in ["wind", "visibility", "weather", "clouds"] {
            let Some(baseline_field) = baseline.get(field).filter(|v| !v.is_null()) else {
                continue;
            };
            repeating |= Some(baseline_field) == change_forecast.get(field);
        }
        insert(group, "repeatingChange", Value::Bool(repeating));
        if advances_baseline(group) {
            baseline = change_forecast;
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn enrich_tolerates_arbitrary_values() {
        for mut value in [
            json!(null),
            json!(42),
            json!("TAF"),
            json!([1, 2, 3]),
            json!({}),
            json!({"forecast": "not an object"}),
            json!({"changegroups": "not an array"}),
            json!({"forecast": {}, "changegroups": [null, 17, {"forecast": null}]}),
        ] {
            let before = value.clone();
            enrich(&mut value);
            // Keys are only ever added, and scalars stay untouched.
            if !before.is_object() {
                assert_eq!(value, before);
            }
        }
    }

    #[test]
    fn base_forecast_without_weather_becomes_nsw() {
        let mut taf = json!({"forecast": {"clouds": "NSC"}});
        enrich(&mut taf);
        assert_eq!(taf["forecast"]["weather"], json!("NSW"));
    }

    #[test]
    fn gust_annotation_lands_on_every_wind_group() {
        let mut taf = json!({
            "forecast": {"wind": {"direction": 100, "speed": 10, "gusts": 20}},
            "changegroups": [
                {"forecast": {"wind": {"direction": 120, "speed": 18, "gusts": 25}}}
            ]
        });
        enrich(&mut taf);
        assert_eq!(taf["forecast"]["wind"]["gustFastEnough"], json!(true));
        assert_eq!(
            taf["changegroups"][0]["forecast"]["wind"]["gustFastEnough"],
            json!(false)
        );
    }

    #[test]
    fn clouds_scalar_counts_as_ascending() {
        let mut taf = json!({"forecast": {"clouds": "NSC"}});
        enrich(&mut taf);
        assert_eq!(taf["forecast"]["cloudsAscending"], json!(true));
    }

    #[test]
    fn descending_cloud_heights_are_flagged() {
        let mut taf = json!({
            "forecast": {
                "clouds": [
                    {"amount": "FEW", "height": 120},
                    {"amount": "SCT", "height": 80}
                ]
            }
        });
        enrich(&mut taf);
        assert_eq!(taf["forecast"]["cloudsAscending"], json!(false));
    }

    #[test]
    fn unparseable_change_start_yields_false_ascending() {
        let mut taf = json!({
            "validityStart": "2024-03-01T06:00:00Z",
            "changegroups": [
                {"changeType": "BECMG", "changeStart": "yesterday-ish"}
            ]
        });
        enrich(&mut taf);
        assert_eq!(taf["changegroups"][0]["changegroupsAscending"], json!(false));
    }
}
