use super::lua::{brace_delta, split_field, split_top_level, strip_braces, strip_comment, unquote};
use super::model::{
    NamedSetting, RankColors, RespawnLocation, ScalarSlot, ServerSettings, SettingValue,
    SpawnLocation, TimeTable,
};
use crate::error::{CoreError, CoreResult};

struct PendingTable {
    key: String,
    text: String,
    depth: i32,
}

/// Parses `config.lua` into a complete record. Keys the launcher does not
/// manage are skipped; known keys with a malformed literal are errors.
pub fn parse_server_settings(content: &str) -> CoreResult<ServerSettings> {
    let mut settings = ServerSettings::default();
    let mut pending: Option<PendingTable> = None;

    for raw in content.lines() {
        let line = strip_comment(raw).trim();

        if let Some(table) = pending.as_mut() {
            if line.is_empty() {
                continue;
            }
            table.depth += brace_delta(line);
            table.text.push(' ');
            table.text.push_str(line);
            if table.depth > 0 {
                continue;
            }
            if let Some(table) = pending.take() {
                apply_table(&mut settings, &table.key, &table.text)?;
            }
            continue;
        }

        let Some(statement) = line.strip_prefix("config.") else {
            continue;
        };
        let Some((key, value)) = statement.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim().trim_end_matches(';').trim_end();

        if value.starts_with('{') {
            let depth = brace_delta(value);
            if depth <= 0 {
                apply_table(&mut settings, key, value)?;
            } else {
                pending = Some(PendingTable {
                    key: key.to_string(),
                    text: value.to_string(),
                    depth,
                });
            }
        } else {
            apply_scalar(&mut settings, key, value)?;
        }
    }

    if let Some(table) = pending {
        return Err(CoreError::parse(table.key, table.text, "a table closed by `}`"));
    }
    Ok(settings)
}

fn apply_scalar(settings: &mut ServerSettings, key: &str, raw: &str) -> CoreResult<()> {
    let Some(slot) = settings.scalar_slot(key) else {
        tracing::debug!(key, "ignoring unmanaged setting");
        return Ok(());
    };
    match slot {
        ScalarSlot::Int(v) => *v = parse_int(key, raw)?,
        ScalarSlot::Float(v) => *v = parse_float(key, raw)?,
        ScalarSlot::Bool(v) => *v = parse_bool(key, raw)?,
        ScalarSlot::Str(v) => *v = parse_string(key, raw)?,
    }
    Ok(())
}

fn apply_table(settings: &mut ServerSettings, key: &str, text: &str) -> CoreResult<()> {
    let body = strip_braces(text).ok_or_else(|| CoreError::parse(key, text, "a table"))?;

    if let Some(list) = settings.string_list_mut(key) {
        *list = parse_string_list(key, body)?;
        return Ok(());
    }

    match key {
        "gameSettings" => settings.game_settings = parse_named_settings(key, body)?,
        "vrSettings" => settings.vr_settings = parse_named_settings(key, body)?,
        "defaultTimeTable" => settings.default_time_table = parse_time_table(key, body)?,
        "instancedSpawn" => {
            settings.instanced_spawn = parse_spawn(key, body, settings.instanced_spawn.clone())?
        }
        "noninstancedSpawn" => {
            settings.noninstanced_spawn =
                parse_spawn(key, body, settings.noninstanced_spawn.clone())?
        }
        "defaultRespawn" => settings.default_respawn = parse_respawn(key, body)?,
        "rankColors" => settings.rank_colors = parse_rank_colors(key, body)?,
        _ => tracing::debug!(key, "ignoring unmanaged table"),
    }
    Ok(())
}

fn parse_int(key: &str, raw: &str) -> CoreResult<i32> {
    raw.trim()
        .parse()
        .map_err(|_| CoreError::parse(key, raw, "integer"))
}

fn parse_float(key: &str, raw: &str) -> CoreResult<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CoreError::parse(key, raw, "number"))
}

fn parse_bool(key: &str, raw: &str) -> CoreResult<bool> {
    match raw.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(CoreError::parse(key, raw, "boolean")),
    }
}

fn parse_string(key: &str, raw: &str) -> CoreResult<String> {
    unquote(raw).ok_or_else(|| CoreError::parse(key, raw, "quoted string"))
}

fn parse_setting_value(key: &str, raw: &str) -> CoreResult<SettingValue> {
    let raw = raw.trim();
    match raw {
        "true" => return Ok(SettingValue::Bool(true)),
        "false" => return Ok(SettingValue::Bool(false)),
        _ => {}
    }
    if let Some(s) = unquote(raw) {
        return Ok(SettingValue::String(s));
    }
    parse_float(key, raw)
        .map(SettingValue::Number)
        .map_err(|_| CoreError::parse(key, raw, "boolean, number or quoted string"))
}

fn parse_string_list(key: &str, body: &str) -> CoreResult<Vec<String>> {
    split_top_level(body, b',')
        .into_iter()
        .map(|item| parse_string(key, item))
        .collect()
}

fn parse_float_array(key: &str, raw: &str) -> CoreResult<Vec<f64>> {
    let body = strip_braces(raw).ok_or_else(|| CoreError::parse(key, raw, "array of numbers"))?;
    split_top_level(body, b',')
        .into_iter()
        .map(|item| parse_float(key, item))
        .collect()
}

/// `name = value` pairs of a record table, with the field names qualified for
/// error messages.
fn record_fields<'a>(key: &str, body: &'a str) -> CoreResult<Vec<(String, &'a str)>> {
    split_top_level(body, b',')
        .into_iter()
        .map(|item| {
            split_field(item).ok_or_else(|| CoreError::parse(key, item, "`name = value` field"))
        })
        .collect()
}

fn parse_named_settings(key: &str, body: &str) -> CoreResult<Vec<NamedSetting>> {
    let mut out = Vec::new();
    for entry in split_top_level(body, b',') {
        let inner = strip_braces(entry)
            .ok_or_else(|| CoreError::parse(key, entry, "{ name = ..., value = ... }"))?;
        let mut name = None;
        let mut value = None;
        for (field, raw) in record_fields(key, inner)? {
            match field.as_str() {
                "name" => name = Some(parse_string(&format!("{key}.name"), raw)?),
                "value" => value = Some(parse_setting_value(&format!("{key}.value"), raw)?),
                _ => {}
            }
        }
        match (name, value) {
            (Some(name), Some(value)) => out.push(NamedSetting { name, value }),
            _ => return Err(CoreError::parse(key, entry, "entry with both name and value")),
        }
    }
    Ok(out)
}

fn parse_time_table(key: &str, body: &str) -> CoreResult<TimeTable> {
    let mut table = TimeTable::default();
    for (field, raw) in record_fields(key, body)? {
        let qualified = format!("{key}.{field}");
        let slot = match field.as_str() {
            "year" => &mut table.year,
            "month" => &mut table.month,
            "day" => &mut table.day,
            "hour" => &mut table.hour,
            "daysPassed" => &mut table.days_passed,
            "dayTimeScale" => &mut table.day_time_scale,
            "nightTimeScale" => &mut table.night_time_scale,
            _ => continue,
        };
        *slot = parse_int(&qualified, raw)?;
    }
    Ok(table)
}

fn parse_spawn(key: &str, body: &str, mut spawn: SpawnLocation) -> CoreResult<SpawnLocation> {
    for (field, raw) in record_fields(key, body)? {
        let qualified = format!("{key}.{field}");
        match field.as_str() {
            "cellDescription" => spawn.cell_description = parse_string(&qualified, raw)?,
            "position" => spawn.position = parse_float_array(&qualified, raw)?,
            "rotation" => spawn.rotation = parse_float_array(&qualified, raw)?,
            "text" => spawn.text = parse_string(&qualified, raw)?,
            _ => {}
        }
    }
    Ok(spawn)
}

fn parse_respawn(key: &str, body: &str) -> CoreResult<RespawnLocation> {
    let mut respawn = RespawnLocation::default();
    for (field, raw) in record_fields(key, body)? {
        let qualified = format!("{key}.{field}");
        match field.as_str() {
            "cellDescription" => respawn.cell_description = parse_string(&qualified, raw)?,
            "position" => respawn.position = parse_float_array(&qualified, raw)?,
            "rotation" => respawn.rotation = parse_float_array(&qualified, raw)?,
            _ => {}
        }
    }
    Ok(respawn)
}

/// Accepts `color.Name` references as well as plain quoted names.
fn parse_color(key: &str, raw: &str) -> CoreResult<String> {
    if let Some(name) = raw.trim().strip_prefix("color.") {
        if super::lua::is_identifier(name) {
            return Ok(name.to_string());
        }
    }
    unquote(raw).ok_or_else(|| CoreError::parse(key, raw, "color.<Name> or quoted string"))
}

fn parse_rank_colors(key: &str, body: &str) -> CoreResult<RankColors> {
    let mut colors = RankColors::default();
    for (field, raw) in record_fields(key, body)? {
        let qualified = format!("{key}.{field}");
        match field.as_str() {
            "serverOwner" => colors.server_owner = parse_color(&qualified, raw)?,
            "admin" => colors.admin = parse_color(&qualified, raw)?,
            "moderator" => colors.moderator = parse_color(&qualified, raw)?,
            _ => {}
        }
    }
    Ok(colors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let settings = parse_server_settings("").unwrap();
        assert_eq!(settings, ServerSettings::default());
        assert_eq!(settings.night_start_hour, 20);
        assert_eq!(settings.physics_framerate, 60);
    }

    #[test]
    fn single_and_multi_line_tables_agree() {
        let single = parse_server_settings(r#"config.forbiddenCells = {"A","B"}"#).unwrap();
        let multi = parse_server_settings("config.forbiddenCells = {\n\"A\",\n\"B\"\n}\n").unwrap();
        assert_eq!(single.forbidden_cells, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(single.forbidden_cells, multi.forbidden_cells);
    }

    #[test]
    fn scalars_are_typed() {
        let settings = parse_server_settings(
            "config = {}\n\
             config.gameMode = \"Roleplay\" -- shown in the browser\n\
             config.loginTime = 120\n\
             config.enforcedLogLevel = -1\n\
             config.allowConsole = true\n\
             config.maximumObjectScale = 20\n\
             return config\n",
        )
        .unwrap();
        assert_eq!(settings.game_mode, "Roleplay");
        assert_eq!(settings.login_time, 120);
        assert_eq!(settings.enforced_log_level, -1);
        assert!(settings.allow_console);
        assert_eq!(settings.maximum_object_scale, 20.0);
    }

    #[test]
    fn malformed_literal_names_key_and_value() {
        let err = parse_server_settings("config.loginTime = sixty\n").unwrap_err();
        match err {
            CoreError::Parse { key, value, .. } => {
                assert_eq!(key, "loginTime");
                assert_eq!(value, "sixty");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(parse_server_settings("config.allowWait = 1\n").is_err());
        assert!(parse_server_settings("config.gameMode = Default\n").is_err());
    }

    #[test]
    fn unknown_keys_and_tables_are_ignored() {
        let settings = parse_server_settings(
            "config.databaseType = \"json\"\n\
             config.disallowedDeleteRefIds = {\n\
                 [\"m12_maar_gan\"] = {\n\
                     \"furn_gravestone\"\n\
                 }\n\
             }\n\
             config.nightEndHour = 7\n",
        )
        .unwrap();
        assert_eq!(settings.night_end_hour, 7);
    }

    #[test]
    fn game_settings_keep_value_kinds() {
        let settings = parse_server_settings(
            "config.gameSettings = {\n\
                 { name = \"best attack\", value = false },\n\
                 { name = \"difficulty\", value = 25 },\n\
                 { name = \"shown text\", value = \"yes, really\" }\n\
             }\n",
        )
        .unwrap();
        assert_eq!(
            settings.game_settings,
            vec![
                NamedSetting {
                    name: "best attack".into(),
                    value: SettingValue::Bool(false),
                },
                NamedSetting {
                    name: "difficulty".into(),
                    value: SettingValue::Number(25.0),
                },
                NamedSetting {
                    name: "shown text".into(),
                    value: SettingValue::String("yes, really".into()),
                },
            ]
        );
    }

    #[test]
    fn spawn_record_overlays_defaults() {
        let settings = parse_server_settings(
            "config.instancedSpawn = {\n\
                 cellDescription = \"Balmora, Guild of Mages\",\n\
                 position = {-755.89, -1002.07, -648.44},\n\
             }\n",
        )
        .unwrap();
        let spawn = &settings.instanced_spawn;
        assert_eq!(spawn.cell_description, "Balmora, Guild of Mages");
        assert_eq!(spawn.position, vec![-755.89, -1002.07, -648.44]);
        assert_eq!(spawn.rotation, ServerSettings::default().instanced_spawn.rotation);
        assert_eq!(spawn.text, ServerSettings::default().instanced_spawn.text);
    }

    #[test]
    fn time_table_and_rank_colors() {
        let settings = parse_server_settings(
            "config.defaultTimeTable = { year = 430, month = 1, day = 2, hour = 3,\n\
                 daysPassed = 4, dayTimeScale = 5, nightTimeScale = 6 }\n\
             config.rankColors = { serverOwner = color.Purple, admin = \"Dark Red\",\n\
                 moderator = color.Green }\n",
        )
        .unwrap();
        assert_eq!(
            settings.default_time_table,
            TimeTable {
                year: 430,
                month: 1,
                day: 2,
                hour: 3,
                days_passed: 4,
                day_time_scale: 5,
                night_time_scale: 6,
            }
        );
        assert_eq!(settings.rank_colors.server_owner, "Purple");
        assert_eq!(settings.rank_colors.admin, "Dark Red");
    }

    #[test]
    fn unterminated_table_is_an_error() {
        let err = parse_server_settings("config.forbiddenCells = {\n\"A\",\n").unwrap_err();
        assert!(matches!(err, CoreError::Parse { ref key, .. } if key == "forbiddenCells"));
    }

    #[test]
    fn bad_nested_value_is_qualified() {
        let err =
            parse_server_settings("config.defaultRespawn = { position = {1, x, 3} }").unwrap_err();
        assert!(err.to_string().contains("defaultRespawn.position"));
    }
}
