use serde::{Deserialize, Serialize};

/// A `value = ...` entry from a settings override table. Keeps whichever of
/// the three literal kinds the file held so it can be written back as such.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Number(f64),
    String(String),
}

impl SettingValue {
    /// Best-effort typing of an unquoted value: number, then bool, then text.
    pub fn infer(raw: &str) -> Self {
        if let Ok(n) = raw.parse::<i64>() {
            return SettingValue::Number(n as f64);
        }
        if let Ok(n) = raw.parse::<f64>() {
            if n.is_finite() {
                return SettingValue::Number(n);
            }
        }
        match raw {
            "true" => SettingValue::Bool(true),
            "false" => SettingValue::Bool(false),
            _ => SettingValue::String(raw.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedSetting {
    pub name: String,
    pub value: SettingValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeTable {
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub hour: i32,
    pub days_passed: i32,
    pub day_time_scale: i32,
    pub night_time_scale: i32,
}

impl Default for TimeTable {
    fn default() -> Self {
        Self {
            year: 427,
            month: 7,
            day: 16,
            hour: 9,
            days_passed: 1,
            day_time_scale: 30,
            night_time_scale: 40,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpawnLocation {
    pub cell_description: String,
    pub position: Vec<f64>,
    pub rotation: Vec<f64>,
    pub text: String,
}

impl SpawnLocation {
    fn instanced() -> Self {
        Self {
            cell_description: "Seyda Neen, Census and Excise Office".to_string(),
            position: vec![1130.3388671875, -387.14947509766, 193.0],
            rotation: vec![0.09375, 1.5078122615814],
            text: "Multiplayer skips several minutes of the game's introduction and places you \
                   at the first quest giver."
                .to_string(),
        }
    }

    fn noninstanced() -> Self {
        Self {
            cell_description: "-3, -2".to_string(),
            position: vec![-23894.0, -15079.0, 505.0],
            rotation: vec![0.0, 1.2],
            text: "Multiplayer skips over the original character generation.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespawnLocation {
    pub cell_description: String,
    pub position: Vec<f64>,
    pub rotation: Vec<f64>,
}

impl Default for RespawnLocation {
    fn default() -> Self {
        Self {
            cell_description: "Balmora, Temple".to_string(),
            position: vec![4700.5673828125, 3874.7416992188, 14758.990234375],
            rotation: vec![0.25314688682556, 1.570611000061],
        }
    }
}

/// Color names from the server's `color` module, e.g. `Orange` for
/// `color.Orange`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankColors {
    pub server_owner: String,
    pub admin: String,
    pub moderator: String,
}

impl Default for RankColors {
    fn default() -> Self {
        Self {
            server_owner: "Orange".to_string(),
            admin: "Red".to_string(),
            moderator: "Green".to_string(),
        }
    }
}

/// Everything the launcher manages in `server/scripts/config.lua`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    pub game_mode: String,
    pub login_time: i32,
    #[serde(rename = "maxClientsPerIP")]
    pub max_clients_per_ip: i32,
    pub difficulty: i32,
    pub game_settings: Vec<NamedSetting>,
    pub vr_settings: Vec<NamedSetting>,
    pub default_time_table: TimeTable,
    pub world_startup_scripts: Vec<String>,
    pub player_startup_scripts: Vec<String>,
    pub pass_time_when_empty: bool,
    pub night_start_hour: i32,
    pub night_end_hour: i32,
    pub allow_console: bool,
    pub allow_bed_rest: bool,
    pub allow_wilderness_rest: bool,
    pub allow_wait: bool,
    pub share_journal: bool,
    pub share_faction_ranks: bool,
    pub share_faction_expulsion: bool,
    pub share_faction_reputation: bool,
    pub share_topics: bool,
    pub share_bounty: bool,
    pub share_reputation: bool,
    pub share_map_exploration: bool,
    pub share_videos: bool,
    pub use_instanced_spawn: bool,
    pub instanced_spawn: SpawnLocation,
    pub noninstanced_spawn: SpawnLocation,
    pub default_respawn: RespawnLocation,
    pub respawn_at_imperial_shrine: bool,
    pub respawn_at_tribunal_temple: bool,
    pub forbidden_cells: Vec<String>,
    pub max_attribute_value: i32,
    pub max_speed_value: i32,
    pub max_skill_value: i32,
    pub max_acrobatics_value: i32,
    pub ignore_modifier_with_max_skill: bool,
    pub banned_equipment_items: Vec<String>,
    pub players_respawn: bool,
    pub death_time: i32,
    pub death_penalty_jail_days: i32,
    pub bounty_reset_on_death: bool,
    pub bounty_death_penalty: bool,
    pub allow_suicide_command: bool,
    pub allow_fixme_command: bool,
    pub fixme_interval: i32,
    pub rank_colors: RankColors,
    pub ping_difference_required_for_authority: i32,
    pub enforced_log_level: i32,
    pub physics_framerate: i32,
    pub allow_on_container_for_unloaded_cells: bool,
    pub enable_player_collision: bool,
    pub enable_actor_collision: bool,
    pub enable_placed_object_collision: bool,
    pub enforced_collision_ref_ids: Vec<String>,
    pub use_actor_collision_for_placed_objects: bool,
    pub maximum_object_scale: f64,
    pub enforce_data_files: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            game_mode: "Default".to_string(),
            login_time: 60,
            max_clients_per_ip: 3,
            difficulty: 0,
            game_settings: Vec::new(),
            vr_settings: Vec::new(),
            default_time_table: TimeTable::default(),
            world_startup_scripts: Vec::new(),
            player_startup_scripts: Vec::new(),
            pass_time_when_empty: false,
            night_start_hour: 20,
            night_end_hour: 6,
            allow_console: false,
            allow_bed_rest: true,
            allow_wilderness_rest: true,
            allow_wait: true,
            share_journal: true,
            share_faction_ranks: true,
            share_faction_expulsion: false,
            share_faction_reputation: true,
            share_topics: true,
            share_bounty: false,
            share_reputation: true,
            share_map_exploration: false,
            share_videos: true,
            use_instanced_spawn: true,
            instanced_spawn: SpawnLocation::instanced(),
            noninstanced_spawn: SpawnLocation::noninstanced(),
            default_respawn: RespawnLocation::default(),
            respawn_at_imperial_shrine: true,
            respawn_at_tribunal_temple: true,
            forbidden_cells: Vec::new(),
            max_attribute_value: 200,
            max_speed_value: 365,
            max_skill_value: 200,
            max_acrobatics_value: 1200,
            ignore_modifier_with_max_skill: false,
            banned_equipment_items: Vec::new(),
            players_respawn: true,
            death_time: 5,
            death_penalty_jail_days: 5,
            bounty_reset_on_death: false,
            bounty_death_penalty: false,
            allow_suicide_command: true,
            allow_fixme_command: true,
            fixme_interval: 30,
            rank_colors: RankColors::default(),
            ping_difference_required_for_authority: 40,
            enforced_log_level: -1,
            physics_framerate: 60,
            allow_on_container_for_unloaded_cells: false,
            enable_player_collision: true,
            enable_actor_collision: true,
            enable_placed_object_collision: false,
            enforced_collision_ref_ids: Vec::new(),
            use_actor_collision_for_placed_objects: false,
            maximum_object_scale: 2.0,
            enforce_data_files: false,
        }
    }
}

/// Mutable access to one scalar field, keyed by its name in the script.
pub(crate) enum ScalarSlot<'a> {
    Int(&'a mut i32),
    Float(&'a mut f64),
    Bool(&'a mut bool),
    Str(&'a mut String),
}

impl ServerSettings {
    pub(crate) fn scalar_slot(&mut self, key: &str) -> Option<ScalarSlot<'_>> {
        use ScalarSlot::*;
        let slot = match key {
            "gameMode" => Str(&mut self.game_mode),
            "loginTime" => Int(&mut self.login_time),
            "maxClientsPerIP" => Int(&mut self.max_clients_per_ip),
            "difficulty" => Int(&mut self.difficulty),
            "passTimeWhenEmpty" => Bool(&mut self.pass_time_when_empty),
            "nightStartHour" => Int(&mut self.night_start_hour),
            "nightEndHour" => Int(&mut self.night_end_hour),
            "allowConsole" => Bool(&mut self.allow_console),
            "allowBedRest" => Bool(&mut self.allow_bed_rest),
            "allowWildernessRest" => Bool(&mut self.allow_wilderness_rest),
            "allowWait" => Bool(&mut self.allow_wait),
            "shareJournal" => Bool(&mut self.share_journal),
            "shareFactionRanks" => Bool(&mut self.share_faction_ranks),
            "shareFactionExpulsion" => Bool(&mut self.share_faction_expulsion),
            "shareFactionReputation" => Bool(&mut self.share_faction_reputation),
            "shareTopics" => Bool(&mut self.share_topics),
            "shareBounty" => Bool(&mut self.share_bounty),
            "shareReputation" => Bool(&mut self.share_reputation),
            "shareMapExploration" => Bool(&mut self.share_map_exploration),
            "shareVideos" => Bool(&mut self.share_videos),
            "useInstancedSpawn" => Bool(&mut self.use_instanced_spawn),
            "respawnAtImperialShrine" => Bool(&mut self.respawn_at_imperial_shrine),
            "respawnAtTribunalTemple" => Bool(&mut self.respawn_at_tribunal_temple),
            "maxAttributeValue" => Int(&mut self.max_attribute_value),
            "maxSpeedValue" => Int(&mut self.max_speed_value),
            "maxSkillValue" => Int(&mut self.max_skill_value),
            "maxAcrobaticsValue" => Int(&mut self.max_acrobatics_value),
            "ignoreModifierWithMaxSkill" => Bool(&mut self.ignore_modifier_with_max_skill),
            "playersRespawn" => Bool(&mut self.players_respawn),
            "deathTime" => Int(&mut self.death_time),
            "deathPenaltyJailDays" => Int(&mut self.death_penalty_jail_days),
            "bountyResetOnDeath" => Bool(&mut self.bounty_reset_on_death),
            "bountyDeathPenalty" => Bool(&mut self.bounty_death_penalty),
            "allowSuicideCommand" => Bool(&mut self.allow_suicide_command),
            "allowFixmeCommand" => Bool(&mut self.allow_fixme_command),
            "fixmeInterval" => Int(&mut self.fixme_interval),
            "pingDifferenceRequiredForAuthority" => {
                Int(&mut self.ping_difference_required_for_authority)
            }
            "enforcedLogLevel" => Int(&mut self.enforced_log_level),
            "physicsFramerate" => Int(&mut self.physics_framerate),
            "allowOnContainerForUnloadedCells" => {
                Bool(&mut self.allow_on_container_for_unloaded_cells)
            }
            "enablePlayerCollision" => Bool(&mut self.enable_player_collision),
            "enableActorCollision" => Bool(&mut self.enable_actor_collision),
            "enablePlacedObjectCollision" => Bool(&mut self.enable_placed_object_collision),
            "useActorCollisionForPlacedObjects" => {
                Bool(&mut self.use_actor_collision_for_placed_objects)
            }
            "maximumObjectScale" => Float(&mut self.maximum_object_scale),
            "enforceDataFiles" => Bool(&mut self.enforce_data_files),
            _ => return None,
        };
        Some(slot)
    }

    pub(crate) fn string_list_mut(&mut self, key: &str) -> Option<&mut Vec<String>> {
        match key {
            "worldStartupScripts" => Some(&mut self.world_startup_scripts),
            "playerStartupScripts" => Some(&mut self.player_startup_scripts),
            "forbiddenCells" => Some(&mut self.forbidden_cells),
            "bannedEquipmentItems" => Some(&mut self.banned_equipment_items),
            "enforcedCollisionRefIds" => Some(&mut self.enforced_collision_ref_ids),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infer_prefers_numbers_then_bools() {
        assert_eq!(SettingValue::infer("3"), SettingValue::Number(3.0));
        assert_eq!(SettingValue::infer("0.25"), SettingValue::Number(0.25));
        assert_eq!(SettingValue::infer("true"), SettingValue::Bool(true));
        assert_eq!(SettingValue::infer("inf"), SettingValue::String("inf".into()));
        assert_eq!(SettingValue::infer("win1252"), SettingValue::String("win1252".into()));
    }

    #[test]
    fn setting_value_json_is_untagged() {
        let setting: NamedSetting =
            serde_json::from_str(r#"{"name":"best attack","value":false}"#).unwrap();
        assert_eq!(setting.value, SettingValue::Bool(false));
        let json = serde_json::to_value(NamedSetting {
            name: "x".into(),
            value: SettingValue::String("y".into()),
        })
        .unwrap();
        assert_eq!(json["value"], "y");
    }

    #[test]
    fn record_json_uses_script_key_names() {
        let json = serde_json::to_value(ServerSettings::default()).unwrap();
        assert_eq!(json["maxClientsPerIP"], 3);
        assert_eq!(json["nightStartHour"], 20);
        assert_eq!(json["rankColors"]["serverOwner"], "Orange");
        assert_eq!(json["defaultTimeTable"]["daysPassed"], 1);
    }

    #[test]
    fn scalar_slots_cover_every_scalar_key() {
        let mut settings = ServerSettings::default();
        for key in ["gameMode", "loginTime", "maximumObjectScale", "enforceDataFiles"] {
            assert!(settings.scalar_slot(key).is_some(), "{key}");
        }
        assert!(settings.scalar_slot("gameSettings").is_none());
        assert!(settings.string_list_mut("forbiddenCells").is_some());
    }
}
