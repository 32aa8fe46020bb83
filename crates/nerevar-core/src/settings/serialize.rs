use super::lua::{is_identifier, quote};
use super::model::{
    NamedSetting, RankColors, RespawnLocation, ServerSettings, SettingValue, SpawnLocation,
    TimeTable,
};
use std::fmt::Write;

const HEADER: &str = "\
-- TES3MP server configuration
-- Generated by Nerevar. Values edited here are picked up the next time the
-- launcher opens the server settings.
";

struct Script {
    out: String,
}

impl Script {
    fn new() -> Self {
        let mut out = String::from(HEADER);
        out.push_str("\nconfig = {}\n");
        Self { out }
    }

    fn field(&mut self, comment: &str, key: &str, value: impl AsRef<str>) {
        let _ = write!(self.out, "\n-- {comment}\nconfig.{key} = {}\n", value.as_ref());
    }

    fn finish(mut self) -> String {
        self.out.push_str("\nreturn config\n");
        self.out
    }
}

fn float(value: f64) -> String {
    value.to_string()
}

fn bool_lit(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn float_array(values: &[f64]) -> String {
    let items: Vec<String> = values.iter().copied().map(float).collect();
    format!("{{ {} }}", items.join(", "))
}

fn string_list(values: &[String]) -> String {
    if values.is_empty() {
        return "{}".to_string();
    }
    let items: Vec<String> = values.iter().map(|v| quote(v)).collect();
    format!("{{ {} }}", items.join(", "))
}

fn setting_value(value: &SettingValue) -> String {
    match value {
        SettingValue::Bool(b) => bool_lit(*b).to_string(),
        SettingValue::Number(n) => float(*n),
        SettingValue::String(s) => quote(s),
    }
}

fn named_settings(entries: &[NamedSetting]) -> String {
    if entries.is_empty() {
        return "{}".to_string();
    }
    let mut out = String::from("{\n");
    for entry in entries {
        let _ = writeln!(
            out,
            "    {{ name = {}, value = {} }},",
            quote(&entry.name),
            setting_value(&entry.value)
        );
    }
    out.push('}');
    out
}

fn time_table(table: &TimeTable) -> String {
    format!(
        "{{ year = {}, month = {}, day = {}, hour = {}, daysPassed = {}, \
         dayTimeScale = {}, nightTimeScale = {} }}",
        table.year,
        table.month,
        table.day,
        table.hour,
        table.days_passed,
        table.day_time_scale,
        table.night_time_scale
    )
}

fn spawn(location: &SpawnLocation) -> String {
    format!(
        "{{\n    cellDescription = {},\n    position = {},\n    rotation = {},\n    text = {}\n}}",
        quote(&location.cell_description),
        float_array(&location.position),
        float_array(&location.rotation),
        quote(&location.text)
    )
}

fn respawn(location: &RespawnLocation) -> String {
    format!(
        "{{\n    cellDescription = {},\n    position = {},\n    rotation = {}\n}}",
        quote(&location.cell_description),
        float_array(&location.position),
        float_array(&location.rotation)
    )
}

fn color(name: &str) -> String {
    if is_identifier(name) {
        format!("color.{name}")
    } else {
        quote(name)
    }
}

fn rank_colors(colors: &RankColors) -> String {
    format!(
        "{{ serverOwner = {}, admin = {}, moderator = {} }}",
        color(&colors.server_owner),
        color(&colors.admin),
        color(&colors.moderator)
    )
}

/// Emits a complete `config.lua` for `settings`. Every managed key is written,
/// so reading the output back yields an equal record.
pub fn serialize_server_settings(s: &ServerSettings) -> String {
    let mut script = Script::new();

    script.field(
        "The game mode displayed for this server in the server browser",
        "gameMode",
        quote(&s.game_mode),
    );
    script.field("Time to login, in seconds", "loginTime", s.login_time.to_string());
    script.field(
        "How many clients are allowed to connect from the same IP address",
        "maxClientsPerIP",
        s.max_clients_per_ip.to_string(),
    );
    script.field("The difficulty level used by default", "difficulty", s.difficulty.to_string());
    script.field(
        "Game settings enforced for all players",
        "gameSettings",
        named_settings(&s.game_settings),
    );
    script.field(
        "VR settings enforced for all players",
        "vrSettings",
        named_settings(&s.vr_settings),
    );
    script.field(
        "The world time used for a newly created world",
        "defaultTimeTable",
        time_table(&s.default_time_table),
    );
    script.field(
        "Scripts run once when the world is first created",
        "worldStartupScripts",
        string_list(&s.world_startup_scripts),
    );
    script.field(
        "Scripts run once for every newly created player",
        "playerStartupScripts",
        string_list(&s.player_startup_scripts),
    );
    script.field(
        "Whether time should pass when there are no players on the server",
        "passTimeWhenEmpty",
        bool_lit(s.pass_time_when_empty),
    );
    script.field(
        "The hour at which night is considered to start",
        "nightStartHour",
        s.night_start_hour.to_string(),
    );
    script.field(
        "The hour at which night is considered to end",
        "nightEndHour",
        s.night_end_hour.to_string(),
    );
    script.field(
        "Whether players can use the console window",
        "allowConsole",
        bool_lit(s.allow_console),
    );
    script.field("Whether players can rest in beds", "allowBedRest", bool_lit(s.allow_bed_rest));
    script.field(
        "Whether players can rest in the wilderness",
        "allowWildernessRest",
        bool_lit(s.allow_wilderness_rest),
    );
    script.field("Whether players can wait", "allowWait", bool_lit(s.allow_wait));
    script.field(
        "Whether journal entries are shared across players",
        "shareJournal",
        bool_lit(s.share_journal),
    );
    script.field(
        "Whether faction ranks are shared across players",
        "shareFactionRanks",
        bool_lit(s.share_faction_ranks),
    );
    script.field(
        "Whether faction expulsion is shared across players",
        "shareFactionExpulsion",
        bool_lit(s.share_faction_expulsion),
    );
    script.field(
        "Whether faction reputation is shared across players",
        "shareFactionReputation",
        bool_lit(s.share_faction_reputation),
    );
    script.field(
        "Whether dialogue topics are shared across players",
        "shareTopics",
        bool_lit(s.share_topics),
    );
    script.field(
        "Whether bounties are shared across players",
        "shareBounty",
        bool_lit(s.share_bounty),
    );
    script.field(
        "Whether reputation is shared across players",
        "shareReputation",
        bool_lit(s.share_reputation),
    );
    script.field(
        "Whether map exploration is shared across players",
        "shareMapExploration",
        bool_lit(s.share_map_exploration),
    );
    script.field(
        "Whether ingame videos are played for all players",
        "shareVideos",
        bool_lit(s.share_videos),
    );
    script.field(
        "Whether the instanced spawn is used instead of the noninstanced one",
        "useInstancedSpawn",
        bool_lit(s.use_instanced_spawn),
    );
    script.field(
        "Where new players spawn when instanced spawning is enabled",
        "instancedSpawn",
        spawn(&s.instanced_spawn),
    );
    script.field(
        "Where new players spawn when instanced spawning is disabled",
        "noninstancedSpawn",
        spawn(&s.noninstanced_spawn),
    );
    script.field(
        "The default location players respawn at",
        "defaultRespawn",
        respawn(&s.default_respawn),
    );
    script.field(
        "Whether players respawn at the nearest Imperial shrine",
        "respawnAtImperialShrine",
        bool_lit(s.respawn_at_imperial_shrine),
    );
    script.field(
        "Whether players respawn at the nearest Tribunal temple",
        "respawnAtTribunalTemple",
        bool_lit(s.respawn_at_tribunal_temple),
    );
    script.field(
        "Cells players are not allowed to enter",
        "forbiddenCells",
        string_list(&s.forbidden_cells),
    );
    script.field(
        "The maximum value of any attribute except Speed",
        "maxAttributeValue",
        s.max_attribute_value.to_string(),
    );
    script.field("The maximum value of Speed", "maxSpeedValue", s.max_speed_value.to_string());
    script.field(
        "The maximum value of any skill except Acrobatics",
        "maxSkillValue",
        s.max_skill_value.to_string(),
    );
    script.field(
        "The maximum value of Acrobatics",
        "maxAcrobaticsValue",
        s.max_acrobatics_value.to_string(),
    );
    script.field(
        "Whether fortify modifiers are ignored once a skill is at its maximum",
        "ignoreModifierWithMaxSkill",
        bool_lit(s.ignore_modifier_with_max_skill),
    );
    script.field(
        "Item refIds players are not allowed to equip",
        "bannedEquipmentItems",
        string_list(&s.banned_equipment_items),
    );
    script.field(
        "Whether players respawn after dying",
        "playersRespawn",
        bool_lit(s.players_respawn),
    );
    script.field(
        "Time to stay dead before respawning, in seconds",
        "deathTime",
        s.death_time.to_string(),
    );
    script.field(
        "Days spent in jail as a penalty for dying",
        "deathPenaltyJailDays",
        s.death_penalty_jail_days.to_string(),
    );
    script.field(
        "Whether bounties are reset to 0 after dying",
        "bountyResetOnDeath",
        bool_lit(s.bounty_reset_on_death),
    );
    script.field(
        "Whether players spend time in jail proportional to their bounty after dying",
        "bountyDeathPenalty",
        bool_lit(s.bounty_death_penalty),
    );
    script.field(
        "Whether players can use the /suicide command",
        "allowSuicideCommand",
        bool_lit(s.allow_suicide_command),
    );
    script.field(
        "Whether players can use the /fixme command",
        "allowFixmeCommand",
        bool_lit(s.allow_fixme_command),
    );
    script.field(
        "Seconds players have to wait between uses of /fixme",
        "fixmeInterval",
        s.fixme_interval.to_string(),
    );
    script.field("Chat colors used for each staff rank", "rankColors", rank_colors(&s.rank_colors));
    script.field(
        "Ping difference required to take over cell authority",
        "pingDifferenceRequiredForAuthority",
        s.ping_difference_required_for_authority.to_string(),
    );
    script.field(
        "Log level enforced on clients, -1 to leave it to each client",
        "enforcedLogLevel",
        s.enforced_log_level.to_string(),
    );
    script.field(
        "Physics framerate used by default",
        "physicsFramerate",
        s.physics_framerate.to_string(),
    );
    script.field(
        "Whether container data can be sent for cells that are not loaded",
        "allowOnContainerForUnloadedCells",
        bool_lit(s.allow_on_container_for_unloaded_cells),
    );
    script.field(
        "Whether players collide with each other",
        "enablePlayerCollision",
        bool_lit(s.enable_player_collision),
    );
    script.field(
        "Whether actors collide with each other",
        "enableActorCollision",
        bool_lit(s.enable_actor_collision),
    );
    script.field(
        "Whether placed objects have collision",
        "enablePlacedObjectCollision",
        bool_lit(s.enable_placed_object_collision),
    );
    script.field(
        "Object refIds that always have collision",
        "enforcedCollisionRefIds",
        string_list(&s.enforced_collision_ref_ids),
    );
    script.field(
        "Whether placed objects use actor collision",
        "useActorCollisionForPlacedObjects",
        bool_lit(s.use_actor_collision_for_placed_objects),
    );
    script.field(
        "The largest scale an object can be set to",
        "maximumObjectScale",
        float(s.maximum_object_scale),
    );
    script.field(
        "Whether clients must use the same data files as the server",
        "enforceDataFiles",
        bool_lit(s.enforce_data_files),
    );

    script.finish()
}
