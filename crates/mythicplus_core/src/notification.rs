//! Notification content for score changes and leaderboards.

use crate::config::Region;
use crate::entities::{
    Character, MessageAuthor, MessageField, RaiderIoProfile, Rank, RichMessage,
};

const CLASS_ICON_BASE: &str = "https://render.worldofwarcraft.com/us/icons/18/";

/// Build the announcement for a character whose overall score changed.
///
/// `character` must already carry the merged scores; `old_score` is the
/// overall score before the merge.
pub fn build_score_update_message(
    character: &Character,
    profile: &RaiderIoProfile,
    old_score: f64,
) -> RichMessage {
    let verb = if character.overall_score >= old_score {
        "increased"
    } else {
        "decreased"
    };

    let profile_url = non_empty(&profile.profile_url);
    let content = match &profile_url {
        Some(url) => format!(
            "[{}]({}) {} their score from {:.2} to {:.2}",
            character, url, verb, old_score, character.overall_score
        ),
        None => format!(
            "{} {} their score from {:.2} to {:.2}",
            character, verb, old_score, character.overall_score
        ),
    };

    RichMessage {
        content: Some(content),
        title: format!("{:.2} Overall Mythic+ Score", character.overall_score),
        url: profile_url,
        description: Some(build_description(character, profile)),
        color: class_colour(&character.class),
        image_url: profile
            .latest_run()
            .and_then(|run| non_empty(&run.background_image_url)),
        thumbnail_url: non_empty(&profile.thumbnail_url),
        author: Some(MessageAuthor {
            name: format!("{} ({})", character, character.class),
            icon_url: Some(class_icon(&character.class)),
        }),
        fields: Vec::new(),
    }
}

fn build_description(character: &Character, profile: &RaiderIoProfile) -> String {
    let mut lines = Vec::new();

    for (role, score) in [
        ("Tank", character.tank_score),
        ("Healer", character.heal_score),
        ("DPS", character.dps_score),
    ] {
        if score != 0.0 {
            lines.push(format!("**{} Score** {:.2}", role, score));
        }
    }

    let ranks = &profile.mythic_plus_ranks;
    lines.push(String::new());
    lines.push("**--- Ranks ---**".to_string());
    lines.push(format!(
        "**#{} Realm - #{} Overall**",
        ranks.overall.realm, ranks.overall.world
    ));

    let season = profile.current_season();
    let role_ranks: [(&str, f64, Rank); 3] = [
        ("Tank", season.scores.tank, ranks.tank),
        ("Healer", season.scores.healer, ranks.healer),
        ("DPS", season.scores.dps, ranks.dps),
    ];
    for (role, score, rank) in role_ranks {
        if score != 0.0 {
            lines.push(format!(
                "**{}**: #{} Realm - #{} Overall",
                role, rank.realm, rank.world
            ));
        }
    }

    if let Some(run) = profile.latest_run() {
        lines.push(String::new());
        lines.push("**--- Last Run ---**".to_string());
        lines.push(format!("**Dungeon**: {}", run.dungeon));
        lines.push(format!("**Level**: {}", run.mythic_level));
        lines.push(format!("**Result**: +{}", run.num_keystone_upgrades));
        lines.push(format!("**Points**: {:.2}", run.score));
        if !run.url.is_empty() {
            lines.push(format!("[More Info]({})", run.url));
        }
    }

    lines.join("\n")
}

const LEADERBOARD_TITLE: &str = "Tracked Characters";
const LEADERBOARD_COLOUR: u32 = 2326507;
const NO_CHARACTERS: &str = "No characters are being tracked.";
const TRUNCATED_NOTE: &str = "\nToo many characters tracked - use `list` instead.";
/// Discord embed limits
const MAX_FIELD_CHARS: usize = 1024;
const MAX_FIELDS: usize = 24;
const MAX_EMBED_CHARS: usize = 6000;
const BLANK_FIELD_NAME: &str = "\u{200b}";

fn leaderboard_link(position: usize, character: &Character, region: Region) -> String {
    format!(
        "{}) [{}](https://raider.io/characters/{}/{}/{})",
        position, character, region, character.realm, character.name
    )
}

/// Numbered plain-text leaderboard with Raider.IO profile links
pub fn build_leaderboard_text(characters: &[Character], region: Region) -> String {
    if characters.is_empty() {
        return NO_CHARACTERS.to_string();
    }

    characters
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} {:.2}", leaderboard_link(i + 1, c, region), c.overall_score))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Leaderboard embed: character links and scores as side-by-side inline
/// columns, split into as many field pairs as the embed limits allow.
/// Characters that do not fit are replaced by a pointer to `list`.
pub fn build_leaderboard_message(characters: &[Character], region: Region) -> RichMessage {
    if characters.is_empty() {
        return RichMessage {
            title: LEADERBOARD_TITLE.to_string(),
            description: Some(NO_CHARACTERS.to_string()),
            color: LEADERBOARD_COLOUR,
            ..RichMessage::default()
        };
    }

    RichMessage {
        title: LEADERBOARD_TITLE.to_string(),
        color: LEADERBOARD_COLOUR,
        fields: leaderboard_fields(characters, region),
        ..RichMessage::default()
    }
}

fn leaderboard_fields(characters: &[Character], region: Region) -> Vec<MessageField> {
    let column = |value: String| MessageField {
        name: BLANK_FIELD_NAME.to_string(),
        value,
        inline: true,
    };
    // room for the truncation note is always kept free
    let field_budget = MAX_FIELD_CHARS - TRUNCATED_NOTE.len();
    let pair_overhead = 2 * BLANK_FIELD_NAME.len();

    let mut fields = Vec::new();
    let mut names = String::new();
    let mut scores = String::new();
    let mut committed = LEADERBOARD_TITLE.len();

    for (i, c) in characters.iter().enumerate() {
        let name_line = format!("{}\n", leaderboard_link(i + 1, c, region));
        let score_line = format!("{:.2}\n", c.overall_score);

        let new_pair = !names.is_empty() && names.len() + name_line.len() > field_budget;
        let mut needed = committed
            + names.len()
            + scores.len()
            + pair_overhead
            + name_line.len()
            + score_line.len()
            + TRUNCATED_NOTE.len();
        if new_pair {
            needed += pair_overhead;
        }

        if needed > MAX_EMBED_CHARS || (new_pair && fields.len() + 2 >= MAX_FIELDS) {
            names.push_str(TRUNCATED_NOTE);
            break;
        }

        if new_pair {
            committed += names.len() + scores.len() + pair_overhead;
            fields.push(column(std::mem::take(&mut names)));
            fields.push(column(std::mem::take(&mut scores)));
        }
        names.push_str(&name_line);
        scores.push_str(&score_line);
    }

    if !names.is_empty() {
        fields.push(column(names));
        fields.push(column(scores));
    }
    fields
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Raider.IO reports "Death Knight", Battle.net "DeathKnight"
fn class_key(class: &str) -> String {
    class.chars().filter(|c| !c.is_whitespace()).collect()
}

/// URL of the Blizzard-hosted icon for a class
pub fn class_icon(class: &str) -> String {
    let index = match class_key(class).as_str() {
        "Warrior" => 1,
        "Paladin" => 2,
        "Hunter" => 3,
        "Rogue" => 4,
        "Priest" => 5,
        "DeathKnight" => 6,
        "Shaman" => 7,
        "Mage" => 8,
        "Warlock" => 9,
        "Monk" => 10,
        "Druid" => 11,
        "DemonHunter" => 12,
        // No evoker icon is published at this size
        _ => 2,
    };
    format!("{}class_{}.jpg", CLASS_ICON_BASE, index)
}

/// Class colour as a 24-bit RGB value
pub fn class_colour(class: &str) -> u32 {
    match class_key(class).as_str() {
        "Warrior" => 0xC69B6D,
        "Paladin" => 0xF48CBA,
        "Hunter" => 0xAAD372,
        "Rogue" => 0xFFF468,
        "Priest" => 0xFFFFFF,
        "DeathKnight" => 0xC41E3A,
        "Shaman" => 0x0070DD,
        "Mage" => 0x3FC7EB,
        "Warlock" => 0x8788EE,
        "Monk" => 0x00FF98,
        "Druid" => 0xFF7C0A,
        "DemonHunter" => 0xA330C9,
        "Evoker" => 0x33937F,
        _ => 0,
    }
}
