//! The version-gated field walk over the uncompressed header block.
//!
//! The layout is empirically reverse-engineered. Separator words and
//! unknown fields are consumed with explicit widths and never interpreted;
//! if a future format version shifts them, the string tags stop lining up
//! and decoding fails loudly rather than producing shifted garbage.

use cursor::ByteCursor;
use serde::Serialize;
use tracing::debug;

use crate::error::{HeaderError, HeaderResult};

/// Oldest save version the player-block layout is known for.
const MIN_SUPPORTED_VERSION: f32 = 1004.0;

/// One of the eight fixed player slots in the header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSlot {
    /// Believed to be a hash of the player's data files.
    pub data_crc: u32,
    pub mp_version: u16,
    pub team: u32,
    pub civ: u32,
    pub ai_base_name: String,
    pub ai_civ_name_idx: u8,
    /// Present from save version 1005.0 on; purpose unknown.
    pub unknown_name: Option<String>,
    pub name: String,
    pub humanity: u32,
    pub steam_id: u64,
    pub player_index: u32,
    pub scenario_index: u32,
}

/// The decoded header: scenario/config fields plus the active players.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameHeader {
    /// The save version as the file stores it: a float.
    pub save_version: f32,
    pub datasets: Vec<u32>,
    pub difficulty: u32,
    pub map_size: u32,
    pub map_id: u32,
    pub reveal_map: u32,
    pub victory_type: u32,
    pub starting_resources: u32,
    pub starting_age: u32,
    pub ending_age: u32,
    pub game_type: u32,
    /// Only stored by save version 1000.0 files.
    pub map_name: Option<String>,
    pub game_speed: f32,
    pub treaty_length: u32,
    pub pop_limit: u32,
    pub num_players: u32,
    pub trading_enabled: bool,
    pub team_bonus_disabled: bool,
    pub randomize_positions: bool,
    pub full_tech_tree_enabled: bool,
    pub number_of_starting_units: u8,
    pub teams_locked: bool,
    pub speed_locked: bool,
    pub multiplayer: bool,
    pub cheats_enabled: bool,
    pub record_game_enabled: bool,
    pub animals_enabled: bool,
    pub predators_enabled: bool,
    /// The first `num_players` of the eight stored slots.
    pub players: Vec<PlayerSlot>,
    pub fog_of_war: u8,
    pub cheat_notification: bool,
    pub colored_chat: bool,
    pub is_ranked: bool,
    pub allow_spectators: bool,
    pub lobby_visibility: u32,
    pub custom_random_map_file_crc: u32,
    pub custom_scenario_or_campaign_file: String,
    pub custom_random_map_file: String,
    pub custom_random_map_scenario_file: String,
    pub guid: [u8; 16],
    pub game_title: String,
    pub modded_dataset_title: String,
    pub modded_dataset_workshop_id: u64,
}

/// Reads the version tag and subversion from the first 12 header bytes.
///
/// The tag is a fixed 8-byte nul-padded string (`"VER 9.4"` in current
/// files) followed by a float subversion.
pub fn read_version(cursor: &mut ByteCursor<'_>) -> HeaderResult<(String, f32)> {
    cursor.seek(0);
    let raw = cursor.read(8)?;
    let tag = raw
        .iter()
        .take_while(|b| **b != 0)
        .map(|b| char::from(*b))
        .collect::<String>();
    let sub_version = cursor.read_f32()?;
    Ok((tag, sub_version))
}

impl GameHeader {
    /// Decodes the full header block.
    #[allow(clippy::too_many_lines, clippy::float_cmp)]
    pub fn decode(cursor: &mut ByteCursor<'_>) -> HeaderResult<Self> {
        cursor.seek(12);
        let save_version = cursor.read_f32()?;
        debug!(save_version, "decoding header");
        cursor.read_u32()?;
        cursor.read_u32()?;

        // No one knows what the datasets words mean, only that they must be
        // consumed to stay aligned.
        let datasets_count = cursor.read_u32()?;
        let mut datasets = Vec::with_capacity((datasets_count as usize).min(64));
        for _ in 0..datasets_count {
            datasets.push(cursor.read_u32()?);
        }

        let difficulty = cursor.read_u32()?;
        let map_size = cursor.read_u32()?;
        let map_id = cursor.read_u32()?;
        let reveal_map = cursor.read_u32()?;
        let victory_type = cursor.read_u32()?;
        let starting_resources = cursor.read_u32()?;
        let starting_age = cursor.read_u32()?;
        let ending_age = cursor.read_u32()?;
        let game_type = cursor.read_u32()?;

        if save_version >= 1006.0 {
            // Extra word introduced in HD 5.8.
            cursor.read_u32()?;
        }

        cursor.read_u32()?; // separator

        let map_name = if save_version == 1000.0 {
            let name = cursor.read_string()?;
            cursor.read_string()?; // pad string
            Some(name)
        } else {
            None
        };

        cursor.read_u32()?; // separator

        let game_speed = cursor.read_f32()?;
        let treaty_length = cursor.read_u32()?;
        let pop_limit = cursor.read_u32()?;
        let num_players = cursor.read_u32()?;

        cursor.read_u32()?;
        cursor.read_u32()?;
        cursor.read_u32()?; // separator

        let trading_enabled = cursor.read_u8()? != 0;
        let team_bonus_disabled = cursor.read_u8()? != 0;
        let randomize_positions = cursor.read_u8()? != 0;
        let full_tech_tree_enabled = cursor.read_u8()? != 0;
        let number_of_starting_units = cursor.read_u8()?;
        let teams_locked = cursor.read_u8()? != 0;
        let speed_locked = cursor.read_u8()? != 0;
        let multiplayer = cursor.read_u8()? != 0;
        let cheats_enabled = cursor.read_u8()? != 0;
        let record_game_enabled = cursor.read_u8()? != 0;
        let animals_enabled = cursor.read_u8()? != 0;
        let predators_enabled = cursor.read_u8()? != 0;

        cursor.read_u32()?; // separator
        cursor.read_u32()?;
        cursor.read_u32()?;

        if save_version < MIN_SUPPORTED_VERSION {
            return Err(HeaderError::UnsupportedVersion {
                version: save_version,
            });
        }

        debug!(position = cursor.tell(), "reading player slots");
        let mut slots = Vec::with_capacity(8);
        for _ in 0..8 {
            slots.push(Self::decode_player(cursor, save_version)?);
        }
        let players = slots
            .into_iter()
            .take(num_players as usize)
            .collect::<Vec<_>>();

        cursor.read_u8()?;

        let fog_of_war = cursor.read_u8()?;
        let cheat_notification = cursor.read_u8()? != 0;
        let colored_chat = cursor.read_u8()? != 0;

        cursor.read_u32()?; // separator

        let is_ranked = cursor.read_u8()? != 0;
        let allow_spectators = cursor.read_u8()? != 0;

        let lobby_visibility = cursor.read_u32()?;
        let custom_random_map_file_crc = cursor.read_u32()?;

        let custom_scenario_or_campaign_file = cursor.read_string()?;
        cursor.read_u64()?;
        let custom_random_map_file = cursor.read_string()?;
        cursor.read_u64()?;
        let custom_random_map_scenario_file = cursor.read_string()?;
        cursor.read_u64()?;

        let mut guid = [0u8; 16];
        guid.copy_from_slice(cursor.read(16)?);
        let game_title = cursor.read_string()?;
        let modded_dataset_title = cursor.read_string()?;
        let modded_dataset_workshop_id = cursor.read_u64()?;

        if save_version >= 1005.0 {
            cursor.read_string()?;
            cursor.read_u32()?;
        } else {
            cursor.read_u64()?;
        }

        Ok(Self {
            save_version,
            datasets,
            difficulty,
            map_size,
            map_id,
            reveal_map,
            victory_type,
            starting_resources,
            starting_age,
            ending_age,
            game_type,
            map_name,
            game_speed,
            treaty_length,
            pop_limit,
            num_players,
            trading_enabled,
            team_bonus_disabled,
            randomize_positions,
            full_tech_tree_enabled,
            number_of_starting_units,
            teams_locked,
            speed_locked,
            multiplayer,
            cheats_enabled,
            record_game_enabled,
            animals_enabled,
            predators_enabled,
            players,
            fog_of_war,
            cheat_notification,
            colored_chat,
            is_ranked,
            allow_spectators,
            lobby_visibility,
            custom_random_map_file_crc,
            custom_scenario_or_campaign_file,
            custom_random_map_file,
            custom_random_map_scenario_file,
            guid,
            game_title,
            modded_dataset_title,
            modded_dataset_workshop_id,
        })
    }

    fn decode_player(cursor: &mut ByteCursor<'_>, save_version: f32) -> HeaderResult<PlayerSlot> {
        cursor.read_u16()?;

        let data_crc = cursor.read_u32()?;
        let mp_version = if save_version >= 1006.0 {
            cursor.read_u16()?
        } else {
            u16::from(cursor.read_u8()?)
        };
        let team = cursor.read_u32()?;
        let civ = cursor.read_u32()?;
        let ai_base_name = cursor.read_string()?;
        let ai_civ_name_idx = cursor.read_u8()?;
        let unknown_name = if save_version >= 1005.0 {
            Some(cursor.read_string()?)
        } else {
            None
        };
        let name = cursor.read_string()?;
        debug!(name = %name, position = cursor.tell(), "read player slot");
        let humanity = cursor.read_u32()?;
        let steam_id = cursor.read_u64()?;
        let player_index = cursor.read_u32()?;
        cursor.read_u32()?;
        let scenario_index = cursor.read_u32()?;
        // Trailing block of unknown meaning; consuming it re-aligns the
        // next slot's strings.
        cursor.read(8)?;

        Ok(PlayerSlot {
            data_crc,
            mp_version,
            team,
            civ,
            ai_base_name,
            ai_civ_name_idx,
            unknown_name,
            name,
            humanity,
            steam_id,
            player_index,
            scenario_index,
        })
    }
}
