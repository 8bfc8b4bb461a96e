//! Wire models for the PostgREST backend, including the normalizing decode
//! of fields the store delivers in more than one representation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::dao::models::{
    DEFAULT_DURATION_MINUTES, GameEntity, GameRecordPatch, GameSnapshot, GameStatus,
    NewGameRecord, PLACEHOLDER_DISPLAY_NAME, ParticipantEntity,
};

pub const GAMES_TABLE: &str = "games";
pub const PARTICIPANTS_TABLE: &str = "game_participants";

/// Embedded select fetching a game with its participants and their profiles
/// in a single round trip.
pub const GAME_SELECT: &str =
    "*,game_participants(user_id,created_at,voted_time,note,profiles(id,full_name,avatar_url))";

/// Raw game row as returned by the endpoint.
#[derive(Debug, Deserialize)]
pub struct GameRow {
    pub id: Uuid,
    pub date: Date,
    pub time: String,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default, rename = "type")]
    pub activity_type: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub creator_id: Option<Uuid>,
    #[serde(default)]
    pub alternative_times: Option<Value>,
    #[serde(default)]
    pub is_tentative: Option<bool>,
    #[serde(default)]
    pub game_participants: Vec<ParticipantRow>,
}

impl GameRow {
    /// Normalize the raw row into a snapshot, defaulting every malformed
    /// field rather than failing the whole read.
    pub fn into_snapshot(self) -> GameSnapshot {
        let candidate_times = decode_candidate_times(self.alternative_times.as_ref());

        let mut participants: Vec<ParticipantEntity> = self
            .game_participants
            .into_iter()
            .map(ParticipantRow::into_entity)
            .collect();
        // Join order drives host selection; rows with no timestamp sort first.
        participants.sort_by_key(|participant| participant.joined_at);

        let duration_minutes = match self.duration {
            Some(minutes) if minutes > 0 => minutes as u32,
            _ => DEFAULT_DURATION_MINUTES,
        };

        let game = GameEntity {
            id: self.id,
            date: self.date,
            primary_time: self.time,
            duration_minutes,
            activity_type: self.activity_type.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            note: self.note,
            candidate_times,
            tentative: self.is_tentative.unwrap_or(false),
            status: decode_status(self.status.as_deref()),
            host_id: self.creator_id,
        };

        GameSnapshot { game, participants }
    }
}

/// Raw participant row with its embedded profile.
#[derive(Debug, Deserialize)]
pub struct ParticipantRow {
    pub user_id: Uuid,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub voted_time: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    /// Embedded profile; the endpoint delivers an object or a
    /// single-element array depending on how the relationship is inferred.
    #[serde(default)]
    pub profiles: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ProfileRow {
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    avatar_url: Option<String>,
}

impl ParticipantRow {
    fn into_entity(self) -> ParticipantEntity {
        let profile = decode_profile(self.profiles);
        let (display_name, avatar_url) = match profile {
            Some(profile) => (
                profile
                    .full_name
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| PLACEHOLDER_DISPLAY_NAME.to_owned()),
                profile.avatar_url,
            ),
            None => (PLACEHOLDER_DISPLAY_NAME.to_owned(), None),
        };

        ParticipantEntity {
            user_id: self.user_id,
            joined_at: self.created_at.unwrap_or(OffsetDateTime::UNIX_EPOCH),
            voted_time: self.voted_time,
            status_note: self.note,
            display_name,
            avatar_url,
        }
    }
}

fn decode_profile(raw: Option<Value>) -> Option<ProfileRow> {
    let value = match raw? {
        Value::Array(mut items) => {
            if items.is_empty() {
                return None;
            }
            items.remove(0)
        }
        value @ Value::Object(_) => value,
        _ => return None,
    };

    serde_json::from_value(value).ok()
}

fn decode_status(raw: Option<&str>) -> GameStatus {
    match raw {
        Some("confirmed") => GameStatus::Confirmed,
        Some("cancelled") => GameStatus::Cancelled,
        _ => GameStatus::Scheduled,
    }
}

/// Normalize `alternative_times` into an ordered list of time strings.
///
/// The column has been observed in three shapes: a native JSON array, a
/// JSON-encoded string (`"[\"19:00\"]"`), and a braced delimited string
/// (`{"19:00","20:00"}`). All three yield the same ordered sequence with
/// quoting artifacts stripped.
pub fn decode_candidate_times(raw: Option<&Value>) -> Vec<String> {
    match raw {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str())
            .map(str::to_owned)
            .filter(|time| !time.is_empty())
            .collect(),
        Some(Value::String(text)) => {
            if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(text) {
                return items
                    .iter()
                    .filter_map(|item| item.as_str())
                    .map(str::to_owned)
                    .filter(|time| !time.is_empty())
                    .collect();
            }

            let cleaned = text.trim().trim_start_matches('{').trim_end_matches('}');
            cleaned
                .split(',')
                .map(|part| part.trim().trim_matches('"').to_owned())
                .filter(|time| !time.is_empty())
                .collect()
        }
        Some(_) => Vec::new(),
    }
}

/// Insert payload for a new game row.
#[derive(Debug, Serialize)]
pub struct NewGameRow {
    pub date: Date,
    pub time: String,
    pub duration: u32,
    #[serde(rename = "type")]
    pub activity_type: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub status: GameStatus,
    pub creator_id: Uuid,
    pub alternative_times: Vec<String>,
    pub is_tentative: bool,
}

impl From<NewGameRecord> for NewGameRow {
    fn from(record: NewGameRecord) -> Self {
        Self {
            date: record.date,
            time: record.primary_time,
            duration: record.duration_minutes,
            activity_type: record.activity_type,
            location: record.location,
            note: record.note,
            status: GameStatus::Scheduled,
            creator_id: record.host_id,
            alternative_times: record.candidate_times,
            is_tentative: record.tentative,
        }
    }
}

/// Partial update payload for a game row; absent fields are untouched.
#[derive(Debug, Serialize)]
pub struct GamePatchBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub activity_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternative_times: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_tentative: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<GameStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<Uuid>,
}

impl From<GameRecordPatch> for GamePatchBody {
    fn from(patch: GameRecordPatch) -> Self {
        Self {
            date: patch.date,
            time: patch.primary_time,
            duration: patch.duration_minutes,
            activity_type: patch.activity_type,
            location: patch.location,
            note: patch.note,
            alternative_times: patch.candidate_times,
            is_tentative: patch.tentative,
            status: patch.status,
            creator_id: patch.host_id,
        }
    }
}

/// Upsert payload for a participant row.
#[derive(Debug, Serialize)]
pub struct ParticipantUpsertRow {
    pub game_id: Uuid,
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voted_time: Option<String>,
}

/// Patch payload for a participant's status note; `None` clears it.
#[derive(Debug, Serialize)]
pub struct NotePatchBody {
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn row_with_alternatives(alternatives: Value) -> GameRow {
        serde_json::from_value(json!({
            "id": "7f0c0e9e-4c4b-4f7b-9a75-0d8f3a8f6d11",
            "date": "2026-06-12",
            "time": "18:00",
            "duration": 90,
            "type": "Padel",
            "location": "Central Court",
            "status": "scheduled",
            "alternative_times": alternatives,
        }))
        .unwrap()
    }

    #[test]
    fn candidate_times_decode_matches_across_encodings() {
        let native = row_with_alternatives(json!(["19:00", "20:00"]));
        let json_string = row_with_alternatives(json!("[\"19:00\", \"20:00\"]"));
        let braced = row_with_alternatives(json!("{\"19:00\",\"20:00\"}"));

        let expected = vec!["19:00".to_owned(), "20:00".to_owned()];
        assert_eq!(native.into_snapshot().game.candidate_times, expected);
        assert_eq!(json_string.into_snapshot().game.candidate_times, expected);
        assert_eq!(braced.into_snapshot().game.candidate_times, expected);
    }

    #[test]
    fn candidate_times_strip_artifacts_and_empties() {
        assert_eq!(
            decode_candidate_times(Some(&json!("{ \"19:00\" , , \"20:00\" }"))),
            vec!["19:00".to_owned(), "20:00".to_owned()]
        );
        assert_eq!(decode_candidate_times(Some(&json!("{}"))), Vec::<String>::new());
        assert_eq!(decode_candidate_times(Some(&Value::Null)), Vec::<String>::new());
        assert_eq!(decode_candidate_times(None), Vec::<String>::new());
        assert_eq!(decode_candidate_times(Some(&json!(42))), Vec::<String>::new());
    }

    #[test]
    fn missing_profile_yields_placeholder_identity() {
        let row: ParticipantRow = serde_json::from_value(json!({
            "user_id": "9b6a1f32-8a67-49b8-a0a8-33cf2a7c3f55",
            "created_at": "2026-06-01T10:00:00Z",
            "voted_time": "18:00",
        }))
        .unwrap();

        let entity = row.into_entity();
        assert_eq!(entity.display_name, PLACEHOLDER_DISPLAY_NAME);
        assert_eq!(entity.avatar_url, None);
        assert_eq!(entity.voted_time.as_deref(), Some("18:00"));
    }

    #[test]
    fn profile_embed_decodes_from_object_and_array() {
        let object: ParticipantRow = serde_json::from_value(json!({
            "user_id": "9b6a1f32-8a67-49b8-a0a8-33cf2a7c3f55",
            "profiles": {"id": "9b6a1f32-8a67-49b8-a0a8-33cf2a7c3f55", "full_name": "Sarah"},
        }))
        .unwrap();
        let array: ParticipantRow = serde_json::from_value(json!({
            "user_id": "9b6a1f32-8a67-49b8-a0a8-33cf2a7c3f55",
            "profiles": [{"id": "9b6a1f32-8a67-49b8-a0a8-33cf2a7c3f55", "full_name": "Sarah"}],
        }))
        .unwrap();

        assert_eq!(object.into_entity().display_name, "Sarah");
        assert_eq!(array.into_entity().display_name, "Sarah");
    }

    #[test]
    fn malformed_duration_and_status_are_defaulted() {
        let row: GameRow = serde_json::from_value(json!({
            "id": "7f0c0e9e-4c4b-4f7b-9a75-0d8f3a8f6d11",
            "date": "2026-06-12",
            "time": "18:00",
            "duration": -30,
            "status": "postponed",
        }))
        .unwrap();

        let snapshot = row.into_snapshot();
        assert_eq!(snapshot.game.duration_minutes, DEFAULT_DURATION_MINUTES);
        assert_eq!(snapshot.game.status, GameStatus::Scheduled);
    }

    #[test]
    fn participants_sort_by_join_time_with_missing_first() {
        let row = serde_json::from_value::<GameRow>(json!({
            "id": "7f0c0e9e-4c4b-4f7b-9a75-0d8f3a8f6d11",
            "date": "2026-06-12",
            "time": "18:00",
            "game_participants": [
                {"user_id": "2e9c3a66-1111-4000-8000-000000000002", "created_at": "2026-06-01T10:00:00Z"},
                {"user_id": "2e9c3a66-1111-4000-8000-000000000003"},
                {"user_id": "2e9c3a66-1111-4000-8000-000000000001", "created_at": "2026-06-01T09:00:00Z"},
            ],
        }))
        .unwrap();

        let snapshot = row.into_snapshot();
        let order: Vec<String> = snapshot
            .participants
            .iter()
            .map(|p| p.user_id.to_string())
            .collect();
        assert_eq!(
            order,
            [
                "2e9c3a66-1111-4000-8000-000000000003",
                "2e9c3a66-1111-4000-8000-000000000001",
                "2e9c3a66-1111-4000-8000-000000000002",
            ]
        );
    }
}
