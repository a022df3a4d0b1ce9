//! JSON scenario files for the simulated world.
//!
//! The map is a list of text rows, one glyph per tile:
//!
//! | glyph | tile          |
//! |-------|---------------|
//! | `.`   | walkable      |
//! | `#`   | non-walkable  |
//! | `~`   | teleport-over |
//! | `o`   | object        |
use std::path::{Path, PathBuf};
use std::time::Duration;

use nav_core::{CollisionType, GridError, Position, RawCollisionMap};
use navigator::{
    AreaCollision, AreaId, EntityId, Monster, ObjectKind, PlayerState, ShrineKind, WorldObject,
    WorldSnapshot,
};
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("failed to read scenario {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid scenario JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown tile {glyph:?} at row {row}, column {column}")]
    UnknownTile { row: usize, column: usize, glyph: char },

    #[error("object {object} has unknown shrine type {name:?}")]
    UnknownShrine { object: EntityId, name: String },

    #[error("shrine {object} has no shrine type")]
    MissingShrine { object: EntityId },

    #[error(transparent)]
    Grid(#[from] GridError),
}

/// A loaded scenario: one area, one character and one goal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scenario {
    pub name: String,
    pub goal: Position,
    pub collision: AreaCollision,
    pub snapshot: WorldSnapshot,
    pub can_teleport: bool,
    pub walk_speed: u32,
}

impl Scenario {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ScenarioError> {
        let file: ScenarioFile = serde_json::from_str(text)?;
        file.into_scenario()
    }
}

#[derive(Debug, Deserialize)]
struct ScenarioFile {
    #[serde(default)]
    name: String,
    #[serde(default = "default_area")]
    area: AreaId,
    #[serde(default)]
    in_town: bool,
    #[serde(default)]
    offset: Position,
    map: Vec<String>,
    #[serde(default)]
    exits: Vec<Position>,
    player: PlayerSpec,
    goal: Position,
    #[serde(default)]
    can_teleport: bool,
    #[serde(default = "default_walk_speed")]
    walk_speed: u32,
    #[serde(default)]
    latency_ms: u64,
    #[serde(default)]
    monsters: Vec<MonsterSpec>,
    #[serde(default)]
    objects: Vec<ObjectSpec>,
}

#[derive(Debug, Deserialize)]
struct PlayerSpec {
    position: Position,
    #[serde(default = "full")]
    hp_percent: u8,
    #[serde(default = "full")]
    mp_percent: u8,
}

#[derive(Debug, Deserialize)]
struct MonsterSpec {
    id: EntityId,
    position: Position,
    #[serde(default = "default_monster_hp")]
    hp: u32,
    #[serde(default = "yes")]
    hostile: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ObjectKindSpec {
    Door,
    Shrine,
    Chest,
    Destructible,
    Other,
}

#[derive(Debug, Deserialize)]
struct ObjectSpec {
    id: EntityId,
    kind: ObjectKindSpec,
    #[serde(default)]
    shrine: Option<String>,
    position: Position,
    #[serde(default = "yes")]
    selectable: bool,
}

fn default_area() -> AreaId {
    1
}

fn default_walk_speed() -> u32 {
    crate::SimWorld::DEFAULT_WALK_SPEED
}

fn default_monster_hp() -> u32 {
    100
}

fn full() -> u8 {
    100
}

fn yes() -> bool {
    true
}

impl ScenarioFile {
    fn into_scenario(self) -> Result<Scenario, ScenarioError> {
        let raw = parse_map(&self.map)?;
        let objects = self
            .objects
            .into_iter()
            .map(ObjectSpec::into_object)
            .collect::<Result<Vec<_>, _>>()?;
        let monsters = self
            .monsters
            .into_iter()
            .map(|spec| Monster {
                id: spec.id,
                position: spec.position,
                hp: spec.hp,
                hostile: spec.hostile,
            })
            .collect();

        let mut player = PlayerState::new(self.player.position);
        player.hp_percent = self.player.hp_percent.min(100);
        player.mp_percent = self.player.mp_percent.min(100);

        Ok(Scenario {
            name: self.name,
            goal: self.goal,
            collision: AreaCollision {
                raw,
                offset: self.offset,
                exits: self.exits,
            },
            snapshot: WorldSnapshot {
                area: self.area,
                in_town: self.in_town,
                player,
                monsters,
                objects,
                latency: Duration::from_millis(self.latency_ms),
            },
            can_teleport: self.can_teleport,
            walk_speed: self.walk_speed.max(1),
        })
    }
}

impl ObjectSpec {
    fn into_object(self) -> Result<WorldObject, ScenarioError> {
        let kind = match self.kind {
            ObjectKindSpec::Door => ObjectKind::Door,
            ObjectKindSpec::Chest => ObjectKind::Chest,
            ObjectKindSpec::Destructible => ObjectKind::Destructible,
            ObjectKindSpec::Other => ObjectKind::Other,
            ObjectKindSpec::Shrine => {
                let name = self
                    .shrine
                    .ok_or(ScenarioError::MissingShrine { object: self.id })?;
                let shrine = name
                    .parse::<ShrineKind>()
                    .map_err(|_| ScenarioError::UnknownShrine {
                        object: self.id,
                        name,
                    })?;
                ObjectKind::Shrine(shrine)
            }
        };
        Ok(WorldObject {
            id: self.id,
            kind,
            position: self.position,
            selectable: self.selectable,
        })
    }
}

fn parse_map(rows: &[String]) -> Result<RawCollisionMap, ScenarioError> {
    let rows = rows
        .iter()
        .enumerate()
        .map(|(row, line)| {
            line.chars()
                .enumerate()
                .map(|(column, glyph)| match glyph {
                    '.' => Ok(CollisionType::Walkable),
                    '#' => Ok(CollisionType::NonWalkable),
                    '~' => Ok(CollisionType::TeleportOver),
                    'o' => Ok(CollisionType::Object),
                    _ => Err(ScenarioError::UnknownTile { row, column, glyph }),
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(RawCollisionMap::new(rows)?)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const CORRIDOR: &str = r#"{
        "name": "corridor",
        "map": [
            "..........",
            "....o.....",
            ".........."
        ],
        "player": { "position": { "x": 0, "y": 1 }, "hp_percent": 80 },
        "goal": { "x": 9, "y": 1 },
        "latency_ms": 40,
        "monsters": [{ "id": 5, "position": { "x": 6, "y": 0 } }],
        "objects": [
            { "id": 10, "kind": "door", "position": { "x": 4, "y": 1 } },
            { "id": 11, "kind": "shrine", "shrine": "mana_regen", "position": { "x": 8, "y": 2 } }
        ]
    }"#;

    #[test]
    fn corridor_scenario_parses() {
        let scenario = Scenario::from_json(CORRIDOR).unwrap();
        assert_eq!(scenario.name, "corridor");
        assert_eq!(scenario.goal, Position::new(9, 1));
        assert_eq!(scenario.collision.raw.width(), 10);
        assert_eq!(scenario.collision.raw.height(), 3);
        assert_eq!(
            scenario.collision.raw.get(Position::new(4, 1)),
            Some(CollisionType::Object)
        );

        let snapshot = &scenario.snapshot;
        assert_eq!(snapshot.area, 1);
        assert_eq!(snapshot.player.hp_percent, 80);
        assert_eq!(snapshot.player.mp_percent, 100);
        assert_eq!(snapshot.latency, Duration::from_millis(40));
        assert!(snapshot.monsters[0].hostile);
        assert_eq!(
            snapshot.object(11).map(|o| o.kind),
            Some(ObjectKind::Shrine(ShrineKind::ManaRegen))
        );
        assert_eq!(scenario.walk_speed, crate::SimWorld::DEFAULT_WALK_SPEED);
    }

    #[test]
    fn bad_glyphs_and_shrines_are_reported() {
        let bad_tile = CORRIDOR.replace("....o.....", "....x.....");
        assert!(matches!(
            Scenario::from_json(&bad_tile),
            Err(ScenarioError::UnknownTile { row: 1, column: 4, glyph: 'x' })
        ));

        let bad_shrine = CORRIDOR.replace("mana_regen", "gem");
        assert!(matches!(
            Scenario::from_json(&bad_shrine),
            Err(ScenarioError::UnknownShrine { object: 11, .. })
        ));

        let ragged = CORRIDOR.replacen("\"..........\"", "\".......\"", 1);
        assert!(matches!(
            Scenario::from_json(&ragged),
            Err(ScenarioError::Grid(_))
        ));
    }

    #[test]
    fn scenarios_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CORRIDOR.as_bytes()).unwrap();

        let scenario = Scenario::load(file.path()).unwrap();
        assert_eq!(scenario.snapshot.objects.len(), 2);

        let missing = file.path().with_extension("missing");
        assert!(matches!(
            Scenario::load(&missing),
            Err(ScenarioError::Io { .. })
        ));
    }
}
