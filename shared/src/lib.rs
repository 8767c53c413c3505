use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const WORLD_HALF_EXTENT: f32 = 1500.0;
pub const GRID_SIZE: i32 = 40;
pub const BLOCK_COLLISION_RADIUS: f32 = 50.0;
pub const PLAYER_SIZE: f32 = 40.0;
pub const MAX_HEALTH: f32 = 100.0;
pub const MAX_HUNGER: f32 = 100.0;
pub const DEFAULT_ATTACK_RADIUS: f32 = 80.0;
pub const ATTACK_DAMAGE: f32 = 10.0;
pub const MAX_BOW_DURABILITY: u32 = 10;
pub const RESOURCE_NODE_HEALTH: u32 = 3;
pub const TARGET_TREES: usize = 50;
pub const TARGET_STONES: usize = 30;
pub const WOOD_MINE_RADIUS: f32 = 80.0;
pub const STONE_MINE_RADIUS: f32 = 70.0;
pub const LEADERBOARD_SIZE: usize = 10;
pub const DEFAULT_NICKNAME: &str = "Player";
pub const DEFAULT_EMOJI: &str = "😎";
pub const DEFAULT_DEVICE_TYPE: &str = "desktop";
pub const TREE_EMOJIS: [&str; 3] = ["🌲", "🌳", "🎄"];
pub const STONE_EMOJI: &str = "🪨";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Wood,
    Stone,
    Food,
    Block,
    Sword,
    Bow,
    Arrow,
}

/// Raw material a resource node yields when it is depleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Wood,
    Stone,
}

impl ResourceType {
    pub fn item(self) -> ItemKind {
        match self {
            ResourceType::Wood => ItemKind::Wood,
            ResourceType::Stone => ItemKind::Stone,
        }
    }

    /// Distance below which a click counts as hitting a node of this kind.
    pub fn mine_radius(self) -> f32 {
        match self {
            ResourceType::Wood => WOOD_MINE_RADIUS,
            ResourceType::Stone => STONE_MINE_RADIUS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub wood: u32,
    pub stone: u32,
    pub food: u32,
    pub block: u32,
    pub sword: u32,
    pub bow: u32,
    pub arrow: u32,
}

impl Inventory {
    pub fn count(&self, kind: ItemKind) -> u32 {
        match kind {
            ItemKind::Wood => self.wood,
            ItemKind::Stone => self.stone,
            ItemKind::Food => self.food,
            ItemKind::Block => self.block,
            ItemKind::Sword => self.sword,
            ItemKind::Bow => self.bow,
            ItemKind::Arrow => self.arrow,
        }
    }

    pub fn count_mut(&mut self, kind: ItemKind) -> &mut u32 {
        match kind {
            ItemKind::Wood => &mut self.wood,
            ItemKind::Stone => &mut self.stone,
            ItemKind::Food => &mut self.food,
            ItemKind::Block => &mut self.block,
            ItemKind::Sword => &mut self.sword,
            ItemKind::Bow => &mut self.bow,
            ItemKind::Arrow => &mut self.arrow,
        }
    }

    pub fn add(&mut self, kind: ItemKind, amount: u32) {
        let slot = self.count_mut(kind);
        *slot = slot.saturating_add(amount);
    }

    /// Removes one item of `kind`. Returns false and leaves the count
    /// untouched when there is nothing to take.
    pub fn take_one(&mut self, kind: ItemKind) -> bool {
        let slot = self.count_mut(kind);
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    pub fn covers(&self, cost: &BTreeMap<ItemKind, u32>) -> bool {
        cost.iter().all(|(kind, needed)| self.count(*kind) >= *needed)
    }

    /// Deducts every entry of `cost`, or nothing at all if any entry is short.
    pub fn pay(&mut self, cost: &BTreeMap<ItemKind, u32>) -> bool {
        if !self.covers(cost) {
            return false;
        }
        for (kind, needed) in cost {
            *self.count_mut(*kind) -= needed;
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub emoji: String,
    pub nickname: String,
    pub health: f32,
    pub hunger: f32,
    pub is_attacking: bool,
    pub attack_cooldown: u32,
    pub attack_radius: f32,
    pub bow_durability: u32,
    pub max_bow_durability: u32,
    pub device_type: String,
    pub inventory: Inventory,
    pub score: i64,
    pub last_update: u64,
}

impl Player {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            x: 0.0,
            y: 0.0,
            size: PLAYER_SIZE,
            emoji: DEFAULT_EMOJI.to_string(),
            nickname: DEFAULT_NICKNAME.to_string(),
            health: MAX_HEALTH,
            hunger: MAX_HUNGER,
            is_attacking: false,
            attack_cooldown: 0,
            attack_radius: DEFAULT_ATTACK_RADIUS,
            bow_durability: 0,
            max_bow_durability: MAX_BOW_DURABILITY,
            device_type: DEFAULT_DEVICE_TYPE.to_string(),
            inventory: Inventory::default(),
            score: 0,
            last_update: 0,
        }
    }

    pub fn distance_to(&self, x: f32, y: f32) -> f32 {
        distance(self.x, self.y, x, y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceNode {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub emoji: String,
    pub health: u32,
}

/// A player-built obstacle. `x`/`y` is the top-left corner of its grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    pub x: i32,
    pub y: i32,
}

impl Block {
    pub fn center(&self) -> (f32, f32) {
        cell_center(self.x, self.y)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub trees: Vec<ResourceNode>,
    pub stones: Vec<ResourceNode>,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    pub cost: BTreeMap<ItemKind, u32>,
    pub result: ItemKind,
    pub emoji: String,
    pub quantity: u32,
}

impl Recipe {
    fn new(name: &str, cost: &[(ItemKind, u32)], result: ItemKind, emoji: &str, quantity: u32) -> Self {
        Self {
            name: name.to_string(),
            cost: cost.iter().copied().collect(),
            result,
            emoji: emoji.to_string(),
            quantity,
        }
    }
}

/// The fixed crafting catalog. Clients address recipes by index into this list.
pub fn craft_recipes() -> Vec<Recipe> {
    let (wood, stone) = (ItemKind::Wood, ItemKind::Stone);
    vec![
        Recipe::new("⚔️ Sword", &[(wood, 2), (stone, 3)], ItemKind::Sword, "⚔️", 1),
        Recipe::new("🏹 Bow", &[(wood, 3), (stone, 1)], ItemKind::Bow, "🏹", 1),
        Recipe::new("🎯 Arrows", &[(wood, 1), (stone, 1)], ItemKind::Arrow, "🎯", 8),
        Recipe::new("🟫 Block", &[(wood, 2), (stone, 2)], ItemKind::Block, "🟫", 4),
        Recipe::new("🍎 Food", &[(wood, 1), (stone, 1)], ItemKind::Food, "🍎", 2),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub nickname: String,
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldCounts {
    pub trees: usize,
    pub stones: usize,
    pub blocks: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStats {
    pub online: usize,
    pub total_players: usize,
    pub world: WorldCounts,
    pub server_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    PlayerInfo {
        nickname: String,
        emoji: String,
        #[serde(default = "default_device_type")]
        device_type: String,
    },
    Move {
        x: f32,
        y: f32,
        emoji: String,
        health: f32,
        hunger: f32,
        #[serde(default)]
        is_attacking: bool,
    },
    Action(ActionRequest),
    Craft {
        recipe_index: usize,
    },
    Chat {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ActionRequest {
    Mine {
        resource_type: ResourceType,
        x: f32,
        y: f32,
    },
    Attack,
    PlaceBlock {
        block_x: f32,
        block_y: f32,
    },
    RemoveBlock {
        block_x: f32,
        block_y: f32,
    },
    UseFood,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    Init {
        player_id: String,
        players: Vec<Player>,
        world: WorldSnapshot,
        recipes: Vec<Recipe>,
    },
    PlayerJoined {
        player: Player,
    },
    PlayerLeft {
        player_id: String,
    },
    PlayerUpdate {
        player: Player,
    },
    PlayerInventory {
        player_id: String,
        inventory: Inventory,
    },
    WorldUpdate {
        world: WorldSnapshot,
    },
    Chat {
        player_id: String,
        username: String,
        message: String,
    },
    Leaderboard {
        leaderboard: Vec<LeaderboardEntry>,
    },
}

impl ServerEvent {
    /// Wire name of the event, as found in the `type` field.
    pub fn kind(&self) -> &'static str {
        match self {
            ServerEvent::Init { .. } => "init",
            ServerEvent::PlayerJoined { .. } => "playerJoined",
            ServerEvent::PlayerLeft { .. } => "playerLeft",
            ServerEvent::PlayerUpdate { .. } => "playerUpdate",
            ServerEvent::PlayerInventory { .. } => "playerInventory",
            ServerEvent::WorldUpdate { .. } => "worldUpdate",
            ServerEvent::Chat { .. } => "chat",
            ServerEvent::Leaderboard { .. } => "leaderboard",
        }
    }
}

fn default_device_type() -> String {
    DEFAULT_DEVICE_TYPE.to_string()
}

pub fn distance(ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    let dx = bx - ax;
    let dy = by - ay;
    (dx * dx + dy * dy).sqrt()
}

/// Snaps a world coordinate to the origin of its grid cell, rounding half up
/// the same way the browser client does. The input is clamped to the world
/// first, so the result always lies within one cell of the edge.
pub fn snap_to_grid(value: f32) -> i32 {
    let cell = (clamp_to_world(value) / GRID_SIZE as f32 + 0.5).floor();
    cell as i32 * GRID_SIZE
}

pub fn cell_center(x: i32, y: i32) -> (f32, f32) {
    let half = GRID_SIZE as f32 / 2.0;
    (x as f32 + half, y as f32 + half)
}

pub fn clamp_to_world(value: f32) -> f32 {
    value.clamp(-WORLD_HALF_EXTENT, WORLD_HALF_EXTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use serde_json::{json, Value};

    #[test]
    fn test_player_defaults() {
        let player = Player::new("p1");
        assert_eq!(player.id, "p1");
        assert_eq!(player.x, 0.0);
        assert_eq!(player.y, 0.0);
        assert_eq!(player.health, 100.0);
        assert_eq!(player.hunger, 100.0);
        assert_eq!(player.attack_radius, 80.0);
        assert_eq!(player.max_bow_durability, 10);
        assert_eq!(player.inventory, Inventory::default());
        assert_eq!(player.score, 0);
        assert!(!player.is_attacking);
    }

    #[test]
    fn test_player_serializes_camel_case() {
        let value = serde_json::to_value(Player::new("p1")).unwrap();
        assert_eq!(value["isAttacking"], json!(false));
        assert_eq!(value["attackRadius"], json!(80.0));
        assert_eq!(value["maxBowDurability"], json!(10));
        assert_eq!(value["deviceType"], json!("desktop"));
        assert_eq!(value["inventory"]["arrow"], json!(0));
        assert!(value.get("is_attacking").is_none());
    }

    #[test]
    fn test_distance() {
        assert_approx_eq!(distance(0.0, 0.0, 3.0, 4.0), 5.0);
        assert_approx_eq!(distance(-1.0, -1.0, -1.0, -1.0), 0.0);
    }

    #[test]
    fn test_snap_to_grid_rounds_half_up() {
        assert_eq!(snap_to_grid(0.0), 0);
        assert_eq!(snap_to_grid(19.9), 0);
        assert_eq!(snap_to_grid(20.0), 40);
        assert_eq!(snap_to_grid(-19.9), 0);
        assert_eq!(snap_to_grid(-20.0), 0);
        assert_eq!(snap_to_grid(-20.1), -40);
        assert_eq!(snap_to_grid(120.0), 120);
    }

    #[test]
    fn test_snap_to_grid_outside_world() {
        assert_eq!(snap_to_grid(1e10), 1520);
        assert_eq!(snap_to_grid(-1e10), -1480);
        assert_eq!(snap_to_grid(f32::INFINITY), 1520);
        assert_eq!(snap_to_grid(f32::NEG_INFINITY), -1480);
        assert_eq!(snap_to_grid(f32::MAX), snap_to_grid(WORLD_HALF_EXTENT));
    }

    #[test]
    fn test_cell_center() {
        assert_eq!(cell_center(40, -80), (60.0, -60.0));
    }

    #[test]
    fn test_clamp_to_world() {
        assert_eq!(clamp_to_world(2000.0), 1500.0);
        assert_eq!(clamp_to_world(-2000.0), -1500.0);
        assert_eq!(clamp_to_world(12.5), 12.5);
    }

    #[test]
    fn test_inventory_pay_is_all_or_nothing() {
        let recipes = craft_recipes();
        let sword = &recipes[0];

        let mut inventory = Inventory {
            wood: 1,
            stone: 5,
            ..Default::default()
        };
        assert!(!inventory.pay(&sword.cost));
        assert_eq!(inventory.wood, 1);
        assert_eq!(inventory.stone, 5);

        inventory.wood = 2;
        assert!(inventory.pay(&sword.cost));
        assert_eq!(inventory.wood, 0);
        assert_eq!(inventory.stone, 2);
    }

    #[test]
    fn test_inventory_take_one_never_underflows() {
        let mut inventory = Inventory::default();
        assert!(!inventory.take_one(ItemKind::Food));
        assert_eq!(inventory.food, 0);

        inventory.add(ItemKind::Food, 2);
        assert!(inventory.take_one(ItemKind::Food));
        assert_eq!(inventory.count(ItemKind::Food), 1);
    }

    #[test]
    fn test_recipe_catalog() {
        let recipes = craft_recipes();
        assert_eq!(recipes.len(), 5);

        let summary: Vec<(ItemKind, u32)> = recipes.iter().map(|r| (r.result, r.quantity)).collect();
        assert_eq!(
            summary,
            vec![
                (ItemKind::Sword, 1),
                (ItemKind::Bow, 1),
                (ItemKind::Arrow, 8),
                (ItemKind::Block, 4),
                (ItemKind::Food, 2),
            ]
        );
        assert_eq!(recipes[0].cost.get(&ItemKind::Wood), Some(&2));
        assert_eq!(recipes[0].cost.get(&ItemKind::Stone), Some(&3));

        let value = serde_json::to_value(&recipes[1]).unwrap();
        assert_eq!(value["cost"], json!({"wood": 3, "stone": 1}));
        assert_eq!(value["result"], json!("bow"));
    }

    #[test]
    fn test_decode_move() {
        let raw = r#"{"type":"move","x":12.5,"y":-3,"emoji":"🤠","health":80,"hunger":55.5,"isAttacking":true}"#;
        let message: ClientMessage = serde_json::from_str(raw).unwrap();
        assert_eq!(
            message,
            ClientMessage::Move {
                x: 12.5,
                y: -3.0,
                emoji: "🤠".to_string(),
                health: 80.0,
                hunger: 55.5,
                is_attacking: true,
            }
        );
    }

    #[test]
    fn test_decode_actions() {
        let mine: ClientMessage = serde_json::from_str(
            r#"{"type":"action","action":"mine","resourceType":"wood","x":10,"y":20}"#,
        )
        .unwrap();
        assert_eq!(
            mine,
            ClientMessage::Action(ActionRequest::Mine {
                resource_type: ResourceType::Wood,
                x: 10.0,
                y: 20.0,
            })
        );

        let attack: ClientMessage = serde_json::from_str(r#"{"type":"action","action":"attack"}"#).unwrap();
        assert_eq!(attack, ClientMessage::Action(ActionRequest::Attack));

        let place: ClientMessage = serde_json::from_str(
            r#"{"type":"action","action":"placeBlock","blockX":40,"blockY":-80}"#,
        )
        .unwrap();
        assert_eq!(
            place,
            ClientMessage::Action(ActionRequest::PlaceBlock {
                block_x: 40.0,
                block_y: -80.0,
            })
        );
    }

    #[test]
    fn test_decode_player_info_defaults_device_type() {
        let info: ClientMessage =
            serde_json::from_str(r#"{"type":"playerInfo","nickname":"ann","emoji":"🐸"}"#).unwrap();
        assert_eq!(
            info,
            ClientMessage::PlayerInfo {
                nickname: "ann".to_string(),
                emoji: "🐸".to_string(),
                device_type: "desktop".to_string(),
            }
        );
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!(serde_json::from_str::<ClientMessage>("not json").is_err());
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"teleport"}"#).is_err());
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"craft","recipeIndex":-1}"#).is_err());
        assert!(serde_json::from_str::<ClientMessage>(
            r#"{"type":"action","action":"mine","resourceType":"gold","x":0,"y":0}"#
        )
        .is_err());
    }

    #[test]
    fn test_server_event_tags() {
        let event = ServerEvent::PlayerInventory {
            player_id: "p7".to_string(),
            inventory: Inventory::default(),
        };
        let value: Value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], json!(event.kind()));
        assert_eq!(value["playerId"], json!("p7"));

        let left = serde_json::to_value(ServerEvent::PlayerLeft {
            player_id: "p2".to_string(),
        })
        .unwrap();
        assert_eq!(left, json!({"type": "playerLeft", "playerId": "p2"}));
    }

    #[test]
    fn test_stats_shape() {
        let stats = ServerStats {
            online: 2,
            total_players: 2,
            world: WorldCounts {
                trees: 50,
                stones: 30,
                blocks: 1,
            },
            server_time: "2024-01-01T00:00:00.000Z".to_string(),
        };
        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["totalPlayers"], json!(2));
        assert_eq!(value["serverTime"], json!("2024-01-01T00:00:00.000Z"));
        assert_eq!(value["world"]["trees"], json!(50));
    }
}
