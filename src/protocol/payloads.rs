use crate::CatalogId;
use crate::Energy;
use crate::Health;
use crate::InstanceId;
use crate::PlayerId;
use crate::phase::Phase;
use crate::roster::PlayerRuntime;
use serde::Deserialize;
use serde::Serialize;

// Closed per-kind payload schemas: plain structs of primitives,
// fixed-length arrays and small records. One struct per MessageKind.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinLobby {
    pub player_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinLobbyResponse {
    pub player_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LobbyPlayer {
    pub id: PlayerId,
    pub name: String,
    pub is_ready: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LobbyState {
    pub players: Vec<LobbyPlayer>,
    pub all_ready: bool,
    pub countdown_remaining: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadyUp {
    pub is_ready: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartRound {
    pub round_number: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseChanged {
    pub new_phase: Phase,
    pub phase_duration_secs: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStateUpdate {
    pub state: PlayerRuntime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtherPlayerInfo {
    pub player_id: PlayerId,
    pub nexus_health: Health,
    pub level: u8,
    pub win_streak: u32,
    pub loss_streak: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopRefreshed {
    pub echo_definition_ids: [CatalogId; 5],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyEcho {
    pub shop_slot: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellEcho {
    pub echo_instance_id: InstanceId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshShop {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyXp {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionEcho {
    pub echo_instance_id: InstanceId,
    pub board_x: i32,
    pub board_y: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveFromBoard {
    pub echo_instance_id: InstanceId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EchoFused {
    pub result_instance_id: InstanceId,
    pub new_star_level: u8,
    pub definition_id: CatalogId,
    pub is_on_board: bool,
    pub slot_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatStarted {
    pub opponent_id: PlayerId,
    pub opponent_state: PlayerRuntime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatUpdate {
    pub event_json: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatEnded {
    pub winner_id: PlayerId,
    pub damage_dealt: Health,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseIntervention {
    pub card_id: String,
    pub target_id: InstanceId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterventionActivated {
    pub player_id: PlayerId,
    pub intervention_type: String,
    pub target_unit_id: InstanceId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyUpdate {
    pub energy: Energy,
    pub max_energy: Energy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturedMatch {
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerEliminated {
    pub player_id: PlayerId,
    pub final_placement: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEnded {
    pub winner_id: PlayerId,
    pub placements: Vec<PlayerId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRejected {
    pub action: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ping {
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pong {
    pub original_timestamp: i64,
    pub server_received_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    pub acknowledged_sequence_id: u32,
}
