use serde::Deserialize;
use serde::Serialize;

/// Closed set of wire message kinds. The name string is the wire
/// encoding; adding a variant is a protocol change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    JoinLobby,
    JoinLobbyResponse,
    LobbyState,
    ReadyUp,
    StartRound,
    PhaseChanged,
    PlayerStateUpdate,
    OtherPlayerInfo,
    ShopRefreshed,
    BuyEcho,
    SellEcho,
    RefreshShop,
    #[serde(rename = "BuyXP")]
    BuyXp,
    PositionEcho,
    RemoveFromBoard,
    EchoFused,
    CombatStarted,
    CombatUpdate,
    CombatEnded,
    UseIntervention,
    InterventionActivated,
    EnergyUpdate,
    FeaturedMatch,
    PlayerEliminated,
    GameEnded,
    ActionRejected,
    Ping,
    Pong,
    Ack,
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::BuyXp => write!(f, "BuyXP"),
            kind => write!(f, "{:?}", kind),
        }
    }
}
