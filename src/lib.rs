pub mod catalog;
pub mod combat;
pub mod config;
pub mod fusion;
pub mod intervention;
pub mod matchmaker;
pub mod net;
pub mod phase;
pub mod protocol;
pub mod resonance;
pub mod roster;
pub mod session;
pub mod shop;

/// dimensional analysis types
pub type PlayerId = i32;
pub type InstanceId = i32;
pub type CatalogId = i32;
pub type AbilityId = i32;
pub type Gold = i32;
pub type Health = i32;
pub type Experience = i32;
pub type Energy = i32;
pub type Tick = u32;

// board geometry, shared contract with the client renderer
pub const BOARD_COLS: usize = 4;
pub const BOARD_ROWS: usize = 4;
pub const BOARD_SLOTS: usize = BOARD_COLS * BOARD_ROWS;
pub const BENCH_SLOTS: usize = 9;
pub const COMBAT_COLS: usize = 2 * BOARD_COLS;
pub const COMBAT_ROWS: usize = BOARD_ROWS;

// simulation clock
pub const TICKS_PER_SECOND: Tick = 60;

// unit identity encoding: instance / STRIDE = catalog id
pub const INSTANCE_STRIDE: InstanceId = 1000;
pub const EMPTY: InstanceId = -1;
pub const MAX_STAR: u8 = 3;

// synthetic opponent sentinel, never published as a real player
pub const GHOST: PlayerId = -99;

/// initialize logging and exit on ctrl-c
pub fn init() {
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.expect("install ctrl-c handler");
        println!();
        log::warn!("forcing exit");
        std::process::exit(0);
    });
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}
