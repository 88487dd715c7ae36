//! Replay files: record a game's attacks, load them back, play them again.
//!
//! Format:
//!
//! ```text
//! # Hex Conquest Replay v1
//! [CONFIG]
//! gridRadius=8
//! ...
//!
//! [ACTIONS]
//! # turn 1
//! attackerId,defenderId,attackerPlayer,attackerDice,defenderDice
//! ```
//!
//! `#` lines are comments. Inside `[ACTIONS]`, a `# turn N` comment marks
//! the turn the following rows were played on; files without markers still
//! load and play back.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::config::GameConfig;
use crate::controller::GameController;
use crate::error::{ConfigError, ReplayError};
use crate::queue::{CombatAction, LoggedAction};
use crate::state::{GameState, PlayerId, TurnPhase};

pub const REPLAY_HEADER: &str = "# Hex Conquest Replay v1";

const CONFIG_SECTION: &str = "[CONFIG]";
const ACTIONS_SECTION: &str = "[ACTIONS]";

/// Most turns playback will pass to reach a `# turn N` marker
pub const MAX_REPLAY_TURN_GAP: u32 = 1000;

// ============================================================================
// WRITER
// ============================================================================

/// Streams a replay: header and config up front, then one row per attack
pub struct ReplayWriter<W: Write> {
    out: W,
    last_turn: Option<u32>,
    actions_written: usize,
}

impl<W: Write> ReplayWriter<W> {
    pub fn new(mut out: W, config: &GameConfig) -> io::Result<Self> {
        writeln!(out, "{REPLAY_HEADER}")?;
        writeln!(out, "{CONFIG_SECTION}")?;
        for (key, value) in config.to_key_values() {
            writeln!(out, "{key}={value}")?;
        }
        writeln!(out)?;
        writeln!(out, "{ACTIONS_SECTION}")?;
        out.flush()?;

        Ok(Self {
            out,
            last_turn: None,
            actions_written: 0,
        })
    }

    pub fn record(&mut self, entry: &LoggedAction) -> io::Result<()> {
        if self.last_turn != Some(entry.turn) {
            writeln!(self.out, "# turn {}", entry.turn)?;
            self.last_turn = Some(entry.turn);
        }
        let a = &entry.action;
        writeln!(
            self.out,
            "{},{},{},{},{}",
            a.attacker_id, a.defender_id, a.attacker_player, a.attacker_dice, a.defender_dice
        )?;
        self.actions_written += 1;
        self.out.flush()
    }

    pub fn actions_written(&self) -> usize {
        self.actions_written
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl ReplayWriter<BufWriter<File>> {
    /// Open `path` for recording, creating parent directories as needed
    pub fn create(path: &Path, config: &GameConfig) -> Result<Self, ReplayError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file), config)?)
    }
}

// ============================================================================
// REPLAY
// ============================================================================

/// One recorded attack and, when known, the turn it was made on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayAction {
    pub turn: Option<u32>,
    pub action: CombatAction,
}

/// A loaded replay: the config that built the map and every attack
#[derive(Clone, Debug, PartialEq)]
pub struct Replay {
    pub config: GameConfig,
    pub actions: Vec<ReplayAction>,
}

/// Result of playing a replay back
#[derive(Clone, Debug)]
pub struct ReplayOutcome {
    /// Actions the controller accepted
    pub applied: usize,
    /// Actions rejected or whose recorded dice did not match the board
    pub diverged: usize,
    pub winner: Option<PlayerId>,
    pub state: GameState,
}

impl Replay {
    /// Snapshot a controller's config and action log
    pub fn from_controller(controller: &GameController) -> Self {
        Self {
            config: controller.config().clone(),
            actions: controller
                .action_log()
                .iter()
                .map(|entry| ReplayAction {
                    turn: Some(entry.turn),
                    action: entry.action,
                })
                .collect(),
        }
    }

    /// Parse replay text. Malformed lines are skipped with a warning.
    pub fn parse(text: &str) -> Result<Self, ReplayError> {
        #[derive(PartialEq)]
        enum Section {
            Preamble,
            Config,
            Actions,
        }

        let mut section = Section::Preamble;
        let mut saw_config = false;
        let mut config = GameConfig::default();
        let mut actions = Vec::new();
        let mut turn = None;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(comment) = line.strip_prefix('#') {
                if section == Section::Actions {
                    if let Some(marker) = parse_turn_marker(comment) {
                        turn = Some(marker);
                    }
                }
                continue;
            }

            match line {
                CONFIG_SECTION => {
                    section = Section::Config;
                    saw_config = true;
                    continue;
                }
                ACTIONS_SECTION => {
                    section = Section::Actions;
                    continue;
                }
                _ => {}
            }

            match section {
                Section::Preamble => {
                    tracing::warn!("Replay line {}: outside any section, skipped", line_no);
                }
                Section::Config => {
                    let applied = line
                        .split_once('=')
                        .is_some_and(|(key, value)| config.apply_key_value(key, value));
                    if !applied {
                        tracing::warn!("Replay line {}: bad config entry '{}'", line_no, line);
                    }
                }
                Section::Actions => match parse_action(line) {
                    Some(action) => actions.push(ReplayAction { turn, action }),
                    None => tracing::warn!("Replay line {}: bad action '{}'", line_no, line),
                },
            }
        }

        if !saw_config {
            return Err(ReplayError::MissingConfig);
        }
        Ok(Self { config, actions })
    }

    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let text = std::fs::read_to_string(path)?;
        let replay = Self::parse(&text)?;
        tracing::info!("Loaded replay {} ({} actions)", path.display(), replay.actions.len());
        Ok(replay)
    }

    pub fn write_to<W: Write>(&self, out: W) -> io::Result<W> {
        let mut writer = ReplayWriter::new(out, &self.config)?;
        for entry in &self.actions {
            match entry.turn {
                Some(turn) => writer.record(&LoggedAction {
                    turn,
                    action: entry.action,
                })?,
                None => {
                    let a = &entry.action;
                    writeln!(
                        writer.out,
                        "{},{},{},{},{}",
                        a.attacker_id, a.defender_id, a.attacker_player, a.attacker_dice, a.defender_dice
                    )?;
                }
            }
        }
        Ok(writer.into_inner())
    }

    /// Write the whole replay to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ReplayError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let file = File::create(path)?;
        let mut out = self.write_to(BufWriter::new(file))?;
        out.flush()?;
        Ok(())
    }

    /// Rebuild the game from the recorded config and re-issue every attack
    pub fn play(&self) -> Result<ReplayOutcome, ConfigError> {
        let mut controller = GameController::new(self.config.clone())?;
        let mut applied = 0;
        let mut diverged = 0;

        for (idx, entry) in self.actions.iter().enumerate() {
            if controller.is_game_over() {
                tracing::warn!("Replay: game ended before action {}", idx);
                diverged += self.actions.len() - idx;
                break;
            }
            match replay_action(&mut controller, entry) {
                ActionResult::Applied => applied += 1,
                ActionResult::AppliedWithMismatch => {
                    applied += 1;
                    diverged += 1;
                }
                ActionResult::Rejected => diverged += 1,
            }
        }

        Ok(ReplayOutcome {
            applied,
            diverged,
            winner: controller.winner(),
            state: controller.state().clone(),
        })
    }
}

enum ActionResult {
    Applied,
    AppliedWithMismatch,
    Rejected,
}

fn replay_action(controller: &mut GameController, entry: &ReplayAction) -> ActionResult {
    let action = &entry.action;
    let player = action.attacker_player;

    // Pass turns until the recorded attacker is up
    match entry.turn {
        Some(turn) => {
            if turn > controller.turn_number().saturating_add(MAX_REPLAY_TURN_GAP) {
                tracing::warn!(
                    "Replay: turn {} is too far ahead of turn {}",
                    turn,
                    controller.turn_number()
                );
                return ActionResult::Rejected;
            }
            while !controller.is_game_over()
                && (controller.turn_number(), controller.current_player()) < (turn, player)
            {
                controller.end_turn();
            }
            if controller.turn_number() != turn {
                tracing::warn!(
                    "Replay: expected turn {}, board is on turn {}",
                    turn,
                    controller.turn_number()
                );
                return ActionResult::Rejected;
            }
        }
        None => {
            let mut passes = 0;
            while !controller.is_game_over()
                && controller.current_player() != player
                && passes < controller.state().players.len()
            {
                controller.end_turn();
                passes += 1;
            }
        }
    }
    if controller.is_game_over() || controller.current_player() != player {
        tracing::warn!("Replay: player {} cannot act now", player);
        return ActionResult::Rejected;
    }

    let state = controller.state();
    let dice_match = state.territory(action.attacker_id).map(|t| t.dice_count) == Some(action.attacker_dice)
        && state.territory(action.defender_id).map(|t| t.dice_count) == Some(action.defender_dice);

    let accepted = if controller.phase() == TurnPhase::AiTurn {
        controller.attack_from(action.attacker_id, action.defender_id)
    } else if controller.select_territory(action.attacker_id) {
        let attacked = controller.attack(action.defender_id);
        if !attacked {
            controller.cancel_selection();
        }
        attacked
    } else {
        false
    };

    match (accepted, dice_match) {
        (true, true) => ActionResult::Applied,
        (true, false) => {
            tracing::warn!(
                "Replay: dice mismatch on {} -> {}",
                action.attacker_id,
                action.defender_id
            );
            ActionResult::AppliedWithMismatch
        }
        (false, _) => {
            tracing::warn!(
                "Replay: attack {} -> {} rejected",
                action.attacker_id,
                action.defender_id
            );
            ActionResult::Rejected
        }
    }
}

fn parse_turn_marker(comment: &str) -> Option<u32> {
    comment.trim().strip_prefix("turn")?.trim().parse().ok()
}

fn parse_action(line: &str) -> Option<CombatAction> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let [attacker_id, defender_id, attacker_player, attacker_dice, defender_dice] = fields.as_slice() else {
        return None;
    };
    Some(CombatAction {
        attacker_id: attacker_id.parse().ok()?,
        defender_id: defender_id.parse().ok()?,
        attacker_player: attacker_player.parse().ok()?,
        attacker_dice: attacker_dice.parse().ok()?,
        defender_dice: defender_dice.parse().ok()?,
    })
}
