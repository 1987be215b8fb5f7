// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Chat engine
//!
//! The turn orchestrator, the automode supervisor, and the system prompt
//! machinery.

pub mod automode;
pub mod orchestrator;
pub mod prompt;

pub use automode::{AutomodeOutcome, AutomodePhase, AutomodeSupervisor, DEFAULT_ITERATIONS};
pub use orchestrator::{ChatOrchestrator, TurnInput, TurnOutcome};
