//! Crate root module declarations for the spell chess rules engine.
//!
//! Board state and move generation sit at the bottom, the status-effect
//! table and card layer on top of them, and the session layer (turn state
//! machine, match registry, line protocol) at the root.

pub mod errors;

pub mod game_state {
    pub mod chess_rules;
    pub mod chess_types;
    pub mod game_state;
}

pub mod moves {
    pub mod offsets;
}

pub mod move_generation {
    pub mod apply_move;
    pub mod attacks;
    pub mod legal_moves;
    pub mod perft;
    pub mod pseudo_legal;
}

pub mod effects {
    pub mod effect_kind;
    pub mod effect_table;
}

pub mod cards {
    pub mod card_catalog;
    pub mod hand_state;
    pub mod spell_resolution;
    pub mod spell_targets;
}

pub mod session {
    pub mod animation;
    pub mod game_session;
    pub mod match_registry;
    pub mod protocol;
    pub mod turn_controller;
}

pub mod utils {
    pub mod algebraic;
    pub mod fen_generator;
    pub mod fen_parser;
    pub mod render_game_state;
}
