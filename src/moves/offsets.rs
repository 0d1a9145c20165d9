//! Piece offset tables and ray tracing.
//!
//! Offsets are `(d_file, d_rank)`. Leaper attack sets are precomputed at
//! compile time; sliders trace rays at call time because removed tiles and
//! occupancy change every turn.

use crate::game_state::chess_types::{Color, Square};

pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

pub const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

pub const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];
pub const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];
pub const QUEEN_DIRECTIONS: [(i8, i8); 8] = KING_OFFSETS;

pub const KNIGHT_ATTACKS: [u64; 64] = generate_leaper_table(&KNIGHT_OFFSETS);
pub const KING_ATTACKS: [u64; 64] = generate_leaper_table(&KING_OFFSETS);

#[inline]
pub const fn knight_attacks(square: Square) -> u64 {
    KNIGHT_ATTACKS[square as usize]
}

#[inline]
pub const fn king_attacks(square: Square) -> u64 {
    KING_ATTACKS[square as usize]
}

/// The two diagonal squares a pawn of `color` attacks from `square`.
#[inline]
pub const fn pawn_attacks(color: Color, square: Square) -> u64 {
    let file = (square % 8) as i32;
    let rank = (square / 8) as i32;
    let step = color.forward() as i32;
    set_if_valid(file - 1, rank + step) | set_if_valid(file + 1, rank + step)
}

/// Squares reached along one ray. Includes the first occupied square, stops
/// before any square in `blocked`.
pub fn trace_ray(square: Square, d_file: i8, d_rank: i8, occupancy: u64, blocked: u64) -> u64 {
    let mut file = (square % 8) as i8 + d_file;
    let mut rank = (square / 8) as i8 + d_rank;
    let mut attacks = 0u64;

    while (0..8).contains(&file) && (0..8).contains(&rank) {
        let bit = 1u64 << (rank * 8 + file);
        if blocked & bit != 0 {
            break;
        }
        attacks |= bit;

        if occupancy & bit != 0 {
            break;
        }

        file += d_file;
        rank += d_rank;
    }

    attacks
}

pub fn slider_attacks(square: Square, directions: &[(i8, i8)], occupancy: u64, blocked: u64) -> u64 {
    directions
        .iter()
        .fold(0u64, |acc, &(d_file, d_rank)| {
            acc | trace_ray(square, d_file, d_rank, occupancy, blocked)
        })
}

/// Squares within `radius` steps of 4-directional adjacency, centre included.
pub fn orthogonal_area(center: Square, radius: u8) -> u64 {
    let mut area = 1u64 << center;
    let mut frontier = area;

    for _ in 0..radius {
        let mut next = 0u64;
        let mut remaining = frontier;
        while remaining != 0 {
            let square = remaining.trailing_zeros() as Square;
            remaining &= remaining - 1;
            for &(d_file, d_rank) in &ROOK_DIRECTIONS {
                next |= trace_step(square, d_file, d_rank);
            }
        }
        frontier = next & !area;
        area |= next;
    }

    area
}

#[inline]
fn trace_step(square: Square, d_file: i8, d_rank: i8) -> u64 {
    set_if_valid(
        (square % 8) as i32 + d_file as i32,
        (square / 8) as i32 + d_rank as i32,
    )
}

const fn generate_leaper_table(offsets: &[(i8, i8); 8]) -> [u64; 64] {
    let mut table = [0u64; 64];
    let mut sq = 0usize;

    while sq < 64 {
        let file = (sq % 8) as i32;
        let rank = (sq / 8) as i32;
        let mut attacks = 0u64;
        let mut i = 0usize;

        while i < offsets.len() {
            attacks |= set_if_valid(file + offsets[i].0 as i32, rank + offsets[i].1 as i32);
            i += 1;
        }

        table[sq] = attacks;
        sq += 1;
    }

    table
}

const fn set_if_valid(file: i32, rank: i32) -> u64 {
    if file < 0 || file > 7 || rank < 0 || rank > 7 {
        return 0;
    }

    1u64 << ((rank as usize) * 8 + (file as usize))
}
