// Copyright 2020 Xavier Gillard
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! A smoke test: generates a random board and reports how many moves each
//! of the three solving strategies takes to flood it. Not part of the
//! library's public contract — just a quick way to eyeball the solver on
//! a fresh board from the command line.
use std::time::Instant;

use clap::Parser;
use flood_it_solver::board::{random_board, RandomBoardOptions};
use flood_it_solver::solver::{solve_board, solve_board_greedy, SolveOptions};

/// Generates a random Flood-It board and solves it three ways.
#[derive(Parser)]
struct Args {
    /// Side length of the square board.
    #[arg(long, default_value_t = 14)]
    size: usize,
    /// Number of distinct colors to seed the board with.
    #[arg(long, default_value_t = 6)]
    colors: usize,
}

fn main() {
    let args = Args::parse();
    let board = random_board(RandomBoardOptions { size: args.size, color_count: args.colors })
        .expect("size too small to hold the requested number of colors");

    println!("board:\n{board}\n");

    let start = Instant::now();
    let greedy_path = solve_board_greedy(board.clone(), 0).expect("greedy walk found no solution");
    println!("greedy:     {} moves ({:?})", greedy_path.len() - 1, start.elapsed());

    let start = Instant::now();
    let weighted_path = solve_board(board.clone(), SolveOptions::default()).expect("weighted solve found no solution");
    println!("weighted:   {} moves ({:?})", weighted_path.len() - 1, start.elapsed());

    let start = Instant::now();
    let admissible_path = solve_board(board, SolveOptions { admissible: true }).expect("admissible solve found no solution");
    println!("admissible: {} moves ({:?})", admissible_path.len() - 1, start.elapsed());
}
