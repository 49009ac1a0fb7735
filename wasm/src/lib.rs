use minesweeper_agent as ms;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn create_game(size: u8, mines: u8) -> Vec<u8> {
    console_error_panic_hook::set_once();

    let game = ms::Game::new(size as usize, size as usize, mines as usize);
    let bts = game.serialize();
    bts
}

#[wasm_bindgen]
pub fn reveal_cell(bts: Vec<u8>, row: usize, col: usize) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut game = ms::Game::deserialize(&bts);
    let cell = ms::Cell { row, col };
    let res = game.reveal_cell(cell).map_err(|e| e.to_string())?;
    let mut xs = game.serialize();
    xs.push(if res { 0 } else { 1 });
    Ok(xs)
}

#[wasm_bindgen]
pub fn agent_move(bts: Vec<u8>) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut game = ms::Game::deserialize(&bts);
    let cell = game
        .agent
        .make_safe_move()
        .or_else(|| game.agent.make_random_move())
        .ok_or("no_moves_left".to_string())?;
    let res = game.reveal_cell(cell).map_err(|e| e.to_string())?;
    let mut xs = game.serialize();
    xs.push(cell.row as u8);
    xs.push(cell.col as u8);
    xs.push(if res { 0 } else { 1 });
    Ok(xs)
}

#[wasm_bindgen]
pub fn get_cells(bts: Vec<u8>) -> Vec<i8> {
    console_error_panic_hook::set_once();

    let game = ms::Game::deserialize(&bts);
    // -1 is a hidden cell, -2 a cell deduced to be a mine, anything else a
    // revealed adjacency count.
    (0..game.board.height)
        .flat_map(|row| (0..game.board.width).map(move |col| ms::Cell { row, col }))
        .map(|cell| {
            if game.agent.moves_made.contains(&cell) {
                game.board.nearby_mines(cell) as i8
            } else if game.agent.mines.contains(&cell) {
                -2
            } else {
                -1
            }
        })
        .collect()
}

#[wasm_bindgen]
pub fn game_state(bts: Vec<u8>) -> u8 {
    console_error_panic_hook::set_once();

    let game = ms::Game::deserialize(&bts);
    match game.game_state {
        ms::GameState::Playing => 0,
        ms::GameState::Won => 1,
        ms::GameState::Lost => 2,
    }
}
