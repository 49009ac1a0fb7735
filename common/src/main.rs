use minesweeper_agent::*;
use std::thread;
use std::time::Duration;

fn main() {
    // --- 1. Initialization ---
    let mut game = Game::new(8, 8, 8);

    println!("--- Autonomous Minesweeper Agent ---");
    println!("Strategy: Prioritize moves proven safe, guess randomly otherwise.");
    println!("Initial Board:");
    print_board(&game);
    thread::sleep(Duration::from_secs(2));

    // --- 2. Game Loop ---
    let mut move_count = 0;
    while game.game_state == GameState::Playing {
        move_count += 1;
        println!("\n--- Move #{} ---", move_count);

        // --- 3. Agent's Decision Logic ---

        // Strategy 1: Find a cell the knowledge base has proven safe.
        let safe_move = game.agent.make_safe_move();

        let cell_to_reveal = if safe_move.is_some() {
            println!("Knowledge base found a guaranteed safe cell.");
            safe_move
        } else {
            // Strategy 2: No safe move is known, so make a random guess.
            println!("No provably safe move known. Making a random guess...");
            game.agent.make_random_move()
        };

        // --- 4. Execute the Chosen Move ---
        if let Some(cell) = cell_to_reveal {
            println!("Agent reveals ({}, {})...", cell.row, cell.col);

            game.reveal_cell(cell).unwrap();

            print_board(&game);
        } else {
            // Every remaining cell is either already revealed or a known
            // mine, so there is nothing left to choose.
            println!("No valid moves left for the agent to make.");
            break;
        }

        // Add a delay to make the game watchable
        thread::sleep(Duration::from_millis(500));
    }

    // --- 5. Final Result ---
    println!("\n--- Game Over ---");

    match game.game_state {
        GameState::Won => println!("Result: The agent identified every mine and won!"),
        GameState::Lost => println!("Result: The agent hit a mine and lost."),
        GameState::Playing => println!("Result: The game ended unexpectedly."),
    }

    println!("\nTrue mine layout:");
    print_mines(&game.board);
}

/// Renders the board as the agent sees it: revealed counts, cells deduced
/// to be mines, and everything else hidden.
fn print_board(game: &Game) {
    // Print header
    print!("   ");
    for col in 0..game.board.width {
        print!("{:^3}", col);
    }
    println!("\n  +{}", "---".repeat(game.board.width));

    // Print rows
    for row in 0..game.board.height {
        print!("{:^2}|", row);
        for col in 0..game.board.width {
            let cell = Cell { row, col };
            let display = if game.agent.moves_made.contains(&cell) {
                format!(" {} ", game.board.nearby_mines(cell))
            } else if game.agent.mines.contains(&cell) {
                " ⚑ ".to_string()
            } else {
                " ■ ".to_string()
            };
            print!("{}", display);
        }
        println!();
    }
    println!();
}

/// Renders the true mine layout, shown once the game is over.
fn print_mines(board: &Board) {
    print!("   ");
    for col in 0..board.width {
        print!("{:^3}", col);
    }
    println!("\n  +{}", "---".repeat(board.width));

    for row in 0..board.height {
        print!("{:^2}|", row);
        for col in 0..board.width {
            if board.is_mine(Cell { row, col }) {
                print!(" X ");
            } else {
                print!(" . ");
            }
        }
        println!();
    }
    println!();
}
