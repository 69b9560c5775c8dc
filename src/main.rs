use std::process::ExitCode;

use rand::thread_rng;

use coup_engine::{Coup, DecisionMaker, RandomDecider, TurnOutcome};

fn main() -> ExitCode {
    env_logger::init();

    let participants: Vec<(String, Box<dyn DecisionMaker>)> = ["Avery", "Blair", "Casey", "Drew"]
        .iter()
        .enumerate()
        .map(|(seat, name)| {
            (name.to_string(), Box::new(RandomDecider::new(seat as u64)) as Box<dyn DecisionMaker>)
        })
        .collect();

    let mut rng = thread_rng();
    let mut game = match Coup::new(participants, &mut rng) {
        Ok(game) => game,
        Err(err) => {
            eprintln!("could not set up the game: {err}");
            return ExitCode::FAILURE;
        }
    };

    loop {
        match game.handle_turn(&mut rng) {
            Ok(TurnOutcome::Continue) => {}
            Ok(TurnOutcome::GameOver { winner }) => {
                println!(
                    "{} wins after {} turns",
                    game.players()[winner].name,
                    game.turn() + 1
                );
                match serde_json::to_string_pretty(&game.view_for(winner)) {
                    Ok(view) => println!("{view}"),
                    Err(err) => eprintln!("could not render the final state: {err}"),
                }
                return ExitCode::SUCCESS;
            }
            Err(err) => {
                eprintln!("game aborted: {err}");
                return ExitCode::FAILURE;
            }
        }
    }
}
