use anyhow::Context;
use clap::{Parser, Subcommand};
use mines_core::{GameConfig, generate_board};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::CliConfig;
use crate::session::{HELP, Input, Session, parse_input};

mod config;
mod session;
mod simulate;
mod view;

#[derive(Parser, Debug)]
#[command(version, about = "Find the gems, avoid the mines!", long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Read defaults from a TOML file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print rounds and reports as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(clap::Args, Debug, Default)]
struct GameArgs {
    /// Board width and height
    #[arg(short, long)]
    grid: Option<u8>,

    /// Number of mines on the board
    #[arg(short, long)]
    mines: Option<u16>,

    /// Amount wagered per round
    #[arg(long)]
    stake: Option<f64>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Play rounds interactively (the default)
    Play {
        #[command(flatten)]
        game: GameArgs,
    },
    /// Print the mine layout a seed commits to
    Verify {
        /// The round's provably fair hash
        #[arg(short, long)]
        seed: String,

        #[command(flatten)]
        game: GameArgs,
    },
    /// Play many rounds with a fixed strategy and report the outcome
    Simulate {
        #[command(flatten)]
        game: GameArgs,

        #[arg(short, long, default_value_t = 1000)]
        rounds: u32,

        /// Gems to reveal before cashing out
        #[arg(long, default_value_t = 3)]
        reveals: u16,

        /// Force a seed instead of random
        #[arg(long)]
        seed: Option<u64>,
    },
}

impl GameArgs {
    fn resolve(&self, config: &CliConfig) -> anyhow::Result<(GameConfig, f64)> {
        let mut config = config.clone();
        if let Some(grid) = self.grid {
            config.grid_size = grid;
        }
        if let Some(mines) = self.mines {
            config.mine_count = mines;
        }
        let game = config.game_config().context("Invalid grid size or mine count")?;
        Ok((game, self.stake.unwrap_or(config.stake)))
    }
}

fn entropy(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_rng(&mut rand::rng()),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let config = match &args.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };
    log::debug!("config: {:?}", config);

    match args.command.unwrap_or(Cmd::Play {
        game: GameArgs::default(),
    }) {
        Cmd::Play { game } => {
            let (game, stake) = game.resolve(&config)?;
            play(&config, game, stake, args.json).await
        }
        Cmd::Verify { seed, game } => {
            let (game, _) = game.resolve(&config)?;
            verify(game, &seed, args.json)
        }
        Cmd::Simulate {
            game,
            rounds,
            reveals,
            seed,
        } => {
            let (game, stake) = game.resolve(&config)?;
            let report = simulate::simulate(&config, game, stake, rounds, reveals, entropy(seed)).await?;
            if args.json {
                println!("{}", serde_json::to_string(&report)?);
            } else {
                println!(
                    "{} rounds: {} won, {} lost, staked {:.2}, paid {:.2}, RTP {:.2}%",
                    report.rounds,
                    report.wins,
                    report.losses,
                    report.staked,
                    report.paid,
                    report.return_to_player() * 100.0
                );
            }
            Ok(())
        }
    }
}

async fn play(config: &CliConfig, game: GameConfig, stake: f64, json: bool) -> anyhow::Result<()> {
    let mut session = Session::new(config, game, stake, entropy(None))?;
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    show(&session, json)?;
    if !json {
        println!("{HELP}");
    }

    loop {
        if !json {
            print!("balance {:.2}> ", session.balance());
            stdout.flush()?;
        }
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let input = match parse_input(&line, session.round().snapshot().stake) {
            Ok(input) => input,
            Err(err) => {
                eprintln!("{err:#}");
                continue;
            }
        };
        match input {
            Input::Quit => break,
            Input::Help => println!("{HELP}"),
            Input::Show => show(&session, json)?,
            Input::Command(command) => {
                for notice in session.apply(command).await {
                    if json {
                        println!("{}", notice.to_json()?);
                    } else {
                        println!("{}", notice.message);
                    }
                }
                show(&session, json)?;
            }
        }
    }
    Ok(())
}

fn show(session: &Session, json: bool) -> anyhow::Result<()> {
    let view = session.view();
    if json {
        println!("{}", view.to_json()?);
    } else {
        println!("{}", view::render(&view));
    }
    Ok(())
}

fn verify(game: GameConfig, seed: &str, json: bool) -> anyhow::Result<()> {
    let board = generate_board(game, seed)?;
    if json {
        println!("{}", serde_json::to_string(&board.mine_coords())?);
        return Ok(());
    }

    println!("{}x{} with {} mines from hash {}", game.grid_size, game.grid_size, game.mine_count, seed);
    for row in 0..board.grid_size() {
        let line: Vec<&str> = (0..board.grid_size())
            .map(|col| if board[(row, col)].is_mine() { "X" } else { "*" })
            .collect();
        println!("{}", line.join(" "));
    }
    Ok(())
}
