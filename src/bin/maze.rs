use std::path::PathBuf;
use std::process::ExitCode;

use anstream::eprintln;
use anstream::println;
use clap::Parser;
use owo_colors::OwoColorize;

use maze_search::algorithms::uninformed::solve_with_policy;
use maze_search::frontier::FrontierPolicy;
use maze_search::problems::maze_2d::Maze2DProblem;
use maze_search::render;
use maze_search::render::RenderConfig;
use maze_search::view::ClassificationView;
use maze_search::view::DisplayOptions;
use maze_search::view::classify;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

/// Finds a way from `A` to `B` through a text maze.
#[derive(Parser, Debug)]
#[clap(long_version = maze_search::build::CLAP_LONG_VERSION)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Maze description. `A` is the start, `B` the goal, spaces are open and
    /// anything else is a wall.
    #[arg()]
    pub maze: PathBuf,

    /// Order in which discovered cells are expanded.
    #[arg(long, env = "MAZE_FRONTIER", value_enum, default_value_t = FrontierPolicy::Stack)]
    pub frontier: FrontierPolicy,

    /// Where to write the rendered maze.
    #[arg(short, long, env = "MAZE_IMAGE", default_value = "maze.png")]
    pub output: PathBuf,
    #[arg(long, default_value_t = 50u32)]
    pub cell_size: u32,
    #[arg(long, default_value_t = 2u32)]
    pub cell_border: u32,
    /// Don't highlight the solution in the image.
    #[arg(long)]
    pub hide_solution: bool,
    /// Don't highlight explored cells in the image.
    #[arg(long)]
    pub hide_explored: bool,

    /// Give up after expanding this many cells.
    #[arg(long, env = "MAZE_MAX_EXPANSIONS")]
    pub max_expansions: Option<usize>,
    /// Print search statistics.
    #[arg(long)]
    pub stats: bool,

    #[command(flatten)]
    color: colorchoice_clap::Color,
}

impl Args {
    fn render_config(&self) -> RenderConfig {
        RenderConfig {
            cell_size: self.cell_size,
            cell_border: self.cell_border,
            show_solution: !self.hide_solution,
            show_explored: !self.hide_explored,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    args.color.write_global();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let problem = match Maze2DProblem::try_from(args.maze.as_path()) {
        Ok(problem) => problem,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            return ExitCode::FAILURE;
        }
    };

    println!("{}", "Maze:".bold());
    println!();
    println!("{}", classify(&problem, None, None, DisplayOptions::default()));

    println!("Solving with a {} frontier...", args.frontier.cyan());
    let mut stdout = std::io::stdout();
    let stats = args.stats.then_some(&mut stdout as &mut dyn std::io::Write);
    let result = solve_with_policy(problem.clone(), args.frontier, args.max_expansions, stats);
    println!("States Explored: {}", result.num_expanded.green());

    let path = match &result.outcome {
        Ok(path) => path,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            return ExitCode::FAILURE;
        }
    };

    println!("{} {} steps", "Solution:".bold(), path.len());
    println!();
    println!(
        "{}",
        ClassificationView::from_result(&problem, &result, DisplayOptions::default())
    );

    let config = args.render_config();
    let view = ClassificationView::from_result(&problem, &result, config.display_options());
    if let Err(e) = render::save(&view, &config, &args.output) {
        eprintln!("{}: {e}", "error".red().bold());
        return ExitCode::FAILURE;
    }
    println!("Image written to {}", args.output.display().yellow());

    ExitCode::SUCCESS
}
