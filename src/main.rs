//! raypot - Ray Potential Optimizer
//!
//! Runs the primal-dual ray potential optimizer on a built-in scene or a
//! JSON task file and prints the final occupancy.
//!
//! # Usage
//!
//! ```bash
//! raypot --scene a5 --mode convex
//! raypot --task scene.json --iterations 5000 --verbose
//! ```

use std::io;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use ray_potentials::{
    error::Result,
    report::{write_solution, write_state},
    task::{self, Scene},
    Mode, PreconditionerKind, RayOptimizer, SolverConfig, DEFAULT_ITERATIONS,
};

/// Primal-dual optimizer for convex and non-convex ray potentials
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Built-in scene to solve
    #[arg(short, long, value_enum, default_value_t = SceneArg::A5, conflicts_with = "task")]
    scene: SceneArg,

    /// Path to a JSON task file
    #[arg(short, long, value_name = "TASK_FILE")]
    task: Option<PathBuf>,

    /// Relaxation mode (defaults to nonconvex for scenes, to the file's flag for tasks)
    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,

    /// Number of iterations
    #[arg(short, long, default_value_t = DEFAULT_ITERATIONS)]
    iterations: usize,

    /// Preconditioner strategy
    #[arg(short, long, value_enum, default_value_t = PreconditionerArg::Dynamic)]
    preconditioner: PreconditionerArg,

    /// Print the full state before every iteration
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SceneArg {
    /// Single three-cell ray
    A5,
    /// 3x3 square with an occupied center
    CentralCell,
    /// 3x3 square with occupied corners
    Corners,
}

impl From<SceneArg> for Scene {
    fn from(arg: SceneArg) -> Self {
        match arg {
            SceneArg::A5 => Scene::SectionA5,
            SceneArg::CentralCell => Scene::SquareCentralCell,
            SceneArg::Corners => Scene::SquareCorners,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Convex,
    Nonconvex,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Convex => Mode::Convex,
            ModeArg::Nonconvex => Mode::NonConvex,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PreconditionerArg {
    Dynamic,
    Fixed,
}

impl From<PreconditionerArg> for PreconditionerKind {
    fn from(arg: PreconditionerArg) -> Self {
        match arg {
            PreconditionerArg::Dynamic => PreconditionerKind::Dynamic,
            PreconditionerArg::Fixed => PreconditionerKind::Fixed,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    // Load the task
    let (task, scene) = match &args.task {
        Some(path) => {
            let mut task = task::parse_file(path)?;
            if let Some(mode) = args.mode {
                task = task.with_mode(mode.into());
            }
            (task, None)
        }
        None => {
            let scene = Scene::from(args.scene);
            let mode = args.mode.map(Mode::from).unwrap_or_default();
            (scene.build(mode), Some(scene))
        }
    };

    // Create optimizer
    let config = SolverConfig::new()
        .with_iterations(args.iterations)
        .with_preconditioner(args.preconditioner.into());
    let mut optimizer = RayOptimizer::with_config(&task, config)?;

    // Optimize
    let stdout = io::stdout();
    if args.verbose {
        let mut out = stdout.lock();
        let mut dump_result = Ok(());
        optimizer.run_with(|iter, opt| {
            if dump_result.is_ok() {
                dump_result = write_state(&mut out, iter, opt);
            }
        });
        dump_result?;
    } else {
        optimizer.run();
    }

    write_solution(&mut stdout.lock(), &optimizer, scene)?;

    Ok(())
}
