//! meshfit CLI - deform an ico-sphere into a target mesh.
//!
//! Usage: meshfit <COMMAND> [OPTIONS]
//!
//! Run `meshfit --help` for available commands. Set `RUST_LOG=debug` for
//! per-iteration losses.

mod config;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use config::FitOverrides;
use meshfit_algorithms::{ico_sphere, FitConfig, FitResult, MeshFitter};
use meshfit_core::{normalize_mesh, Drawable, MeshTopology};
use meshfit_io::{read_mesh, write_mesh, HistoryTable};
use meshfit_visualization::{render_line_plot_svg, render_mesh_snapshot, save_svg, LinePlotParams, ScatterParams};

#[derive(Parser)]
#[command(name = "meshfit")]
#[command(author, version, about = "Fit a deformable ico-sphere to a target mesh", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deform an ico-sphere to match a target mesh
    Fit {
        /// Target mesh file (.obj or .ply)
        target: PathBuf,

        /// Output mesh file (.obj or .ply)
        #[arg(short, long, default_value = "fitted.obj")]
        output: PathBuf,

        /// TOML file with fit settings; command-line flags take precedence
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory for periodic SVG snapshots and the loss plot
        #[arg(long)]
        snapshots: Option<PathBuf>,

        /// Write the per-iteration losses as CSV
        #[arg(long)]
        history: Option<PathBuf>,

        /// Write the loss curves as SVG
        #[arg(long)]
        loss_plot: Option<PathBuf>,

        #[command(flatten)]
        overrides: FitOverrides,
    },

    /// Write a unit ico-sphere
    Sphere {
        /// Output mesh file (.obj or .ply)
        output: PathBuf,

        /// Subdivision level
        #[arg(short, long, default_value = "4")]
        level: usize,
    },

    /// Display mesh information
    Info {
        /// Input mesh file
        mesh: PathBuf,
    },

    /// Print the default fit settings as TOML
    Defaults,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Fit {
            target,
            output,
            config,
            snapshots,
            history,
            loss_plot,
            overrides,
        } => {
            let config = config::resolve(config.as_deref(), &overrides)?;
            let loss_plot = loss_plot.or_else(|| snapshots.as_ref().map(|dir| dir.join("losses.svg")));
            cmd_fit(&target, &output, config, snapshots.as_deref(), history.as_deref(), loss_plot.as_deref())
        }
        Commands::Sphere { output, level } => cmd_sphere(&output, level),
        Commands::Info { mesh } => cmd_info(&mesh),
        Commands::Defaults => {
            print!("{}", toml::to_string(&FitConfig::default())?);
            Ok(())
        }
    }
}

fn cmd_fit(
    target_path: &Path,
    output: &Path,
    config: FitConfig,
    snapshots: Option<&Path>,
    history: Option<&Path>,
    loss_plot: Option<&Path>,
) -> Result<()> {
    let target = read_mesh(target_path)
        .with_context(|| format!("failed to read target mesh {}", target_path.display()))?;
    let (target, normalization) = normalize_mesh(&target).context("failed to normalize target mesh")?;
    log::info!(
        "normalized target: center ({:.4}, {:.4}, {:.4}), scale {:.4}",
        normalization.center.x,
        normalization.center.y,
        normalization.center.z,
        normalization.scale
    );

    if let Some(dir) = snapshots {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create snapshot directory {}", dir.display()))?;
    }

    let scatter = ScatterParams::default();
    let start = Instant::now();
    let fitter = MeshFitter::new(target, config)?;
    let result: FitResult = fitter
        .run(|iteration, mesh| match snapshots {
            Some(dir) => {
                let svg = render_mesh_snapshot(mesh, &format!("iter: {}", iteration), &scatter);
                save_svg(&svg, dir.join(format!("iter_{:05}.svg", iteration)))
            }
            None => Ok(()),
        })
        .context("mesh fit failed")?;
    let elapsed = start.elapsed();

    let fitted = normalization.denormalize_mesh(&result.mesh);
    write_mesh(&fitted, output).with_context(|| format!("failed to write {}", output.display()))?;

    if let Some(path) = history {
        history_table(&result)
            .save(path)
            .with_context(|| format!("failed to write loss history {}", path.display()))?;
    }
    if let Some(path) = loss_plot {
        let svg = render_line_plot_svg(&result.history.series(), &LinePlotParams::default());
        save_svg(&svg, path).with_context(|| format!("failed to write loss plot {}", path.display()))?;
    }

    println!("Iterations: {}", result.iterations);
    if let Some(last) = result.history.last() {
        println!(
            "Final losses: chamfer {:.6}, edge {:.6}, normal {:.6}, laplacian {:.6}, total {:.6}",
            last.chamfer, last.edge, last.normal, last.laplacian, last.total
        );
    }
    println!("Time: {:.2?}", elapsed);
    println!("Wrote {}", output.display());
    Ok(())
}

fn history_table(result: &FitResult) -> HistoryTable {
    let mut table = HistoryTable::new();
    for (name, values) in result.history.series() {
        table = table.with_column(name, values);
    }
    table.with_column("total", &result.history.total)
}

fn cmd_sphere(output: &Path, level: usize) -> Result<()> {
    let sphere = ico_sphere(level)?;
    write_mesh(&sphere, output).with_context(|| format!("failed to write {}", output.display()))?;
    println!(
        "Wrote level {} ico-sphere ({} vertices, {} faces) to {}",
        level,
        sphere.vertex_count(),
        sphere.face_count(),
        output.display()
    );
    Ok(())
}

fn cmd_info(path: &Path) -> Result<()> {
    let mesh = read_mesh(path).with_context(|| format!("failed to read {}", path.display()))?;
    let topology = MeshTopology::from_mesh(&mesh)?;

    println!("File: {}", path.display());
    println!("Vertices: {}", mesh.vertex_count());
    println!("Faces: {}", mesh.face_count());
    println!("Edges: {}", topology.edge_count());
    println!("Boundary edges: {}", topology.boundary_edges().count());
    println!("Closed: {}", topology.is_closed());
    println!("Surface area: {:.6}", mesh.surface_area());

    let (min, max) = mesh.bounding_box();
    println!(
        "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
        min.x, min.y, min.z, max.x, max.y, max.z
    );
    let diag = max - min;
    println!("Dimensions: {:.3} x {:.3} x {:.3}", diag.x, diag.y, diag.z);
    Ok(())
}
