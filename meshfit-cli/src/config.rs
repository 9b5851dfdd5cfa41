//! Fit configuration from TOML files and command-line overrides

use anyhow::{Context, Result};
use clap::Args;
use meshfit_algorithms::{FitConfig, LaplacianMethod, OptimizerKind};
use std::path::Path;

/// Command-line settings; each one given replaces the value from the config file.
#[derive(Debug, Clone, Default, Args)]
pub struct FitOverrides {
    /// Number of optimizer steps [default: 2000]
    #[arg(short = 'n', long)]
    pub iterations: Option<usize>,

    /// Weight of the chamfer distance [default: 1.0]
    #[arg(long)]
    pub w_chamfer: Option<f32>,

    /// Weight of the edge length loss [default: 1.0]
    #[arg(long)]
    pub w_edge: Option<f32>,

    /// Weight of the normal consistency loss [default: 0.01]
    #[arg(long)]
    pub w_normal: Option<f32>,

    /// Weight of the Laplacian smoothing loss [default: 0.1]
    #[arg(long)]
    pub w_laplacian: Option<f32>,

    /// Points sampled from each surface per iteration [default: 5000]
    #[arg(long)]
    pub samples: Option<usize>,

    /// Snapshot period in iterations, 0 to disable [default: 250]
    #[arg(long)]
    pub plot_period: Option<usize>,

    /// Subdivision level of the source ico-sphere [default: 4]
    #[arg(long)]
    pub level: Option<usize>,

    /// Learning rate [default: 1.0]
    #[arg(long)]
    pub lr: Option<f32>,

    /// Momentum, or beta1 for adam [default: 0.9]
    #[arg(long)]
    pub momentum: Option<f32>,

    /// Optimizer: sgd, nesterov or adam [default: sgd]
    #[arg(long)]
    pub optimizer: Option<OptimizerKind>,

    /// Laplacian weighting: uniform, cot or cotcurv [default: uniform]
    #[arg(long)]
    pub laplacian: Option<LaplacianMethod>,

    /// Seed for surface sampling [default: 0]
    #[arg(long)]
    pub seed: Option<u64>,
}

impl FitOverrides {
    pub fn apply(&self, config: &mut FitConfig) {
        if let Some(v) = self.iterations {
            config.iterations = v;
        }
        if let Some(v) = self.w_chamfer {
            config.weights.chamfer = v;
        }
        if let Some(v) = self.w_edge {
            config.weights.edge = v;
        }
        if let Some(v) = self.w_normal {
            config.weights.normal = v;
        }
        if let Some(v) = self.w_laplacian {
            config.weights.laplacian = v;
        }
        if let Some(v) = self.samples {
            config.num_samples = v;
        }
        if let Some(v) = self.plot_period {
            config.plot_period = v;
        }
        if let Some(v) = self.level {
            config.level = v;
        }
        if let Some(v) = self.lr {
            config.optimizer.lr = v;
        }
        if let Some(v) = self.momentum {
            config.optimizer.momentum = v;
        }
        if let Some(v) = self.optimizer {
            config.optimizer.kind = v;
        }
        if let Some(v) = self.laplacian {
            config.laplacian = v;
        }
        if let Some(v) = self.seed {
            config.seed = v;
        }
    }
}

pub fn parse_config(text: &str) -> Result<FitConfig> {
    Ok(toml::from_str(text)?)
}

pub fn load_config(path: &Path) -> Result<FitConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse_config(&text).with_context(|| format!("invalid config file {}", path.display()))
}

/// The file config (or defaults) with command-line overrides applied, validated.
pub fn resolve(path: Option<&Path>, overrides: &FitOverrides) -> Result<FitConfig> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => FitConfig::default(),
    };
    overrides.apply(&mut config);
    config.validate().context("invalid fit configuration")?;
    Ok(config)
}
