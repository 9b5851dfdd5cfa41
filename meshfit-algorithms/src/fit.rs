//! Fitting a deformable ico-sphere to a target mesh
//!
//! The source mesh is never modified. Each iteration offsets its vertices by
//! the learned per-vertex displacements, samples both surfaces, evaluates the
//! weighted chamfer distance and regularizers, and takes one optimizer step on
//! the displacements.

use crate::chamfer::chamfer_distance;
use crate::loss::{EdgeLoss, LaplacianMethod, LaplacianSmoothing, LossOutput, MeshRegularizer, NormalConsistency};
use crate::optim::{Optimizer, OptimizerConfig};
use crate::primitives::{ico_sphere, MAX_ICO_SPHERE_LEVEL};
use crate::sampling::AreaSampler;
use meshfit_core::{Error, MeshTopology, Result, TriangleMesh, Vector3f};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Relative weights of the four loss terms.
///
/// A zero weight removes the term from the gradient; its value is still recorded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LossWeights {
    pub chamfer: f32,
    pub edge: f32,
    pub normal: f32,
    pub laplacian: f32,
}

impl Default for LossWeights {
    fn default() -> Self {
        Self {
            chamfer: 1.0,
            edge: 1.0,
            normal: 0.01,
            laplacian: 0.1,
        }
    }
}

impl LossWeights {
    pub fn validate(&self) -> Result<()> {
        for (name, w) in [
            ("w_chamfer", self.chamfer),
            ("w_edge", self.edge),
            ("w_normal", self.normal),
            ("w_laplacian", self.laplacian),
        ] {
            if !w.is_finite() || w < 0.0 {
                return Err(Error::invalid_param(name, w, "loss weights must be non-negative"));
            }
        }
        Ok(())
    }
}

/// Configuration for a mesh fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Number of optimizer steps
    pub iterations: usize,
    /// Points sampled from each surface per iteration
    #[serde(alias = "samples")]
    pub num_samples: usize,
    /// Observer period in iterations, 0 to disable
    pub plot_period: usize,
    /// Subdivision level of the source ico-sphere
    pub level: usize,
    /// Seed for surface sampling
    pub seed: u64,
    /// Target length for the edge loss
    pub edge_target_length: f32,
    pub laplacian: LaplacianMethod,
    pub weights: LossWeights,
    pub optimizer: OptimizerConfig,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            iterations: 2000,
            num_samples: 5000,
            plot_period: 250,
            level: 4,
            seed: 0,
            weights: LossWeights::default(),
            edge_target_length: 0.0,
            laplacian: LaplacianMethod::Uniform,
            optimizer: OptimizerConfig::default(),
        }
    }
}

impl FitConfig {
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_num_samples(mut self, num_samples: usize) -> Self {
        self.num_samples = num_samples;
        self
    }

    pub fn with_plot_period(mut self, plot_period: usize) -> Self {
        self.plot_period = plot_period;
        self
    }

    pub fn with_level(mut self, level: usize) -> Self {
        self.level = level;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_weights(mut self, weights: LossWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_laplacian(mut self, method: LaplacianMethod) -> Self {
        self.laplacian = method;
        self
    }

    pub fn with_optimizer(mut self, optimizer: OptimizerConfig) -> Self {
        self.optimizer = optimizer;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        self.optimizer.validate()?;
        if self.num_samples == 0 {
            return Err(Error::invalid_param("num_samples", self.num_samples, "at least one sample is required"));
        }
        if self.level > MAX_ICO_SPHERE_LEVEL {
            return Err(Error::invalid_param("level", self.level, "ico-sphere level too large"));
        }
        if !self.edge_target_length.is_finite() || self.edge_target_length < 0.0 {
            return Err(Error::invalid_param(
                "edge_target_length",
                self.edge_target_length,
                "target edge length must be non-negative",
            ));
        }
        Ok(())
    }
}

/// Unweighted loss terms of one iteration, plus the weighted total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StepLosses {
    pub chamfer: f32,
    pub edge: f32,
    pub normal: f32,
    pub laplacian: f32,
    pub total: f32,
}

/// Per-iteration loss values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LossHistory {
    pub chamfer: Vec<f32>,
    pub edge: Vec<f32>,
    pub normal: Vec<f32>,
    pub laplacian: Vec<f32>,
    pub total: Vec<f32>,
}

impl LossHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            chamfer: Vec::with_capacity(capacity),
            edge: Vec::with_capacity(capacity),
            normal: Vec::with_capacity(capacity),
            laplacian: Vec::with_capacity(capacity),
            total: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, losses: &StepLosses) {
        self.chamfer.push(losses.chamfer);
        self.edge.push(losses.edge);
        self.normal.push(losses.normal);
        self.laplacian.push(losses.laplacian);
        self.total.push(losses.total);
    }

    pub fn len(&self) -> usize {
        self.total.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total.is_empty()
    }

    /// Losses recorded at `iteration`.
    pub fn get(&self, iteration: usize) -> Option<StepLosses> {
        Some(StepLosses {
            chamfer: *self.chamfer.get(iteration)?,
            edge: *self.edge.get(iteration)?,
            normal: *self.normal.get(iteration)?,
            laplacian: *self.laplacian.get(iteration)?,
            total: *self.total.get(iteration)?,
        })
    }

    pub fn last(&self) -> Option<StepLosses> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    /// Named series in plotting order.
    pub fn series(&self) -> [(&'static str, &[f32]); 4] {
        [
            ("chamfer", self.chamfer.as_slice()),
            ("edge", self.edge.as_slice()),
            ("normal", self.normal.as_slice()),
            ("laplacian", self.laplacian.as_slice()),
        ]
    }
}

/// Outcome of a completed fit.
#[derive(Debug, Clone)]
pub struct FitResult {
    /// The deformed mesh of the last iteration, whose losses end the history
    pub mesh: TriangleMesh,
    /// Offsets that produce `mesh` from the source
    pub offsets: Vec<Vector3f>,
    pub history: LossHistory,
    pub iterations: usize,
}

/// Drives the optimization of per-vertex offsets.
pub struct MeshFitter {
    config: FitConfig,
    target: TriangleMesh,
    target_sampler: AreaSampler,
    source: TriangleMesh,
    topology: MeshTopology,
    edge: EdgeLoss,
    normal: NormalConsistency,
    laplacian: LaplacianSmoothing,
    offsets: Vec<Vector3f>,
    optimizer: Box<dyn Optimizer>,
    rng: StdRng,
    history: LossHistory,
    last_mesh: Option<TriangleMesh>,
}

impl MeshFitter {
    /// Fit an ico-sphere at `config.level` to `target`.
    ///
    /// `target` is used as given; normalize it first for the default scales to apply.
    pub fn new(target: TriangleMesh, config: FitConfig) -> Result<Self> {
        config.validate()?;
        let source = ico_sphere(config.level)?;
        Self::with_source(target, source, config)
    }

    /// Fit an arbitrary source mesh to `target`.
    pub fn with_source(target: TriangleMesh, source: TriangleMesh, config: FitConfig) -> Result<Self> {
        config.validate()?;
        let target_sampler = AreaSampler::new(&target)?;
        let topology = MeshTopology::from_mesh(&source)?;
        if !topology.is_closed() {
            log::warn!("source mesh has {} boundary edges", topology.boundary_edges().count());
        }
        let optimizer = config.optimizer.build()?;

        log::info!(
            "fitting source ({} vertices, {} faces) to target ({} vertices, {} faces)",
            source.vertex_count(),
            source.face_count(),
            target.vertex_count(),
            target.face_count()
        );

        Ok(Self {
            edge: EdgeLoss::new(config.edge_target_length),
            normal: NormalConsistency,
            laplacian: LaplacianSmoothing::new(config.laplacian),
            offsets: vec![Vector3f::zeros(); source.vertex_count()],
            rng: StdRng::seed_from_u64(config.seed),
            history: LossHistory::with_capacity(config.iterations),
            last_mesh: None,
            config,
            target,
            target_sampler,
            source,
            topology,
            optimizer,
        })
    }

    pub fn config(&self) -> &FitConfig {
        &self.config
    }

    pub fn source(&self) -> &TriangleMesh {
        &self.source
    }

    pub fn target(&self) -> &TriangleMesh {
        &self.target
    }

    pub fn topology(&self) -> &MeshTopology {
        &self.topology
    }

    pub fn offsets(&self) -> &[Vector3f] {
        &self.offsets
    }

    pub fn history(&self) -> &LossHistory {
        &self.history
    }

    /// Number of completed iterations.
    pub fn iteration(&self) -> usize {
        self.history.len()
    }

    /// The source mesh displaced by the current offsets.
    pub fn deformed_mesh(&self) -> Result<TriangleMesh> {
        self.source.offset_vertices(&self.offsets)
    }

    /// Loss terms and the gradient of the weighted total with respect to the
    /// vertices of `mesh`, which must share the source's faces.
    ///
    /// Every term is evaluated and reported; terms with zero weight add
    /// nothing to the gradient.
    pub fn evaluate(&mut self, mesh: &TriangleMesh) -> Result<(StepLosses, Vec<Vector3f>)> {
        if mesh.vertex_count() != self.source.vertex_count() || mesh.faces != self.source.faces {
            return Err(Error::InvalidData(format!(
                "mesh with {} vertices and {} faces does not share the source's {} vertices and {} faces",
                mesh.vertex_count(),
                mesh.face_count(),
                self.source.vertex_count(),
                self.source.face_count()
            )));
        }

        let weights = self.config.weights;
        let mut grad = vec![Vector3f::zeros(); mesh.vertex_count()];
        let mut losses = StepLosses::default();

        let target_samples = self
            .target_sampler
            .sample(&self.target, self.config.num_samples, &mut self.rng);
        let source_samples = AreaSampler::new(mesh)?.sample(mesh, self.config.num_samples, &mut self.rng);
        let chamfer = chamfer_distance(&target_samples.points.points, &source_samples.points.points)?;
        if weights.chamfer > 0.0 {
            let point_grads: Vec<Vector3f> = chamfer.grad.iter().map(|g| g * weights.chamfer).collect();
            source_samples.backpropagate(&mesh.faces, &point_grads, &mut grad);
        }
        losses.chamfer = chamfer.loss;

        let regularizers: [(&dyn MeshRegularizer, f32, &mut f32); 3] = [
            (&self.edge, weights.edge, &mut losses.edge),
            (&self.normal, weights.normal, &mut losses.normal),
            (&self.laplacian, weights.laplacian, &mut losses.laplacian),
        ];
        for (term, weight, value) in regularizers {
            let out: LossOutput = term.evaluate(mesh, &self.topology);
            if weight > 0.0 {
                out.accumulate_into(weight, &mut grad);
            }
            *value = out.value;
        }

        losses.total = [
            (weights.chamfer, losses.chamfer),
            (weights.edge, losses.edge),
            (weights.normal, losses.normal),
            (weights.laplacian, losses.laplacian),
        ]
        .iter()
        .filter(|(w, _)| *w > 0.0)
        .map(|(w, v)| w * v)
        .sum();
        Ok((losses, grad))
    }

    /// Run one iteration on the current offsets.
    pub fn step(&mut self) -> Result<StepLosses> {
        let mesh = self.deformed_mesh()?;
        self.step_on(mesh)
    }

    fn step_on(&mut self, mesh: TriangleMesh) -> Result<StepLosses> {
        let iteration = self.iteration();
        let (losses, grad) = self.evaluate(&mesh)?;
        if !losses.total.is_finite() {
            return Err(Error::Algorithm(format!(
                "loss became non-finite at iteration {} ({:?})",
                iteration, losses
            )));
        }
        self.history.push(&losses);
        self.last_mesh = Some(mesh);
        self.optimizer.step(&mut self.offsets, &grad);
        log::debug!(
            "iter {}: total {:.6} chamfer {:.6} edge {:.6} normal {:.6} laplacian {:.6}",
            iteration,
            losses.total,
            losses.chamfer,
            losses.edge,
            losses.normal,
            losses.laplacian
        );
        Ok(losses)
    }

    /// Run the remaining iterations, handing the deformed mesh to `observer`
    /// every `plot_period` iterations before that iteration's step.
    pub fn run<F>(mut self, mut observer: F) -> Result<FitResult>
    where
        F: FnMut(usize, &TriangleMesh) -> Result<()>,
    {
        let period = self.config.plot_period;
        while self.iteration() < self.config.iterations {
            let iteration = self.iteration();
            let mesh = self.deformed_mesh()?;
            if period > 0 && iteration % period == 0 {
                observer(iteration, &mesh)?;
            }
            let losses = self.step_on(mesh)?;
            if period > 0 && iteration % period == 0 {
                log::info!("iter {}/{}: loss {:.6}", iteration, self.config.iterations, losses.total);
            }
        }
        self.finish()
    }

    /// Stop and return the mesh of the last completed iteration, or the
    /// undeformed source if none ran.
    pub fn finish(mut self) -> Result<FitResult> {
        let mesh = match self.last_mesh.take() {
            Some(mesh) => mesh,
            None => self.deformed_mesh()?,
        };
        let offsets = mesh
            .vertices
            .iter()
            .zip(&self.source.vertices)
            .map(|(v, s)| v - s)
            .collect();
        if let Some(last) = self.history.last() {
            log::info!(
                "finished after {} iterations: chamfer {:.6} total {:.6}",
                self.history.len(),
                last.chamfer,
                last.total
            );
        }
        Ok(FitResult {
            mesh,
            iterations: self.history.len(),
            offsets,
            history: self.history,
        })
    }
}

/// Fit an ico-sphere to `target` without observing intermediate meshes.
pub fn fit_mesh(target: TriangleMesh, config: FitConfig) -> Result<FitResult> {
    MeshFitter::new(target, config)?.run(|_, _| Ok(()))
}
