//! First-order optimizers over per-vertex parameters
//!
//! Parameters are a flat slice of `Vector3f`, one per vertex. Both optimizers
//! keep their state per parameter and must always be stepped with slices of
//! the same length.

use meshfit_core::{Error, Result, Vector3f};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Updates parameters in place from their gradients.
pub trait Optimizer: Send {
    fn step(&mut self, params: &mut [Vector3f], grads: &[Vector3f]);
}

/// Stochastic gradient descent with heavy-ball or Nesterov momentum.
///
/// The momentum buffer follows `buf = momentum * buf + grad`, seeded with the
/// first gradient, and the update is `param -= lr * buf`.
#[derive(Debug, Clone)]
pub struct Sgd {
    lr: f32,
    momentum: f32,
    nesterov: bool,
    buffer: Vec<Vector3f>,
}

impl Sgd {
    pub fn new(lr: f32, momentum: f32) -> Self {
        Self {
            lr,
            momentum,
            nesterov: false,
            buffer: Vec::new(),
        }
    }

    pub fn with_nesterov(mut self, nesterov: bool) -> Self {
        self.nesterov = nesterov;
        self
    }
}

impl Optimizer for Sgd {
    fn step(&mut self, params: &mut [Vector3f], grads: &[Vector3f]) {
        debug_assert_eq!(params.len(), grads.len());
        if self.momentum == 0.0 {
            for (p, g) in params.iter_mut().zip(grads) {
                *p -= g * self.lr;
            }
            return;
        }

        if self.buffer.len() != grads.len() {
            self.buffer = grads.to_vec();
        } else {
            for (b, g) in self.buffer.iter_mut().zip(grads) {
                *b = *b * self.momentum + g;
            }
        }

        for ((p, b), g) in params.iter_mut().zip(&self.buffer).zip(grads) {
            let update = if self.nesterov { g + b * self.momentum } else { *b };
            *p -= update * self.lr;
        }
    }
}

/// Adam with bias-corrected first and second moment estimates.
#[derive(Debug, Clone)]
pub struct Adam {
    lr: f32,
    beta1: f32,
    beta2: f32,
    eps: f32,
    m: Vec<Vector3f>,
    v: Vec<Vector3f>,
    steps: usize,
}

impl Adam {
    pub fn new(lr: f32) -> Self {
        Self::with_betas(lr, 0.9, 0.999, 1e-8)
    }

    pub fn with_betas(lr: f32, beta1: f32, beta2: f32, eps: f32) -> Self {
        Self {
            lr,
            beta1,
            beta2,
            eps,
            m: Vec::new(),
            v: Vec::new(),
            steps: 0,
        }
    }
}

impl Optimizer for Adam {
    fn step(&mut self, params: &mut [Vector3f], grads: &[Vector3f]) {
        debug_assert_eq!(params.len(), grads.len());
        if self.m.len() != grads.len() {
            self.m = vec![Vector3f::zeros(); grads.len()];
            self.v = vec![Vector3f::zeros(); grads.len()];
        }
        self.steps += 1;
        let t = self.steps as i32;
        let bias1 = 1.0 - self.beta1.powi(t);
        let bias2 = 1.0 - self.beta2.powi(t);

        for (((p, g), m), v) in params.iter_mut().zip(grads).zip(&mut self.m).zip(&mut self.v) {
            *m = *m * self.beta1 + g * (1.0 - self.beta1);
            *v = *v * self.beta2 + g.component_mul(g) * (1.0 - self.beta2);
            let m_hat = *m / bias1;
            let v_hat = *v / bias2;
            let denom = v_hat.map(|x| x.sqrt() + self.eps);
            *p -= m_hat.component_div(&denom) * self.lr;
        }
    }
}

/// Optimizer family selectable from the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
    #[default]
    Sgd,
    Nesterov,
    Adam,
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OptimizerKind::Sgd => "sgd",
            OptimizerKind::Nesterov => "nesterov",
            OptimizerKind::Adam => "adam",
        };
        f.write_str(name)
    }
}

impl FromStr for OptimizerKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sgd" => Ok(OptimizerKind::Sgd),
            "nesterov" => Ok(OptimizerKind::Nesterov),
            "adam" => Ok(OptimizerKind::Adam),
            other => Err(format!("unknown optimizer '{}' (expected sgd, nesterov or adam)", other)),
        }
    }
}

/// Optimizer settings for a fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub kind: OptimizerKind,
    /// Learning rate
    pub lr: f32,
    /// Momentum for SGD, or beta1 for Adam
    pub momentum: f32,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            kind: OptimizerKind::Sgd,
            lr: 1.0,
            momentum: 0.9,
        }
    }
}

impl OptimizerConfig {
    pub fn sgd(lr: f32, momentum: f32) -> Self {
        Self {
            kind: OptimizerKind::Sgd,
            lr,
            momentum,
        }
    }

    pub fn adam(lr: f32) -> Self {
        Self {
            kind: OptimizerKind::Adam,
            lr,
            momentum: 0.9,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.lr.is_finite() || self.lr <= 0.0 {
            return Err(Error::invalid_param("lr", self.lr, "learning rate must be positive"));
        }
        if !(0.0..1.0).contains(&self.momentum) {
            return Err(Error::invalid_param("momentum", self.momentum, "momentum must lie in [0, 1)"));
        }
        Ok(())
    }

    pub fn build(&self) -> Result<Box<dyn Optimizer>> {
        self.validate()?;
        let optimizer: Box<dyn Optimizer> = match self.kind {
            OptimizerKind::Sgd => Box::new(Sgd::new(self.lr, self.momentum)),
            OptimizerKind::Nesterov => Box::new(Sgd::new(self.lr, self.momentum).with_nesterov(true)),
            OptimizerKind::Adam => Box::new(Adam::with_betas(self.lr, self.momentum, 0.999, 1e-8)),
        };
        Ok(optimizer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_plain_sgd() {
        let mut opt = Sgd::new(0.5, 0.0);
        let mut params = vec![Vector3f::new(1.0, 2.0, 3.0)];
        opt.step(&mut params, &[Vector3f::new(2.0, 0.0, -2.0)]);
        assert_relative_eq!(params[0], Vector3f::new(0.0, 2.0, 4.0));
    }

    #[test]
    fn test_momentum_buffer() {
        let mut opt = Sgd::new(1.0, 0.9);
        let mut params = vec![Vector3f::zeros()];
        let g = [Vector3f::new(1.0, 0.0, 0.0)];

        // first step uses the raw gradient
        opt.step(&mut params, &g);
        assert_relative_eq!(params[0].x, -1.0);
        // buf = 0.9 * 1 + 1
        opt.step(&mut params, &g);
        assert_relative_eq!(params[0].x, -2.9, epsilon = 1e-6);
        // buf = 0.9 * 1.9 + 1
        opt.step(&mut params, &g);
        assert_relative_eq!(params[0].x, -5.61, epsilon = 1e-5);
    }

    #[test]
    fn test_nesterov_looks_ahead() {
        let mut opt = Sgd::new(1.0, 0.5).with_nesterov(true);
        let mut params = vec![Vector3f::zeros()];
        let g = [Vector3f::new(0.0, 1.0, 0.0)];
        // buf = g, update = g + 0.5 * buf
        opt.step(&mut params, &g);
        assert_relative_eq!(params[0].y, -1.5);
        // buf = 1.5, update = 1 + 0.75
        opt.step(&mut params, &g);
        assert_relative_eq!(params[0].y, -3.25, epsilon = 1e-6);
    }

    #[test]
    fn test_adam_first_step_is_lr_sized() {
        // bias correction makes the first update lr * sign(g)
        let mut opt = Adam::new(0.1);
        let mut params = vec![Vector3f::zeros()];
        opt.step(&mut params, &[Vector3f::new(5.0, -0.01, 0.0)]);
        assert_relative_eq!(params[0].x, -0.1, epsilon = 1e-5);
        assert_relative_eq!(params[0].y, 0.1, epsilon = 1e-4);
        assert_relative_eq!(params[0].z, 0.0);
    }

    #[test]
    fn test_adam_minimizes_quadratic() {
        let mut opt = Adam::new(0.01);
        let target = Vector3f::new(1.0, -2.0, 0.5);
        let mut params = vec![Vector3f::zeros()];
        for _ in 0..3000 {
            let grad = [(params[0] - target) * 2.0];
            opt.step(&mut params, &grad);
        }
        assert_relative_eq!(params[0], target, epsilon = 5e-2);
    }

    #[test]
    fn test_config_validation() {
        assert!(OptimizerConfig::default().validate().is_ok());
        assert!(OptimizerConfig::sgd(0.0, 0.9).validate().is_err());
        assert!(OptimizerConfig::sgd(-1.0, 0.9).validate().is_err());
        assert!(OptimizerConfig::sgd(1.0, 1.0).validate().is_err());
        assert!(OptimizerConfig::sgd(1.0, -0.1).validate().is_err());
        assert!(OptimizerConfig::adam(1e-3).build().is_ok());
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("Adam".parse::<OptimizerKind>().unwrap(), OptimizerKind::Adam);
        assert_eq!("nesterov".parse::<OptimizerKind>().unwrap(), OptimizerKind::Nesterov);
        assert!("lbfgs".parse::<OptimizerKind>().is_err());
        assert_eq!(OptimizerKind::Sgd.to_string(), "sgd");
    }
}
