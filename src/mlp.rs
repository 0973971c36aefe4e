//! Feed-forward learner: (task one-hot, bits) → 2 parity logits.
//!
//! `depth` affine layers with a nonlinearity between all but the last.
//! First layer maps `n_tasks + n → width`, intermediates `width → width`,
//! last `width → 2`; `depth == 1` collapses to a single affine map straight
//! to the logits. Parameters are flat `Vec<f32>` buffers; forward returns a
//! per-layer activation cache and backward composes analytical gradients
//! through it.

use rand::Rng;

use crate::tensor::{cross_entropy_backward, linear_forward, matmul_f32, transpose_f32};
use crate::train::ConfigError;

pub const N_CLASSES: usize = 2;

/// Nonlinearity between hidden layers, resolved once at construction.
///
/// Identifiers match the original experiment configs ("ReLU", "Tanh",
/// "Sigmoid"); anything else is rejected before a model exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activation {
    ReLU,
    Tanh,
    Sigmoid,
}

impl Activation {
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        match name {
            "ReLU" => Ok(Activation::ReLU),
            "Tanh" => Ok(Activation::Tanh),
            "Sigmoid" => Ok(Activation::Sigmoid),
            _ => Err(ConfigError::UnknownActivation(name.to_string())),
        }
    }

    #[inline]
    pub fn apply(self, z: f32) -> f32 {
        match self {
            Activation::ReLU => z.max(0.0),
            Activation::Tanh => z.tanh(),
            Activation::Sigmoid => 1.0 / (1.0 + (-z).exp()),
        }
    }

    /// Derivative expressed through the activation output `a = f(z)`.
    /// All three supported nonlinearities admit this form.
    #[inline]
    pub fn grad_from_output(self, a: f32) -> f32 {
        match self {
            Activation::ReLU => {
                if a > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::Tanh => 1.0 - a * a,
            Activation::Sigmoid => a * (1.0 - a),
        }
    }
}

/// Learner shape. `in_dim` is `n_tasks + n` for this problem family.
#[derive(Clone, Debug)]
pub struct MlpConfig {
    pub in_dim: usize,
    pub width: usize,
    pub depth: usize,
    pub activation: Activation,
}

impl MlpConfig {
    /// (in, out) dimension per affine layer. `depth == 1` skips the width
    /// entirely: one map from input straight to the logits.
    pub fn layer_dims(&self) -> Vec<(usize, usize)> {
        if self.depth == 1 {
            return vec![(self.in_dim, N_CLASSES)];
        }
        let mut dims = vec![(self.in_dim, self.width)];
        for _ in 0..self.depth - 2 {
            dims.push((self.width, self.width));
        }
        dims.push((self.width, N_CLASSES));
        dims
    }
}

/// One affine layer. `w` is `[in_dim, out_dim]` row-major so the forward
/// pass is a plain `x @ w + b`.
#[derive(Clone, Debug)]
pub struct Linear {
    pub w: Vec<f32>,
    pub b: Vec<f32>,
    pub in_dim: usize,
    pub out_dim: usize,
}

impl Linear {
    fn zeros(in_dim: usize, out_dim: usize) -> Self {
        Linear {
            w: vec![0.0; in_dim * out_dim],
            b: vec![0.0; out_dim],
            in_dim,
            out_dim,
        }
    }
}

/// All trainable parameters of the learner.
#[derive(Clone, Debug)]
pub struct MlpParams {
    pub layers: Vec<Linear>,
    pub activation: Activation,
}

impl MlpParams {
    /// Initialize weights and biases uniform in `±1/sqrt(in_dim)` per layer,
    /// consuming randomness from the run's seeded RNG.
    ///
    /// Fails fast with `InvalidDepth` for `depth == 0` — the shape is not a
    /// function at all in that case.
    pub fn init<R: Rng>(cfg: &MlpConfig, rng: &mut R) -> Result<Self, ConfigError> {
        if cfg.depth == 0 {
            return Err(ConfigError::InvalidDepth(0));
        }
        let mut layers = Vec::with_capacity(cfg.depth);
        for (in_dim, out_dim) in cfg.layer_dims() {
            let bound = 1.0 / (in_dim as f32).sqrt();
            let mut layer = Linear::zeros(in_dim, out_dim);
            for v in layer.w.iter_mut() {
                *v = rng.gen_range(-bound..bound);
            }
            for v in layer.b.iter_mut() {
                *v = rng.gen_range(-bound..bound);
            }
            layers.push(layer);
        }
        Ok(MlpParams {
            layers,
            activation: cfg.activation,
        })
    }

    /// Zero-valued shadow with identical shapes, for gradient accumulation.
    pub fn zeros_like(&self) -> Self {
        MlpParams {
            layers: self
                .layers
                .iter()
                .map(|l| Linear::zeros(l.in_dim, l.out_dim))
                .collect(),
            activation: self.activation,
        }
    }

    pub fn in_dim(&self) -> usize {
        self.layers[0].in_dim
    }

    /// Total trainable scalar count (weights + biases).
    pub fn param_count(&self) -> usize {
        self.layers.iter().map(|l| l.w.len() + l.b.len()).sum()
    }
}

/// Per-layer inputs saved by the forward pass for backward.
/// `inputs[0]` is the batch itself; `inputs[l]` for `l > 0` is the
/// post-activation output feeding layer `l`.
pub struct ForwardCache {
    pub inputs: Vec<Vec<f32>>,
}

/// Training forward pass: returns logits `[rows, 2]` plus the cache.
pub fn forward(params: &MlpParams, x: &[f32], rows: usize) -> (Vec<f32>, ForwardCache) {
    debug_assert_eq!(x.len(), rows * params.in_dim());
    let n_layers = params.layers.len();
    let mut inputs = Vec::with_capacity(n_layers);
    inputs.push(x.to_vec());

    let mut cur = x.to_vec();
    for (l, layer) in params.layers.iter().enumerate() {
        let mut out = vec![0.0f32; rows * layer.out_dim];
        linear_forward(&cur, &layer.w, &layer.b, &mut out, rows, layer.in_dim, layer.out_dim);
        if l + 1 < n_layers {
            for v in out.iter_mut() {
                *v = params.activation.apply(*v);
            }
            inputs.push(out.clone());
        }
        cur = out;
    }

    (cur, ForwardCache { inputs })
}

/// Evaluation forward pass: logits only, no cache. This is the read-only
/// path used by the metrics probes — parameters are never touched.
pub fn forward_logits(params: &MlpParams, x: &[f32], rows: usize) -> Vec<f32> {
    debug_assert_eq!(x.len(), rows * params.in_dim());
    let n_layers = params.layers.len();
    let mut cur = x.to_vec();
    for (l, layer) in params.layers.iter().enumerate() {
        let mut out = vec![0.0f32; rows * layer.out_dim];
        linear_forward(&cur, &layer.w, &layer.b, &mut out, rows, layer.in_dim, layer.out_dim);
        if l + 1 < n_layers {
            for v in out.iter_mut() {
                *v = params.activation.apply(*v);
            }
        }
        cur = out;
    }
    cur
}

/// Backward pass from mean cross-entropy over `targets`. Returns gradients
/// shaped exactly like `params`.
pub fn backward(
    params: &MlpParams,
    cache: &ForwardCache,
    logits: &[f32],
    targets: &[usize],
    rows: usize,
) -> MlpParams {
    let mut grads = params.zeros_like();
    if rows == 0 {
        return grads;
    }

    // d_loss/d_logits = (softmax - one_hot) / rows
    let mut d = vec![0.0f32; rows * N_CLASSES];
    cross_entropy_backward(logits, targets, &mut d, rows, N_CLASSES);

    for l in (0..params.layers.len()).rev() {
        let layer = &params.layers[l];
        let a_prev = &cache.inputs[l];
        debug_assert_eq!(a_prev.len(), rows * layer.in_dim);
        debug_assert_eq!(d.len(), rows * layer.out_dim);

        // d_W = a_prev^T[in, rows] @ d[rows, out]
        let mut a_prev_t = vec![0.0f32; layer.in_dim * rows];
        transpose_f32(a_prev, &mut a_prev_t, rows, layer.in_dim);
        matmul_f32(&a_prev_t, &d, &mut grads.layers[l].w, layer.in_dim, rows, layer.out_dim);

        // d_b = column sums of d
        for r in 0..rows {
            for j in 0..layer.out_dim {
                grads.layers[l].b[j] += d[r * layer.out_dim + j];
            }
        }

        if l > 0 {
            // d_prev = d[rows, out] @ W^T[out, in], then through the
            // activation derivative at layer l's input.
            let mut w_t = vec![0.0f32; layer.out_dim * layer.in_dim];
            transpose_f32(&layer.w, &mut w_t, layer.in_dim, layer.out_dim);
            let mut d_prev = vec![0.0f32; rows * layer.in_dim];
            matmul_f32(&d, &w_t, &mut d_prev, rows, layer.out_dim, layer.in_dim);

            for (dv, &a) in d_prev.iter_mut().zip(a_prev.iter()) {
                *dv *= params.activation.grad_from_output(a);
            }
            d = d_prev;
        }
    }

    grads
}
