//! Adam optimizer over the learner's flat parameter buffers.
//!
//! Per-buffer first/second moment state with bias correction from the
//! optimizer's own step counter. Plain Adam, no weight decay — matching the
//! original experiments.

use crate::mlp::MlpParams;

#[derive(Clone, Debug)]
pub struct AdamConfig {
    pub beta1: f32,
    pub beta2: f32,
    pub eps: f32,
}

impl Default for AdamConfig {
    fn default() -> Self {
        AdamConfig {
            beta1: 0.9,
            beta2: 0.999,
            eps: 1e-8,
        }
    }
}

/// Moment buffers for one flat parameter array.
#[derive(Clone)]
struct MomentBuf {
    m: Vec<f32>,
    v: Vec<f32>,
}

impl MomentBuf {
    fn zeros(n: usize) -> Self {
        MomentBuf {
            m: vec![0.0; n],
            v: vec![0.0; n],
        }
    }
}

/// Core Adam update on one (params, grads, m, v) group, in place.
/// Bias-correction inverses are precomputed by the caller.
#[inline]
fn adam_step_buf(
    params: &mut [f32],
    grads: &[f32],
    m: &mut [f32],
    v: &mut [f32],
    lr: f32,
    beta1: f32,
    beta2: f32,
    eps: f32,
    bc1_inv: f32,
    bc2_inv: f32,
) {
    debug_assert_eq!(params.len(), grads.len());
    for i in 0..params.len() {
        let g = grads[i];
        m[i] = beta1 * m[i] + (1.0 - beta1) * g;
        v[i] = beta2 * v[i] + (1.0 - beta2) * g * g;
        let m_hat = m[i] * bc1_inv;
        let v_hat = v[i] * bc2_inv;
        params[i] -= lr * m_hat / (v_hat.sqrt() + eps);
    }
}

/// Optimizer state: one weight + one bias moment pair per layer.
pub struct Adam {
    pub config: AdamConfig,
    bufs: Vec<(MomentBuf, MomentBuf)>,
    step: u32,
}

impl Adam {
    pub fn new(params: &MlpParams, config: AdamConfig) -> Self {
        let bufs = params
            .layers
            .iter()
            .map(|l| (MomentBuf::zeros(l.w.len()), MomentBuf::zeros(l.b.len())))
            .collect();
        Adam {
            config,
            bufs,
            step: 0,
        }
    }

    /// One update. `grads` must be shaped exactly like `params`.
    pub fn step(&mut self, params: &mut MlpParams, grads: &MlpParams, lr: f32) {
        debug_assert_eq!(params.layers.len(), self.bufs.len());
        debug_assert_eq!(grads.layers.len(), self.bufs.len());

        self.step += 1;
        let c = &self.config;
        let t = self.step as f32;
        let bc1_inv = 1.0 / (1.0 - c.beta1.powf(t));
        let bc2_inv = 1.0 / (1.0 - c.beta2.powf(t));

        for (l, (w_buf, b_buf)) in self.bufs.iter_mut().enumerate() {
            adam_step_buf(
                &mut params.layers[l].w,
                &grads.layers[l].w,
                &mut w_buf.m,
                &mut w_buf.v,
                lr,
                c.beta1,
                c.beta2,
                c.eps,
                bc1_inv,
                bc2_inv,
            );
            adam_step_buf(
                &mut params.layers[l].b,
                &grads.layers[l].b,
                &mut b_buf.m,
                &mut b_buf.v,
                lr,
                c.beta1,
                c.beta2,
                c.eps,
                bc1_inv,
                bc2_inv,
            );
        }
    }

    pub fn step_count(&self) -> u32 {
        self.step
    }
}
