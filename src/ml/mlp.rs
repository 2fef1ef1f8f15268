use burn::{
    module::Param,
    nn::{
        Dropout, DropoutConfig,
        Initializer,
        LeakyRelu, LeakyReluConfig,
        Linear, LinearConfig,
    },
    prelude::*,
};

use crate::ml::init::orthogonal;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally, do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct MlpConfig {
    pub n_in:     usize,
    pub n_hidden: usize,
    #[config(default = 0.2)]
    pub dropout:  f64,
    #[config(default = 0.1)]
    pub negative_slope: f64,
}

impl MlpConfig {
    /// Orthogonal weight, zero bias. Parameters are never reset
    /// after this.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Mlp<B> {
        let mut linear = LinearConfig::new(self.n_in, self.n_hidden)
            .with_initializer(Initializer::Zeros)
            .init(device);
        // burn stores the weight as [d_input, d_output]
        linear.weight = Param::from_tensor(orthogonal(self.n_in, self.n_hidden, 1.0, device));

        let activation = LeakyReluConfig::new()
            .with_negative_slope(self.negative_slope)
            .init();
        let dropout = DropoutConfig::new(self.dropout).init();
        Mlp { linear, activation, dropout }
    }
}

/// Dropout → affine → leaky ReLU.
///
/// Dropout only fires on autodiff backends, so `mlp.valid()` (or
/// any inference backend) gives the deterministic transform.
#[derive(Module, Debug)]
pub struct Mlp<B: Backend> {
    pub linear:     Linear<B>,
    pub activation: LeakyRelu,
    pub dropout:    Dropout,
}

impl<B: Backend> Mlp<B> {
    /// x: [..., n_in] → [..., n_hidden]
    pub fn forward<const D: usize>(&self, x: Tensor<B, D>) -> Tensor<B, D> {
        let x = self.dropout.forward(x);
        let x = self.linear.forward(x);
        self.activation.forward(x)
    }
}
