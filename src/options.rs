use bon::Builder;
use serde::{Deserialize, Serialize};

/// Affine transform applied to decoded positions.
///
/// Applied as `p * scale + bias`, then the Y/Z swap, then the Z negation, so
/// `invert_z` always flips the axis that ends up in the Z slot.
#[derive(Clone, Copy, Debug, PartialEq, Builder, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DecodeOptions {
    #[builder(default = 1.0)]
    pub scale: f32,
    #[builder(default)]
    pub bias: [f32; 3],
    #[builder(default)]
    #[serde(rename = "swapYZ")]
    pub swap_yz: bool,
    #[builder(default)]
    pub invert_z: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            bias: [0.0; 3],
            swap_yz: false,
            invert_z: false,
        }
    }
}

impl DecodeOptions {
    pub fn from_json_slice(bytes: &[u8]) -> crate::error::TranscodeResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| crate::error::malformed(format!("decode options JSON: {e}")))
    }

    pub fn apply(&self, p: [f64; 3]) -> [f64; 3] {
        let scale = self.scale as f64;
        let [x, mut y, mut z] =
            std::array::from_fn::<f64, 3, _>(|i| p[i] * scale + self.bias[i] as f64);
        if self.swap_yz {
            std::mem::swap(&mut y, &mut z);
        }
        if self.invert_z {
            z = -z;
        }
        [x, y, z]
    }
}
