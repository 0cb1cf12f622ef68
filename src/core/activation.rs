use hashbrown::HashMap;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::landscape::{Landscape, Node};
use crate::prng::Prng;

/// The five bands a signal producer normally reports, with their nominal
/// center frequencies in Hz.
pub const STANDARD_BANDS: [(&str, f32); 5] = [
    ("delta", 2.0),
    ("theta", 6.0),
    ("alpha", 10.0),
    ("beta", 20.0),
    ("gamma", 40.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Band {
    pub frequency: f32,
    pub amplitude: f32,
}

impl Band {
    pub fn new(frequency: f32, amplitude: f32) -> Self {
        Self {
            frequency,
            amplitude,
        }
    }

    #[inline]
    fn is_usable(&self) -> bool {
        self.frequency.is_finite() && self.amplitude.is_finite()
    }
}

/// One push from the signal feed: band name -> (frequency, amplitude).
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SignalFrame {
    bands: HashMap<String, Band>,
}

impl SignalFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_band(mut self, name: &str, frequency: f32, amplitude: f32) -> Self {
        self.insert(name, Band::new(frequency, amplitude));
        self
    }

    /// All five standard bands at their nominal frequencies, in `STANDARD_BANDS` order.
    pub fn standard(amplitudes: [f32; 5]) -> Self {
        let mut frame = Self::new();
        for ((name, freq), amp) in STANDARD_BANDS.iter().zip(amplitudes) {
            frame.insert(name, Band::new(*freq, amp));
        }
        frame
    }

    pub fn insert(&mut self, name: &str, band: Band) {
        self.bands.insert(name.to_string(), band);
    }

    pub fn get(&self, name: &str) -> Option<&Band> {
        self.bands.get(name)
    }

    pub fn bands(&self) -> impl Iterator<Item = (&str, &Band)> {
        self.bands.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}

/// Synthetic feed for headless hosts: each standard band's amplitude takes a
/// bounded random walk in [0, 100].
#[derive(Debug, Clone)]
pub struct SignalWalk {
    rng: Prng,
    amplitudes: [f32; 5],
    step: f32,
}

impl SignalWalk {
    pub fn new(rng: Prng) -> Self {
        Self {
            rng,
            amplitudes: [40.0, 30.0, 50.0, 25.0, 10.0],
            step: 6.0,
        }
    }

    pub fn next_frame(&mut self) -> SignalFrame {
        for a in self.amplitudes.iter_mut() {
            *a = (*a + self.rng.gen_range_f32(-self.step, self.step)).clamp(0.0, 100.0);
        }
        SignalFrame::standard(self.amplitudes)
    }
}

/// NaN maps to 0 so a bad input can never poison a node.
#[inline]
pub fn clamp01(x: f32) -> f32 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

/// Resonance-weighted stimulus followed by plasticity smoothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivationEngine {
    /// Falloff of `exp(-|f_node - f_band| / width)`.
    pub resonance_width: f32,
    pub amplitude_gain: f32,
    pub oscillation_gain: f32,
}

impl Default for ActivationEngine {
    fn default() -> Self {
        Self {
            resonance_width: 5.0,
            amplitude_gain: 0.01,
            oscillation_gain: 0.3,
        }
    }
}

impl ActivationEngine {
    #[inline]
    pub fn resonance(&self, node_frequency: f32, band_frequency: f32) -> f32 {
        (-(node_frequency - band_frequency).abs() / self.resonance_width).exp()
    }

    pub fn stimulus(&self, node: &Node, frame: &SignalFrame, now_ms: f64) -> f32 {
        let mut drive = 0.0f32;
        for (_, band) in frame.bands() {
            if !band.is_usable() {
                continue;
            }
            drive += band.amplitude
                * self.resonance(node.resonant_frequency, band.frequency)
                * self.amplitude_gain;
        }
        let osc = (now_ms * 0.001 * node.resonant_frequency as f64).sin() as f32;
        drive + osc * self.oscillation_gain
    }

    /// One tick. Without a frame the landscape is left untouched and `false` is returned.
    pub fn apply(&self, landscape: &mut Landscape, frame: Option<&SignalFrame>, now_ms: f64) -> bool {
        let Some(frame) = frame else {
            return false;
        };

        for node in landscape.nodes.iter_mut() {
            let s = self.stimulus(node, frame, now_ms);
            let p = node.plasticity;
            node.activation = clamp01(node.activation * (1.0 - p) + s * p);
        }

        let nodes = &landscape.nodes;
        for conn in landscape.connections.iter_mut() {
            let src = nodes
                .get(conn.from as usize)
                .map(|n| n.activation)
                .unwrap_or(0.0);
            conn.activation = clamp01(src * conn.conductivity * conn.strength);
        }
        true
    }
}
