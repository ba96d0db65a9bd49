use evg_core::{ErrorInfo, EvgError, Range1D, UniformSource};
use serde::{Deserialize, Serialize};

/// Parameters shaping the importance sampling envelope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeParams {
    /// Resonance mass in GeV.
    pub resonance_mass: f64,
    /// Resonance width in GeV.
    pub resonance_width: f64,
    /// Plateau height of the envelope.
    pub height: f64,
    /// Kinematically allowed W maximum.
    pub w_max: f64,
}

/// Closed-form proposal density over `(QD², W)`.
///
/// Flat in QD². In W the density is a plateau below the resonance mass and a
/// Lorentzian tail above it, or a plain plateau when the resonance lies above
/// the allowed W. Both factors are sampled exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingEnvelope {
    qd2: Range1D,
    w: Range1D,
    params: EnvelopeParams,
    /// Start of the Lorentzian segment, if any.
    tail_start: Option<f64>,
    plateau_area: f64,
    tail_area: f64,
}

impl SamplingEnvelope {
    /// Configures the envelope for one selection.
    pub fn configure(qd2: Range1D, w: Range1D, params: EnvelopeParams) -> Result<Self, EvgError> {
        let degenerate = |name: &str, range: Range1D| {
            EvgError::InvalidEnvelope(
                ErrorInfo::new("envelope-range", "degenerate envelope range")
                    .with_context("variable", name)
                    .with_context("min", range.min)
                    .with_context("max", range.max),
            )
        };
        if !(qd2.width() > 0.0) {
            return Err(degenerate("QD2", qd2));
        }
        if !(w.width() > 0.0) {
            return Err(degenerate("W", w));
        }
        if !(params.height.is_finite() && params.height > 0.0) {
            return Err(EvgError::InvalidEnvelope(
                ErrorInfo::new("envelope-height", "envelope height must be positive")
                    .with_context("height", params.height),
            ));
        }
        if !(params.resonance_width > 0.0) {
            return Err(EvgError::InvalidEnvelope(
                ErrorInfo::new("envelope-width", "resonance width must be positive")
                    .with_context("width", params.resonance_width),
            ));
        }

        let tail_start = if params.w_max > params.resonance_mass && w.max > params.resonance_mass {
            Some(w.min.max(params.resonance_mass))
        } else {
            None
        };
        let (plateau_area, tail_area) = match tail_start {
            Some(start) => (start - w.min, lorentz_integral(&params, start, w.max)),
            None => (w.width(), 0.0),
        };

        Ok(Self {
            qd2,
            w,
            params,
            tail_start,
            plateau_area,
            tail_area,
        })
    }

    /// Envelope parameters.
    pub fn params(&self) -> &EnvelopeParams {
        &self.params
    }

    /// QD² range covered by the envelope.
    pub fn qd2_range(&self) -> Range1D {
        self.qd2
    }

    /// W range covered by the envelope.
    pub fn w_range(&self) -> Range1D {
        self.w
    }

    /// Envelope value at `(qd2, w)`; zero outside the configured region.
    pub fn density(&self, qd2: f64, w: f64) -> f64 {
        if !self.qd2.contains(qd2) || !self.w.contains(w) {
            return 0.0;
        }
        self.params.height * self.w_profile(w)
    }

    /// Draws `(qd2, w)` distributed according to [`SamplingEnvelope::density`].
    pub fn sample(&self, rng: &mut dyn UniformSource) -> (f64, f64) {
        let qd2 = self.qd2.min + self.qd2.width() * rng.uniform();
        let w = self.sample_w(rng);
        (qd2, w)
    }

    fn w_profile(&self, w: f64) -> f64 {
        match self.tail_start {
            Some(_) if w > self.params.resonance_mass => {
                let half = 0.5 * self.params.resonance_width;
                let dw = w - self.params.resonance_mass;
                half * half / (dw * dw + half * half)
            }
            _ => 1.0,
        }
    }

    fn sample_w(&self, rng: &mut dyn UniformSource) -> f64 {
        let total = self.plateau_area + self.tail_area;
        let pick = rng.uniform() * total;
        let u = rng.uniform();
        match self.tail_start {
            Some(start) if pick >= self.plateau_area => {
                let half = 0.5 * self.params.resonance_width;
                let mass = self.params.resonance_mass;
                let lo = ((start - mass) / half).atan();
                let hi = ((self.w.max - mass) / half).atan();
                let w = mass + half * (lo + u * (hi - lo)).tan();
                w.clamp(start, self.w.max)
            }
            _ => {
                let plateau_max = self.tail_start.unwrap_or(self.w.max);
                self.w.min + (plateau_max - self.w.min) * u
            }
        }
    }
}

/// ∫ Lorentzian tail (unit peak) between `a` and `b`.
fn lorentz_integral(params: &EnvelopeParams, a: f64, b: f64) -> f64 {
    let half = 0.5 * params.resonance_width;
    let mass = params.resonance_mass;
    half * (((b - mass) / half).atan() - ((a - mass) / half).atan())
}
