use crate::foundation::error::{FoldercutError, FoldercutResult};

/// Timeline frame rate as an exact rational.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32, // must be > 0
}

impl Fps {
    pub fn new(num: u32, den: u32) -> FoldercutResult<Self> {
        if num == 0 {
            return Err(FoldercutError::config("Fps num must be > 0"));
        }
        if den == 0 {
            return Err(FoldercutError::config("Fps den must be > 0"));
        }
        Ok(Self { num, den })
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// The `timebase` text the dialect expects: integral rates print without a
    /// fractional part.
    pub fn timebase(self) -> String {
        if self.den == 1 {
            self.num.to_string()
        } else {
            format!("{}", self.as_f64())
        }
    }

    /// Nearest whole frame for a duration in seconds.
    pub fn secs_to_frames(self, secs: f64) -> u64 {
        (secs * self.as_f64()).round().max(0.0) as u64
    }

    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * f64::from(self.den) / f64::from(self.num)
    }
}
