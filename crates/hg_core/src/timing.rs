use std::time::Duration;

/// Time between the start of the previous frame and the start of this one
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct DeltaTime(pub Duration);

impl DeltaTime {
    pub fn as_secs_f64(&self) -> f64 {
        self.0.as_secs_f64()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RunningTime(pub Duration);
