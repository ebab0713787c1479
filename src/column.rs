// Copyright (c) 2026 rezky_nightky

use rand::distr::{Distribution, Uniform};
use rand::Rng;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnSpeeds {
    speeds: Vec<u16>,
    max: u16,
}

impl ColumnSpeeds {
    /// Draws each speed from `[min, max)`. The range must be non-empty.
    pub fn random<R: Rng + ?Sized>(cols: u16, min: u16, max: u16, rng: &mut R) -> Self {
        let dist = Uniform::new(min, max).expect("speed range validated by Settings");
        let speeds: Vec<u16> = (0..cols).map(|_| dist.sample(rng)).collect();
        let max = speeds.iter().copied().max().unwrap_or(0);
        Self { speeds, max }
    }

    #[cfg(test)]
    pub fn from_vec(speeds: Vec<u16>) -> Self {
        let max = speeds.iter().copied().max().unwrap_or(0);
        Self { speeds, max }
    }

    pub fn get(&self, col: u16) -> u16 {
        self.speeds[col as usize]
    }

    pub fn max(&self) -> u16 {
        self.max
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.speeds.len()
    }

    #[cfg(test)]
    pub fn as_slice(&self) -> &[u16] {
        &self.speeds
    }

    pub fn is_due(&self, col: u16, frame: u64) -> bool {
        frame % u64::from(self.get(col)) == 0
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::ColumnSpeeds;

    #[test]
    fn speeds_stay_in_right_exclusive_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let s = ColumnSpeeds::random(500, 1, 6, &mut rng);
        assert_eq!(s.len(), 500);
        assert!(s.as_slice().iter().all(|&v| (1..6).contains(&v)));
        assert_eq!(s.max(), *s.as_slice().iter().max().unwrap());
    }

    #[test]
    fn single_value_range_is_constant() {
        let mut rng = StdRng::seed_from_u64(1);
        let s = ColumnSpeeds::random(10, 3, 4, &mut rng);
        assert!(s.as_slice().iter().all(|&v| v == 3));
        assert_eq!(s.max(), 3);
    }

    #[test]
    fn due_every_speed_frames() {
        let s = ColumnSpeeds::from_vec(vec![1, 3]);
        let due: Vec<u64> = (0..7).filter(|&f| s.is_due(1, f)).collect();
        assert_eq!(due, vec![0, 3, 6]);
        assert!((0..7).all(|f| s.is_due(0, f)));
    }

    #[test]
    fn no_columns_means_zero_max() {
        let mut rng = StdRng::seed_from_u64(1);
        let s = ColumnSpeeds::random(0, 1, 6, &mut rng);
        assert_eq!(s.max(), 0);
    }
}
