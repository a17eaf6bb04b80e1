use crate::sliding::SlidingWindow;

/// Moving average of the most recent raw samples, updated in O(1).
pub struct RingAverager<C>
where
    C: AsRef<[u16]> + AsMut<[u16]>,
{
    window: SlidingWindow<u16, C>,
    /// Always equals the sum of the samples currently in `window`
    sum: u32,
}

impl<C> RingAverager<C>
where
    C: AsRef<[u16]> + AsMut<[u16]>,
{
    pub fn new(buffer: C) -> Self {
        Self {
            window: SlidingWindow::new(buffer),
            sum: 0,
        }
    }

    pub fn clear(&mut self) {
        self.window.clear();
        self.sum = 0;
    }

    pub fn capacity(&self) -> usize {
        self.window.capacity()
    }

    pub fn sum(&self) -> u32 {
        self.sum
    }

    pub fn samples(&self) -> impl Iterator<Item = u16> + '_ {
        self.window.iter()
    }

    /// Stores `sample` and returns the average of the window.
    ///
    /// Until the window refills after a [`clear`](Self::clear), the average covers only the
    /// samples received so far.
    pub fn push(&mut self, sample: u16) -> f32 {
        if let Some(oldest) = self.window.push(sample) {
            self.sum -= u32::from(oldest);
        }
        self.sum += u32::from(sample);

        self.average()
    }

    pub fn average(&self) -> f32 {
        match self.window.len() {
            0 => 0.0,
            n => self.sum as f32 / n as f32,
        }
    }
}

/// Signal smoothed by blending each window average into the previous value.
#[derive(Clone, Copy, Debug)]
pub struct FilteredSignal {
    value: f32,
    previous: f32,
    blend: f32,
}

impl FilteredSignal {
    pub fn new(blend: f32) -> Self {
        Self {
            value: 0.0,
            previous: 0.0,
            blend,
        }
    }

    /// Restarts the filter at `level` with no slope.
    pub fn prime(&mut self, level: f32) {
        self.value = level;
        self.previous = level;
    }

    pub fn update(&mut self, average: f32) -> f32 {
        self.previous = self.value;
        self.value = self.value * (1.0 - self.blend) + average * self.blend;
        self.value
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Change of the filtered value during the latest update.
    pub fn derivative(&self) -> f32 {
        self.value - self.previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_sum_matches_contents() {
        let mut averager = RingAverager::new([0u16; 10]);
        let mut seed: u32 = 12345;

        for _ in 0..500 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12345);
            let sample = ((seed >> 16) % 1024) as u16;
            averager.push(sample);

            let expected: u32 = averager.samples().map(u32::from).sum();
            assert_eq!(averager.sum(), expected);
        }
    }

    #[test]
    fn full_window_averages_over_capacity() {
        let mut averager = RingAverager::new([0u16; 4]);
        for sample in [10, 20, 30, 40] {
            averager.push(sample);
        }

        assert_eq!(averager.push(50), 35.0);
    }

    #[test]
    fn partial_window_averages_received_samples() {
        let mut averager = RingAverager::new([0u16; 20]);
        for _ in 0..20 {
            averager.push(900);
        }
        averager.clear();

        assert_eq!(averager.push(100), 100.0);
        assert_eq!(averager.push(200), 150.0);
        assert_eq!(averager.sum(), 300);
    }

    #[test]
    fn filter_blends_seventy_thirty() {
        let mut signal = FilteredSignal::new(0.3);
        signal.prime(100.0);

        let value = signal.update(200.0);
        assert!((value - 130.0).abs() < 1e-4);
        assert!((signal.derivative() - 30.0).abs() < 1e-4);
    }
}
