//! Sliding window

use core::marker::PhantomData;

/// Fixed-capacity circular buffer. Once full, every push overwrites the oldest element.
pub struct SlidingWindow<T, C>
where
    C: AsRef<[T]> + AsMut<[T]>,
{
    buffer: C,
    idx: usize,
    full: bool,
    _marker: PhantomData<T>,
}

impl<T: Default + Copy, const N: usize> Default for SlidingWindow<T, [T; N]> {
    fn default() -> Self {
        Self::new([T::default(); N])
    }
}

impl<T, C> SlidingWindow<T, C>
where
    T: Copy,
    C: AsRef<[T]> + AsMut<[T]>,
{
    /// The buffer must not be empty.
    pub fn new(buffer: C) -> Self {
        debug_assert!(!buffer.as_ref().is_empty());
        Self {
            buffer,
            idx: 0,
            full: false,
            _marker: PhantomData,
        }
    }

    pub fn clear(&mut self) {
        self.idx = 0;
        self.full = false;
    }

    pub fn capacity(&self) -> usize {
        self.buffer.as_ref().len()
    }

    pub fn len(&self) -> usize {
        if self.full {
            self.capacity()
        } else {
            self.idx
        }
    }

    #[allow(dead_code)]
    pub fn last(&self) -> Option<T> {
        if self.idx == 0 && !self.full {
            None
        } else {
            let idx = if self.idx == 0 {
                self.capacity()
            } else {
                self.idx
            };
            Some(self.buffer.as_ref()[idx - 1])
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[allow(dead_code)]
    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Stores `sample`, returning the element it evicted once the window is full.
    pub fn push(&mut self, sample: T) -> Option<T> {
        let buffer = self.buffer.as_mut();
        let old = self.full.then_some(buffer[self.idx]);

        buffer[self.idx] = sample;
        self.idx = (self.idx + 1) % buffer.len();
        if self.idx == 0 {
            self.full = true;
        }

        old
    }

    /// Iterates from the oldest to the newest element.
    pub fn iter(&self) -> impl Iterator<Item = T> + Clone + '_ {
        let buffer = self.buffer.as_ref();
        let start = if self.full { self.idx } else { 0 };
        (0..self.len()).map(move |i| buffer[(start + i) % buffer.len()])
    }
}
