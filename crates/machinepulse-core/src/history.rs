//! Fixed-length sliding window of recent vibration readings.
//!
//! Every tick drops the oldest value and appends the newest, so a window never
//! changes length once seeded.

/// Shift `value` into `history`: drop index 0, append at the end.
///
/// The result always has the same length as the input. An empty history stays
/// empty.
pub fn push_reading(history: &[u8], value: u8) -> Vec<u8> {
    if history.is_empty() {
        return Vec::new();
    }
    let mut next = Vec::with_capacity(history.len());
    next.extend_from_slice(&history[1..]);
    next.push(value);
    next
}

/// The window length a session expects every machine to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryWindow {
    len: usize,
}

impl HistoryWindow {
    pub fn new(len: usize) -> Self {
        Self { len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Bring `history` to the window length.
    ///
    /// A history of the right length is returned as-is. Anything else is
    /// reinitialized to a flat line at `current`. Returns whether a reset
    /// happened.
    pub fn normalize(&self, history: &[u8], current: u8) -> (Vec<u8>, bool) {
        if history.len() == self.len {
            (history.to_vec(), false)
        } else {
            (vec![current; self.len], true)
        }
    }

    /// Normalize then push.
    pub fn push(&self, history: &[u8], current: u8, value: u8) -> (Vec<u8>, bool) {
        let (normalized, reset) = self.normalize(history, current);
        (push_reading(&normalized, value), reset)
    }
}
