//! Keyset window cursor for backends with a hard per-request row cap.
//!
//! Callers ask for a [`Window`], run `WHERE key > after ORDER BY key LIMIT n`,
//! then report what came back with [`KeysetPager::advance`]. A short window
//! ends the walk. Keys must be strictly increasing; a window whose last key
//! does not move past `after` also ends it, so the loop is always bounded.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Exclusive lower bound on the key, `None` for the first window.
    pub after: Option<i64>,
    pub limit: u64,
}

#[derive(Debug, Clone)]
pub struct KeysetPager {
    window: u64,
    after: Option<i64>,
    finished: bool,
    windows_fetched: u32,
}

impl KeysetPager {
    pub fn new(window: u64) -> Self {
        Self {
            window: window.max(1),
            after: None,
            finished: false,
            windows_fetched: 0,
        }
    }

    pub fn next_window(&self) -> Option<Window> {
        if self.finished {
            return None;
        }
        Some(Window {
            after: self.after,
            limit: self.window,
        })
    }

    pub fn advance(&mut self, fetched: usize, last_key: Option<i64>) {
        self.windows_fetched += 1;
        if (fetched as u64) < self.window {
            self.finished = true;
            return;
        }
        match last_key {
            Some(key) if self.after.is_none_or(|prev| key > prev) => self.after = Some(key),
            _ => self.finished = true,
        }
    }

    /// Last key seen; a walk could resume from here.
    pub fn checkpoint(&self) -> Option<i64> {
        self.after
    }

    pub fn windows_fetched(&self) -> u32 {
        self.windows_fetched
    }
}
