use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Per-field typing debounce: a query only goes out once the user has paused
/// for `delay` and typed at least `min_length` characters.
pub struct Debouncer {
    delay: Duration,
    min_length: usize,
    generations: Mutex<HashMap<String, u64>>,
}

impl Debouncer {
    pub fn new(delay: Duration, min_length: usize) -> Self {
        Self {
            delay,
            min_length,
            generations: Mutex::new(HashMap::new()),
        }
    }

    pub fn long_enough(&self, text: &str) -> bool {
        text.chars().count() >= self.min_length
    }

    /// Waits out the delay. Returns `None` if a newer call for the same key
    /// arrived meanwhile, or if `text` is too short.
    pub async fn settle(&self, key: &str, text: String) -> Option<String> {
        let generation = self.bump(key);
        tokio::time::sleep(self.delay).await;
        if !self.finish(key, generation) {
            return None;
        }
        self.long_enough(&text).then_some(text)
    }

    /// Keys with a call still waiting out the delay.
    pub fn pending(&self) -> usize {
        self.generations.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn bump(&self, key: &str) -> u64 {
        let mut generations = self.generations.lock().unwrap_or_else(|e| e.into_inner());
        let entry = generations.entry(key.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    /// True when `generation` is still the newest call for `key`, in which
    /// case the entry is dropped.
    fn finish(&self, key: &str, generation: u64) -> bool {
        let mut generations = self.generations.lock().unwrap_or_else(|e| e.into_inner());
        if generations.get(key) != Some(&generation) {
            return false;
        }
        generations.remove(key);
        true
    }
}
