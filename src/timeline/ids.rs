/// Monotonic identifier sequences for the node graph, owned by one builder run.
/// Identifiers are never reused and are shared across all groups.
#[derive(Debug, Default)]
pub struct IdGenerator {
    files: u64,
    clips: u64,
    masterclips: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_file(&mut self) -> String {
        self.files += 1;
        format!("file-{}", self.files)
    }

    pub fn next_clipitem(&mut self) -> String {
        self.clips += 1;
        format!("clipitem-{}", self.clips)
    }

    pub fn next_masterclip(&mut self) -> String {
        self.masterclips += 1;
        format!("masterclip-{}", self.masterclips)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequences_are_independent_and_monotonic() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.next_file(), "file-1");
        assert_eq!(ids.next_clipitem(), "clipitem-1");
        assert_eq!(ids.next_clipitem(), "clipitem-2");
        assert_eq!(ids.next_masterclip(), "masterclip-1");
        assert_eq!(ids.next_file(), "file-2");
    }
}
