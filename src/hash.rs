use std::hash::{BuildHasherDefault, Hasher};

/// Identity hasher for keys which are already well distributed arena indices.
#[derive(Default)]
pub struct NoopHasher {
    state: u64,
}

impl Hasher for NoopHasher {
    fn write(&mut self, bytes: &[u8]) {
        for b in bytes {
            self.state = (self.state << 8) | *b as u64;
        }
    }

    fn write_u32(&mut self, i: u32) {
        self.state = i as u64;
    }

    fn write_usize(&mut self, i: usize) {
        self.state = i as u64;
    }

    fn finish(&self) -> u64 {
        self.state
    }
}

pub type BuildNoopHasher = BuildHasherDefault<NoopHasher>;
