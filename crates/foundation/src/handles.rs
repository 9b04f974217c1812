/// Generational handle: `(index, generation)`.
///
/// A slot index may be reused after its value is removed; the generation is
/// bumped on every reuse so stale handles never alias a newer value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u32, u32);

impl Handle {
    pub fn new(index: u32, generation: u32) -> Self {
        Handle(index, generation)
    }

    pub fn index(self) -> u32 {
        self.0
    }

    pub fn generation(self) -> u32 {
        self.1
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}v{}", self.0, self.1)
    }
}
