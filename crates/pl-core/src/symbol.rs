use crate::tree::Ident;

/// Deterministic generator for hygienic temporaries. One instance serves a
/// whole compilation unit so names stay unique across sibling and nested
/// chains.
#[derive(Debug, Default, Clone)]
pub struct SymbolGen {
    counter: usize,
}

impl SymbolGen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next unique identifier for the given hint, e.g. `__pipe_temp3`.
    pub fn fresh(&mut self, hint: &str) -> Ident {
        self.counter += 1;
        Ident::new(format!("__{}{}", hint, self.counter))
    }

    pub fn count(&self) -> usize {
        self.counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_symbols_are_unique_and_deterministic() {
        let mut symbols = SymbolGen::new();
        let a = symbols.fresh("pipe_temp");
        let b = symbols.fresh("pipe_temp");
        let c = symbols.fresh("pipe_result");
        assert_eq!(a.as_str(), "__pipe_temp1");
        assert_eq!(b.as_str(), "__pipe_temp2");
        assert_eq!(c.as_str(), "__pipe_result3");
    }
}
