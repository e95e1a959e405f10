/// Knobs for [`ResponseParser`](crate::ResponseParser).
///
/// The defaults reproduce the plain extraction behaviour: the text is
/// scanned as received, truncated arrays are salvaged, nothing is repaired,
/// and every invoke is accepted regardless of its name.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Remove `<think>`/`<thinking>` blocks that open the text before extraction.
    pub strip_think_tags: bool,

    /// Run the deterministic JSON repair pass on candidates that fail strict parsing.
    pub repair: bool,

    /// Rebuild an array from balanced objects when no complete array is present.
    pub salvage: bool,

    /// Drop XML invokes and tool calls whose name differs from the expected function name.
    pub function_filter: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            strip_think_tags: false,
            repair: false,
            salvage: true,
            function_filter: false,
        }
    }
}

impl ParserConfig {
    pub fn with_think_stripping(mut self, enabled: bool) -> Self {
        self.strip_think_tags = enabled;
        self
    }

    pub fn with_repair(mut self, enabled: bool) -> Self {
        self.repair = enabled;
        self
    }

    pub fn with_salvage(mut self, enabled: bool) -> Self {
        self.salvage = enabled;
        self
    }

    pub fn with_function_filter(mut self, enabled: bool) -> Self {
        self.function_filter = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ParserConfig::default();
        assert!(!c.strip_think_tags);
        assert!(!c.repair);
        assert!(c.salvage);
        assert!(!c.function_filter);
    }

    #[test]
    fn builder_chain() {
        let c = ParserConfig::default()
            .with_repair(true)
            .with_salvage(false)
            .with_think_stripping(true)
            .with_function_filter(true);
        assert!(c.repair);
        assert!(!c.salvage);
        assert!(c.strip_think_tags);
        assert!(c.function_filter);
    }
}
