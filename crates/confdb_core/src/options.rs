//! Store configuration options.

/// Options for JSON file stores.
///
/// `write_mmap` and `use_journal` are reserved for future use and have no
/// observable effect; the atomic rename protocol is the mandatory
/// durability behavior.
#[derive(Debug, Clone, Copy)]
pub struct JsonStoreOptions {
    /// Use memory-mapped writes if true. Reserved.
    pub write_mmap: bool,

    /// Enable journaling for crash safety. Reserved.
    pub use_journal: bool,

    /// Allow `//` line comments in JSON files during load.
    pub allow_comments: bool,
}

impl Default for JsonStoreOptions {
    fn default() -> Self {
        Self {
            write_mmap: false,
            use_journal: true,
            allow_comments: false,
        }
    }
}

impl JsonStoreOptions {
    /// Creates options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to use memory-mapped writes. Reserved.
    #[must_use]
    pub const fn write_mmap(mut self, value: bool) -> Self {
        self.write_mmap = value;
        self
    }

    /// Sets whether to journal writes. Reserved.
    #[must_use]
    pub const fn use_journal(mut self, value: bool) -> Self {
        self.use_journal = value;
        self
    }

    /// Sets whether `//` comments are tolerated during load.
    #[must_use]
    pub const fn allow_comments(mut self, value: bool) -> Self {
        self.allow_comments = value;
        self
    }
}

/// Options for TOML file stores.
///
/// `write_mmap` and `use_journal` are reserved for future use and have no
/// observable effect.
#[derive(Debug, Clone, Copy)]
pub struct TomlStoreOptions {
    /// Use memory-mapped writes if true. Reserved.
    pub write_mmap: bool,

    /// Enable journaling for crash safety. Reserved.
    pub use_journal: bool,

    /// Emit keys in insertion order instead of sorted.
    pub preserve_order: bool,

    /// Reject inserts that would make an array heterogeneous.
    pub strict_types: bool,
}

impl Default for TomlStoreOptions {
    fn default() -> Self {
        Self {
            write_mmap: false,
            use_journal: true,
            preserve_order: false,
            strict_types: true,
        }
    }
}

impl TomlStoreOptions {
    /// Creates options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to use memory-mapped writes. Reserved.
    #[must_use]
    pub const fn write_mmap(mut self, value: bool) -> Self {
        self.write_mmap = value;
        self
    }

    /// Sets whether to journal writes. Reserved.
    #[must_use]
    pub const fn use_journal(mut self, value: bool) -> Self {
        self.use_journal = value;
        self
    }

    /// Sets whether keys are emitted in insertion order.
    #[must_use]
    pub const fn preserve_order(mut self, value: bool) -> Self {
        self.preserve_order = value;
        self
    }

    /// Sets whether array type discipline is enforced.
    #[must_use]
    pub const fn strict_types(mut self, value: bool) -> Self {
        self.strict_types = value;
        self
    }
}
