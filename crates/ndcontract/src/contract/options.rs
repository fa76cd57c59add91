//! Per-call contraction settings.

/// Default cap on any single intermediate: 1 GiB.
pub const DEFAULT_MEMORY_BUDGET: usize = 1 << 30;

/// Settings for planning and executing a contraction.
///
/// # Example
///
/// ```
/// use ndcontract::ContractOptions;
///
/// let opts = ContractOptions::default().with_memory_budget(1 << 20);
/// assert_eq!(opts.memory_budget, 1 << 20);
/// assert!(opts.use_gemm);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractOptions {
    /// Largest intermediate, in bytes, the planner may materialize.
    pub memory_budget: usize,
    /// Route eligible steps through the matrix-multiply kernel.
    pub use_gemm: bool,
}

impl Default for ContractOptions {
    fn default() -> Self {
        Self {
            memory_budget: DEFAULT_MEMORY_BUDGET,
            use_gemm: true,
        }
    }
}

impl ContractOptions {
    pub fn with_memory_budget(mut self, bytes: usize) -> Self {
        self.memory_budget = bytes;
        self
    }

    pub fn with_gemm(mut self, enabled: bool) -> Self {
        self.use_gemm = enabled;
        self
    }
}
