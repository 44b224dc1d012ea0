/// Recommended error type for code shared between context plugins and scenarios. Compatible with
/// [HookResult] so `?` can be used to propagate errors.
pub type BenchResult<T> = anyhow::Result<T>;

pub type HookResult = anyhow::Result<()>;
