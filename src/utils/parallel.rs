#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Below this many items the work stays on the calling thread.
pub const PARALLEL_THRESHOLD: usize = 64;

/// Maps `f` over `items`, in parallel when the `parallel` feature is on and
/// the input is large enough. Output order always matches input order.
#[inline]
pub fn map_maybe_par<T, R, F>(items: &[T], f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    #[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
    {
        if items.len() > PARALLEL_THRESHOLD {
            return items.par_iter().map(f).collect();
        }
        items.iter().map(f).collect()
    }
    #[cfg(any(not(feature = "parallel"), target_arch = "wasm32"))]
    {
        items.iter().map(f).collect()
    }
}
