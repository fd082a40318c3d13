/// Config for a component table.
/// ## Fields
/// - `pool_capacity`:
///   Upper bound on instances kept alive by a pooled-lifestyle registration.
///   Resolutions beyond the capacity reuse pooled instances round-robin.
#[derive(Clone, Copy)]
pub struct Config {
    pub pool_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self { pool_capacity: 4 }
    }
}
