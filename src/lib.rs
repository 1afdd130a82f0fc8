pub mod algorithm;
pub mod assign;
pub mod common;
pub mod config;
pub mod error;
pub mod heuristic;
pub mod instance;
pub mod map;
pub mod solver;
pub mod stat;

#[cfg(test)]
pub(crate) mod test_utils {
    use crate::instance::Instance;

    pub(crate) fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    }

    /// 5x5 map with two agents and two tasks, see `map_file/test/`.
    pub(crate) fn load_small() -> Instance {
        Instance::from_files("map_file/test/small.instance", "map_file/test/small.map").unwrap()
    }
}
