pub mod games;
pub mod pool;
pub mod posts;
pub mod puzzles;
