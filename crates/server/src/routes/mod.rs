pub mod games;
pub mod health;
pub mod posts;
pub mod puzzles;
