pub mod chart;
pub mod coin;
pub mod detail;
pub mod image;
pub mod market;
pub mod portfolio;
pub mod settings;
pub mod sort;
pub mod statistic;
