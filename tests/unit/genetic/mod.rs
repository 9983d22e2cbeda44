pub mod optimizer;
pub mod population;
