pub mod pareto;
pub mod procurement;
pub mod solver;
