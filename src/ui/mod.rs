/// egui rendering of the dashboard view tree.
pub mod map;
pub mod panels;
pub mod plot;
