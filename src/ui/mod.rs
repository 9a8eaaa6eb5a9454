/// Rendering: control panels and charts. Reads and mutates `DashboardState`
/// only through its public API.
pub mod panels;
pub mod plot;
