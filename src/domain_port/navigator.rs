/// Leaves the application for a fixed entry point (full page navigation in
/// the browser). Crossing this boundary ends the current in-app flow.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}
