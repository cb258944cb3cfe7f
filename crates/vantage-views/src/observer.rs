/// The tree view presenting the scene-view hierarchy.
///
/// `refresh` is fire-and-forget: it is called whenever the hierarchy or its
/// content may have changed and cannot report failure back.
pub trait TreeViewObserver {
    fn refresh(&mut self);
}

impl<F> TreeViewObserver for F
where
    F: FnMut(),
{
    fn refresh(&mut self) {
        self()
    }
}
