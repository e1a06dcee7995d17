use std::cell::RefCell;
use std::rc::Rc;

use crate::connection::{Input, WiringRegistry};
use crate::line::Line;
use crate::signal::Signal;

/// Common view of every element on the board.
///
/// Elements never reach into each other: they only expose their input ports, which lines drive,
/// and their output lines, which other inputs subscribe to.
pub trait Component {
    fn name(&self) -> &str;

    /// Declared input ports, in declaration order.
    fn inputs(&self) -> Vec<&Input>;

    /// Output lines with their port names.
    fn outputs(&self) -> Vec<(&'static str, &Line)>;

    fn get_output(&self, port: &str) -> Option<&Line> {
        self.outputs()
            .into_iter()
            .find(|(name, _)| *name == port)
            .map(|(_, line)| line)
    }

    fn get_input(&self, port: &str) -> Option<&Input> {
        self.inputs()
            .into_iter()
            .find(|input| input.handle().port() == port)
    }
}

/// Declare an input whose level updates shared element state.
///
/// `update` runs with the state mutably borrowed and returns whatever the element must drive;
/// `drive` runs after the borrow is released, so propagation that loops back into the same element
/// finds its state free.
pub(crate) fn stateful_input<S, O>(
    registry: &mut WiringRegistry,
    element: &str,
    port: &str,
    state: &Rc<RefCell<S>>,
    update: impl Fn(&mut S, Signal) -> O + 'static,
    drive: impl Fn(O) + 'static,
) -> Input
where
    S: 'static,
{
    let state = Rc::downgrade(state);
    registry.declare(element, port, move |level| {
        if let Some(state) = state.upgrade() {
            let out = update(&mut state.borrow_mut(), level);
            drive(out);
        }
    })
}
