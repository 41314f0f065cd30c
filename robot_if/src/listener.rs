//! # Listener interface
//!
//! Listener managers poll joysticks and controllers and fire the callbacks bound to their buttons
//! and axes. How they do that is their own business, the scheduler only ticks them.

#[derive(Debug, thiserror::Error)]
pub enum RecountError {
    #[error("Controller on port {0} is not connected")]
    NotConnected(u32),
}

/// A set of input listeners ticked once per teleop cycle.
pub trait ListenerManager {
    /// Poll the inputs and dispatch any listeners whose inputs changed.
    fn tick(&mut self);

    /// Re-read the number of controls on each attached controller.
    ///
    /// The control system doesn't know the real number of buttons/axes until it is connected,
    /// so this is called each time teleop starts. On error the previous counts are kept.
    fn recount_controls(&mut self) -> Result<(), RecountError> {
        Ok(())
    }
}
