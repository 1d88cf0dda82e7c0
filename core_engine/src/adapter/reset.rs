/// Invoked when a reset control fires; returns the confirmation to show.
pub type ResetHandler = Box<dyn Fn() -> String + Send + Sync>;

/// An optional "reset history" control offered by the host UI.
pub trait ResetControl {
    fn is_bound(&self) -> bool;
    fn bind(&mut self, handler: ResetHandler);
}

/// Binds `handler` unless the control already carries one.
///
/// Returns whether a new binding was made.
pub fn bind_once(control: &mut dyn ResetControl, handler: ResetHandler) -> bool {
    if control.is_bound() {
        return false;
    }
    control.bind(handler);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Button {
        handlers: Vec<ResetHandler>,
    }

    impl ResetControl for Button {
        fn is_bound(&self) -> bool {
            !self.handlers.is_empty()
        }

        fn bind(&mut self, handler: ResetHandler) {
            self.handlers.push(handler);
        }
    }

    #[test]
    fn binds_only_once() {
        let mut button = Button::default();
        assert!(bind_once(&mut button, Box::new(|| "first".to_string())));
        assert!(!bind_once(&mut button, Box::new(|| "second".to_string())));
        assert_eq!(button.handlers.len(), 1);
        assert_eq!((button.handlers[0])(), "first");
    }
}
