//! Form Submission Guard
//!
//! Disables the submit control and shows a loading indicator once a form is
//! submitted.

/// A control that can be disabled, e.g. a submit button
pub trait SubmitControl {
    fn set_disabled(&mut self, disabled: bool);
    fn is_disabled(&self) -> bool;
}

/// Spinner or similar busy marker
pub trait LoadingIndicator {
    fn set_visible(&mut self, visible: bool);
    fn is_visible(&self) -> bool;
}

/// In-memory submit button
#[derive(Debug, Clone, Default)]
pub struct MemoryButton {
    disabled: bool,
}

impl SubmitControl for MemoryButton {
    fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }
}

/// In-memory loading indicator
#[derive(Debug, Clone, Default)]
pub struct MemoryIndicator {
    visible: bool,
}

impl LoadingIndicator for MemoryIndicator {
    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Tracks whether the form was submitted
#[derive(Debug, Default)]
pub struct SubmitGuard {
    submitted: bool,
}

impl SubmitGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a submit. Returns `false` if the form was already submitted.
    pub fn on_submit(
        &mut self,
        control: &mut dyn SubmitControl,
        indicator: &mut dyn LoadingIndicator,
    ) -> bool {
        if self.submitted {
            return false;
        }
        self.submitted = true;
        control.set_disabled(true);
        indicator.set_visible(true);
        log::info!("Form submitted, waiting for response");
        true
    }

    /// Re-enable the form, e.g. when the page is shown again from history
    pub fn reset(&mut self, control: &mut dyn SubmitControl, indicator: &mut dyn LoadingIndicator) {
        self.submitted = false;
        control.set_disabled(false);
        indicator.set_visible(false);
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }
}
